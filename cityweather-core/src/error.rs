use thiserror::Error;

/// Failures raised by a [`KeyValueStore`](crate::store::KeyValueStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize value for key '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),
}

/// Errors surfaced by lookups and list mutations.
///
/// Every variant is terminal for the attempt that produced it; nothing retries.
#[derive(Debug, Error)]
pub enum Error {
    /// Empty or whitespace-only city name. Raised before any I/O.
    #[error("City name must not be empty")]
    Validation,

    /// The backend answered with an empty result set.
    #[error("No weather data found for '{0}'")]
    NotFound(String),

    /// Transport failure, non-success status, or an unparseable body.
    #[error("Network error: {0}")]
    Network(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl Error {
    /// Inline text shown to the user for this error.
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::Validation => "Please enter a city name.",
            Error::NotFound(_) => "City not found. Please try again.",
            Error::Network(_) => "Failed to fetch weather. Please check your connection.",
            Error::Storage(_) => "Could not save your changes.",
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Network(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
