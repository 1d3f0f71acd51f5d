use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Current conditions for a city as returned by the backend.
///
/// Field names on the wire are camelCase (`windSpeed`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weather {
    pub city: String,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Category label, e.g. "Sunny".
    pub weather: String,
    pub wind_speed: f64,
    pub humidity: f64,
}

impl Weather {
    pub fn condition(&self) -> Condition {
        Condition::from_label(&self.weather)
    }
}

/// Temperature unit used at display time. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "C",
            TemperatureUnit::Fahrenheit => "F",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TemperatureUnit::Celsius => TemperatureUnit::Fahrenheit,
            TemperatureUnit::Fahrenheit => TemperatureUnit::Celsius,
        }
    }
}

impl std::fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl std::str::FromStr for TemperatureUnit {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "c" | "celsius" => Ok(TemperatureUnit::Celsius),
            "f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(anyhow::anyhow!(
                "Unknown temperature unit '{value}'. Supported units: C, F."
            )),
        }
    }
}

/// Coarse weather category used to pick an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    Sunny,
    Cloudy,
    Rainy,
    Other,
}

impl Condition {
    /// Case-insensitive match on the backend's label.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "sunny" => Condition::Sunny,
            "cloudy" => Condition::Cloudy,
            "rainy" => Condition::Rainy,
            _ => Condition::Other,
        }
    }

    pub fn icon_name(&self) -> &'static str {
        match self {
            Condition::Sunny => "sunny",
            Condition::Cloudy => "cloud",
            Condition::Rainy => "rainy",
            Condition::Other => "partly-sunny",
        }
    }
}

/// Trim a user-entered city name, rejecting blank input.
///
/// Case is preserved: "paris" and "Paris" are different cities.
pub fn normalize_city(input: &str) -> Result<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation);
    }
    Ok(trimmed.to_string())
}
