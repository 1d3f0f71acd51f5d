use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::{
    error::{Error, Result},
    model::Weather,
};

/// Source of current conditions for a city.
#[async_trait]
pub trait WeatherProvider: Send + Sync + std::fmt::Debug {
    /// Exactly one lookup per call. Implementations must not retry or cache.
    async fn fetch_weather(&self, city: &str) -> Result<Weather>;
}

/// Client for the `GET <base>/weatherData?city=<name>` endpoint.
///
/// The backend answers with a JSON array; an empty array means the city is
/// unknown, otherwise the first element is the record.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    endpoint: Url,
    http: Client,
}

impl WeatherClient {
    pub fn new(base_url: &Url) -> anyhow::Result<Self> {
        Ok(Self {
            endpoint: endpoint_for(base_url)?,
            http: Client::new(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn endpoint_for(base_url: &Url) -> anyhow::Result<Url> {
    let mut base = base_url.clone();
    // Without a trailing slash `join` would replace the last path segment.
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join("weatherData")
        .map_err(|e| anyhow::anyhow!("Invalid backend base URL '{base_url}': {e}"))
}

#[async_trait]
impl WeatherProvider for WeatherClient {
    async fn fetch_weather(&self, city: &str) -> Result<Weather> {
        tracing::debug!(%city, endpoint = %self.endpoint, "requesting weather");

        let res = self
            .http
            .get(self.endpoint.clone())
            .query(&[("city", city)])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(Error::Network(format!(
                "weather request failed with status {}: {}",
                status,
                truncate_body(&body),
            )));
        }

        let records: Vec<Weather> = serde_json::from_str(&body).map_err(|e| {
            Error::Network(format!("failed to parse weather response: {e}"))
        })?;

        records
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(city.to_string()))
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
