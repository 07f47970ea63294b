//! Weather provider
//!
//! Fetches current conditions for a resolved location.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::domain::{Location, Weather};

use super::EnrichmentError;

/// Current conditions lookup, parameterized by a resolved location
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_conditions(&self, location: &Location) -> Result<Weather, EnrichmentError>;
}

/// Body returned by `GET /conditions`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConditionsResponse {
    temperature: f64,
    #[serde(default)]
    condition: Option<String>,
    #[serde(default)]
    wind_speed: Option<f64>,
    #[serde(default)]
    observed_at: Option<DateTime<Utc>>,
}

/// Weather provider backed by an HTTP/JSON API
#[derive(Debug, Clone)]
pub struct HttpWeatherClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpWeatherClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

fn unavailable(err: reqwest::Error) -> EnrichmentError {
    if err.is_timeout() {
        EnrichmentError::WeatherUnavailable("weather request timed out".to_string())
    } else {
        EnrichmentError::WeatherUnavailable(err.to_string())
    }
}

#[async_trait]
impl WeatherProvider for HttpWeatherClient {
    async fn current_conditions(&self, location: &Location) -> Result<Weather, EnrichmentError> {
        let url = format!("{}/conditions", self.base_url);
        tracing::debug!(
            postal_code = %location.postal_code,
            "Weather request to: {}",
            url
        );

        let mut request = self.client.get(&url).query(&[
            ("lat", location.latitude.to_string()),
            ("lon", location.longitude.to_string()),
            ("postalCode", location.postal_code.clone()),
        ]);
        if let Some(ref api_key) = self.api_key {
            request = request.header("X-Api-Key", api_key);
        }

        let response = request.send().await.map_err(unavailable)?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::WeatherUnavailable(format!(
                "weather provider responded with {}",
                status
            )));
        }

        let body: ConditionsResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                unavailable(e)
            } else {
                EnrichmentError::WeatherUnavailable(format!("malformed weather response: {}", e))
            }
        })?;

        Ok(Weather {
            temperature: body.temperature,
            condition: body.condition,
            wind_speed: body.wind_speed,
            observed_at: body.observed_at.unwrap_or_else(Utc::now),
        })
    }
}
