//! Geocoding provider
//!
//! Resolves a postal code to a location record.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::domain::Location;

use super::EnrichmentError;

/// Postal code to location lookup
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, postal_code: &str) -> Result<Location, EnrichmentError>;
}

/// Body returned by `GET /postal-codes/{code}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeocodeResponse {
    #[serde(default)]
    postal_code: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default, alias = "state")]
    region: Option<String>,
    #[serde(default)]
    country: Option<String>,
    latitude: f64,
    longitude: f64,
}

/// Geocoder backed by an HTTP/JSON provider
#[derive(Debug, Clone)]
pub struct HttpGeocoder {
    client: Client,
    base_url: String,
}

impl HttpGeocoder {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn unavailable(err: reqwest::Error) -> EnrichmentError {
        if err.is_timeout() {
            EnrichmentError::UpstreamUnavailable("geocoder request timed out".to_string())
        } else {
            EnrichmentError::UpstreamUnavailable(err.to_string())
        }
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn geocode(&self, postal_code: &str) -> Result<Location, EnrichmentError> {
        let url = format!("{}/postal-codes/{}", self.base_url, postal_code);
        tracing::debug!("Geocoding request to: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(Self::unavailable)?;

        let status = response.status();
        // 404 means no match. A wrong GEOCODER_URL base path also lands here.
        if status == StatusCode::NOT_FOUND {
            tracing::info!(url = %url, "Geocoder has no match for postal code");
            return Err(EnrichmentError::LocationNotFound(postal_code.to_string()));
        }
        if !status.is_success() {
            return Err(EnrichmentError::UpstreamUnavailable(format!(
                "geocoder responded with {}",
                status
            )));
        }

        let body: GeocodeResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                Self::unavailable(e)
            } else {
                EnrichmentError::UpstreamUnavailable(format!("malformed geocoder response: {}", e))
            }
        })?;

        // A match without a region is not a usable location
        let region = match body.region {
            Some(region) if !region.trim().is_empty() => region,
            _ => return Err(EnrichmentError::LocationNotFound(postal_code.to_string())),
        };

        Ok(Location {
            postal_code: body.postal_code.unwrap_or_else(|| postal_code.to_string()),
            city: body.city,
            region,
            country: body.country,
            latitude: body.latitude,
            longitude: body.longitude,
        })
    }
}
