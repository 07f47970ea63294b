//! Stop Enrichment Pipeline
//!
//! validate -> geocode -> weather -> Stop. Stateless; each call is
//! independent and holds nothing between requests.

use std::sync::Arc;

use reqwest::Client;

use crate::config::Config;
use crate::domain::Stop;

use super::{EnrichmentError, Geocoder, HttpGeocoder, HttpWeatherClient, WeatherProvider};

/// Check that a postal code is a US ZIP (`97214`) or ZIP+4 (`97214-1234`).
///
/// Returns the trimmed code.
pub fn validate_postal_code(raw: &str) -> Result<&str, EnrichmentError> {
    let code = raw.trim();
    let (zip, plus4) = match code.split_once('-') {
        Some((zip, plus4)) => (zip, Some(plus4)),
        None => (code, None),
    };

    let all_digits = |s: &str, len: usize| s.len() == len && s.bytes().all(|b| b.is_ascii_digit());

    if all_digits(zip, 5) && plus4.map_or(true, |p| all_digits(p, 4)) {
        Ok(code)
    } else {
        Err(EnrichmentError::InvalidIdentifier(raw.to_string()))
    }
}

/// Enriches postal codes into stops
#[derive(Clone)]
pub struct StopEnricher {
    geocoder: Arc<dyn Geocoder>,
    weather: Arc<dyn WeatherProvider>,
}

impl StopEnricher {
    pub fn new(geocoder: Arc<dyn Geocoder>, weather: Arc<dyn WeatherProvider>) -> Self {
        Self { geocoder, weather }
    }

    /// Build HTTP-backed providers sharing one client with the configured timeout
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.provider_timeout)
            .user_agent(concat!("tour_service/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let geocoder = HttpGeocoder::new(client.clone(), config.geocoder_url.clone());
        let mut weather = HttpWeatherClient::new(client, config.weather_url.clone());
        if let Some(ref api_key) = config.weather_api_key {
            weather = weather.with_api_key(api_key.clone());
        }

        Ok(Self::new(Arc::new(geocoder), Arc::new(weather)))
    }

    // =========================================================================
    // enrich
    // =========================================================================

    /// Resolve a postal code into a fully enriched stop.
    ///
    /// The weather lookup only starts once the geocode has resolved, and is
    /// parameterized by the resolved location. On any failure nothing is
    /// returned except the error.
    pub async fn enrich(&self, postal_code: &str) -> Result<Stop, EnrichmentError> {
        let postal_code = validate_postal_code(postal_code)?;

        let location = self.geocoder.geocode(postal_code).await.map_err(|e| {
            tracing::warn!(postal_code, error = %e, "Geocoding failed");
            e
        })?;

        let weather = self
            .weather
            .current_conditions(&location)
            .await
            .map_err(|e| {
                tracing::warn!(
                    postal_code,
                    region = %location.region,
                    error = %e,
                    "Weather lookup failed, discarding resolved location"
                );
                e
            })?;

        let stop = Stop::enriched(location, weather);
        tracing::debug!(stop_id = %stop.id, postal_code, "Stop enriched");
        Ok(stop)
    }
}

impl std::fmt::Debug for StopEnricher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopEnricher").finish_non_exhaustive()
    }
}
