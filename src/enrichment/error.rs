//! Enrichment Errors
//!
//! Failures of the stop enrichment pipeline. Input faults are kept apart from
//! degraded upstream providers so callers can tell them apart.

/// Errors that can occur while enriching a stop
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EnrichmentError {
    /// Postal code is not syntactically valid
    #[error("Invalid postal code: {0}")]
    InvalidIdentifier(String),

    /// Geocoder has no match for the postal code
    #[error("No location found for postal code {0}")]
    LocationNotFound(String),

    /// Geocoder could not be reached or answered badly
    #[error("Geocoding provider unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Weather lookup failed after a successful geocode
    #[error("Weather provider unavailable: {0}")]
    WeatherUnavailable(String),
}

impl EnrichmentError {
    /// Check if the caller supplied bad input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            EnrichmentError::InvalidIdentifier(_) | EnrichmentError::LocationNotFound(_)
        )
    }

    /// Check if an external dependency is degraded (re-issuing may help)
    pub fn is_upstream_error(&self) -> bool {
        matches!(
            self,
            EnrichmentError::UpstreamUnavailable(_) | EnrichmentError::WeatherUnavailable(_)
        )
    }
}
