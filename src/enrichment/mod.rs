//! Stop Enrichment module
//!
//! Turns a bare postal code into a fully enriched stop by calling the
//! geocoding provider and then the weather provider.

mod error;
mod geocoder;
mod pipeline;
mod weather;

pub use error::EnrichmentError;
pub use geocoder::{Geocoder, HttpGeocoder};
pub use pipeline::{validate_postal_code, StopEnricher};
pub use weather::{HttpWeatherClient, WeatherProvider};
