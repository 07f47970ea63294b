//! tour_service Library
//!
//! Tour aggregates with embedded, enriched stops.
//! Re-exports modules for integration testing and the server binary.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod enrichment;
mod error;
pub mod store;

pub use config::Config;
pub use domain::{DomainError, Location, Stop, StopPatch, Tour, TourChanges, TourDraft, TourSummary, Weather};
pub use enrichment::{EnrichmentError, StopEnricher};
pub use error::{AppError, AppResult};
pub use store::{InMemoryTourStore, PgTourStore, StoreError, TourStore};
