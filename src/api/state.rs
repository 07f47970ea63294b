//! Shared handler state

use std::sync::Arc;

use crate::enrichment::StopEnricher;
use crate::store::TourStore;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TourStore>,
    pub enricher: StopEnricher,
}

impl AppState {
    pub fn new(store: Arc<dyn TourStore>, enricher: StopEnricher) -> Self {
        Self { store, enricher }
    }
}
