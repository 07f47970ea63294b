//! Tour Store module
//!
//! Persistence for tour aggregates. Every mutation and its version bump are
//! applied as one storage step.

mod error;
mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Stop, StopPatch, Tour, TourChanges, TourDraft, TourSummary};

pub use error::StoreError;
pub use memory::InMemoryTourStore;
pub use postgres::PgTourStore;

/// CRUD storage for tours and their embedded stops
#[async_trait]
pub trait TourStore: Send + Sync {
    /// Create a tour at version 0 with no stops
    async fn create(&self, draft: TourDraft) -> Result<Tour, StoreError>;

    /// All tours, projected, in creation order
    async fn list_all(&self) -> Result<Vec<TourSummary>, StoreError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Tour, StoreError>;

    /// Replace title and activities.
    ///
    /// With `expected_version` set this is a compare-and-swap; without it the
    /// last write wins.
    async fn replace(
        &self,
        id: Uuid,
        changes: TourChanges,
        expected_version: Option<i64>,
    ) -> Result<Tour, StoreError>;

    /// Delete a tour together with its stops
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Append an enriched stop
    async fn add_stop(&self, tour_id: Uuid, stop: Stop) -> Result<Tour, StoreError>;

    async fn update_stop(
        &self,
        tour_id: Uuid,
        stop_id: Uuid,
        patch: StopPatch,
    ) -> Result<Stop, StoreError>;

    async fn remove_stop(&self, tour_id: Uuid, stop_id: Uuid) -> Result<(), StoreError>;
}
