//! InMemoryTourStore - Vec-backed tour store for testing and development.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{DomainError, Stop, StopPatch, Tour, TourChanges, TourDraft, TourSummary};

use super::{StoreError, TourStore};

/// In-memory tour store.
///
/// Tours are kept in creation order. Mutations run under the write lock and
/// never across an await point, so two stop mutations on the same tour can't
/// lose each other's update. Clone-friendly via Arc.
#[derive(Clone, Default)]
pub struct InMemoryTourStore {
    tours: Arc<RwLock<Vec<Tour>>>,
}

impl InMemoryTourStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned<T>(_: T) -> StoreError {
        StoreError::Storage("lock poisoned".into())
    }

    /// Apply `f` to a copy of the tour and keep the copy only if `f` succeeds.
    fn mutate<T, F>(&self, id: Uuid, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Tour) -> Result<T, DomainError>,
    {
        let mut tours = self.tours.write().map_err(Self::poisoned)?;
        let slot = tours
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(DomainError::TourNotFound(id))?;

        let mut working = slot.clone();
        let out = f(&mut working)?;
        *slot = working;
        Ok(out)
    }
}

#[async_trait]
impl TourStore for InMemoryTourStore {
    async fn create(&self, draft: TourDraft) -> Result<Tour, StoreError> {
        let tour = Tour::create(draft)?;
        self.tours
            .write()
            .map_err(Self::poisoned)?
            .push(tour.clone());
        Ok(tour)
    }

    async fn list_all(&self) -> Result<Vec<TourSummary>, StoreError> {
        let tours = self.tours.read().map_err(Self::poisoned)?;
        Ok(tours.iter().map(Tour::summary).collect())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Tour, StoreError> {
        let tours = self.tours.read().map_err(Self::poisoned)?;
        tours
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| DomainError::TourNotFound(id).into())
    }

    async fn replace(
        &self,
        id: Uuid,
        changes: TourChanges,
        expected_version: Option<i64>,
    ) -> Result<Tour, StoreError> {
        self.mutate(id, |tour| {
            tour.check_version(expected_version)?;
            tour.replace(changes)?;
            Ok(tour.clone())
        })
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tours = self.tours.write().map_err(Self::poisoned)?;
        let position = tours
            .iter()
            .position(|t| t.id == id)
            .ok_or(DomainError::TourNotFound(id))?;
        tours.remove(position);
        Ok(())
    }

    async fn add_stop(&self, tour_id: Uuid, stop: Stop) -> Result<Tour, StoreError> {
        self.mutate(tour_id, |tour| {
            tour.add_stop(stop);
            Ok(tour.clone())
        })
    }

    async fn update_stop(
        &self,
        tour_id: Uuid,
        stop_id: Uuid,
        patch: StopPatch,
    ) -> Result<Stop, StoreError> {
        self.mutate(tour_id, |tour| tour.update_stop(stop_id, &patch))
    }

    async fn remove_stop(&self, tour_id: Uuid, stop_id: Uuid) -> Result<(), StoreError> {
        self.mutate(tour_id, |tour| tour.remove_stop(stop_id).map(|_| ()))
    }
}
