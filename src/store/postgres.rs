//! PgTourStore - PostgreSQL-backed tour store.
//!
//! One row per tour; stops live in a JSONB column of the same row, so a tour
//! and its stops are always read and written together. Mutations lock the row
//! with `SELECT ... FOR UPDATE`, apply the aggregate method and write the new
//! state with its version in the same transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{DomainError, Stop, StopPatch, Tour, TourChanges, TourDraft, TourSummary};

use super::{StoreError, TourStore};

/// Row shape of `SELECT {TOUR_COLUMNS} FROM tours`
type TourRow = (Uuid, String, Vec<String>, DateTime<Utc>, i64, Json<Vec<Stop>>);

const TOUR_COLUMNS: &str = "id, title, activities, launch_date, version, stops";

fn tour_from_row(row: TourRow) -> Tour {
    let (id, title, activities, launch_date, version, Json(stops)) = row;
    Tour {
        id,
        title,
        activities,
        launch_date,
        version,
        stops,
    }
}

/// Tour store for persisting tours in PostgreSQL
#[derive(Debug, Clone)]
pub struct PgTourStore {
    pool: PgPool,
}

impl PgTourStore {
    /// Create a new PgTourStore with a database pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run `f` against the locked tour row and persist the result.
    ///
    /// If `f` fails the transaction is rolled back and the row is untouched.
    async fn mutate<T, F>(&self, id: Uuid, f: F) -> Result<T, StoreError>
    where
        T: Send,
        F: FnOnce(&mut Tour) -> Result<T, DomainError> + Send,
    {
        let mut tx = self.pool.begin().await?;

        let row: Option<TourRow> = sqlx::query_as(&format!(
            "SELECT {} FROM tours WHERE id = $1 FOR UPDATE",
            TOUR_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let mut tour = row
            .map(tour_from_row)
            .ok_or(DomainError::TourNotFound(id))?;

        let out = f(&mut tour)?;

        sqlx::query(
            r#"
            UPDATE tours
            SET title = $2, activities = $3, version = $4, stops = $5, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(tour.id)
        .bind(&tour.title)
        .bind(&tour.activities)
        .bind(tour.version)
        .bind(Json(&tour.stops))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(tour_id = %id, version = tour.version, "Tour updated");
        Ok(out)
    }
}

#[async_trait]
impl TourStore for PgTourStore {
    async fn create(&self, draft: TourDraft) -> Result<Tour, StoreError> {
        let tour = Tour::create(draft)?;

        sqlx::query(
            r#"
            INSERT INTO tours (id, title, activities, launch_date, version, stops)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(tour.id)
        .bind(&tour.title)
        .bind(&tour.activities)
        .bind(tour.launch_date)
        .bind(tour.version)
        .bind(Json(&tour.stops))
        .execute(&self.pool)
        .await?;

        tracing::info!(tour_id = %tour.id, "Tour created");
        Ok(tour)
    }

    async fn list_all(&self) -> Result<Vec<TourSummary>, StoreError> {
        let rows: Vec<(Uuid, String, DateTime<Utc>)> =
            sqlx::query_as("SELECT id, title, launch_date FROM tours ORDER BY seq")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(id, title, launch_date)| TourSummary {
                id,
                title,
                launch_date,
            })
            .collect())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Tour, StoreError> {
        let row: Option<TourRow> =
            sqlx::query_as(&format!("SELECT {} FROM tours WHERE id = $1", TOUR_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(tour_from_row)
            .ok_or_else(|| DomainError::TourNotFound(id).into())
    }

    async fn replace(
        &self,
        id: Uuid,
        changes: TourChanges,
        expected_version: Option<i64>,
    ) -> Result<Tour, StoreError> {
        self.mutate(id, move |tour| {
            tour.check_version(expected_version)?;
            tour.replace(changes)?;
            Ok(tour.clone())
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM tours WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::TourNotFound(id).into());
        }

        tracing::info!(tour_id = %id, "Tour deleted");
        Ok(())
    }

    async fn add_stop(&self, tour_id: Uuid, stop: Stop) -> Result<Tour, StoreError> {
        self.mutate(tour_id, move |tour| {
            tour.add_stop(stop);
            Ok(tour.clone())
        })
        .await
    }

    async fn update_stop(
        &self,
        tour_id: Uuid,
        stop_id: Uuid,
        patch: StopPatch,
    ) -> Result<Stop, StoreError> {
        self.mutate(tour_id, move |tour| tour.update_stop(stop_id, &patch))
            .await
    }

    async fn remove_stop(&self, tour_id: Uuid, stop_id: Uuid) -> Result<(), StoreError> {
        self.mutate(tour_id, move |tour| tour.remove_stop(stop_id).map(|_| ()))
            .await
    }
}
