//! API Routes
//!
//! HTTP endpoint definitions. Handlers validate the input shape, delegate to
//! the store and the enrichment pipeline, and translate outcomes into
//! responses.

use axum::{
    extract::{Extension, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{RequestContext, Stop, StopPatch, Tour, TourChanges, TourDraft, TourSummary};
use crate::error::{AppError, AppResult};

use super::extract::{expected_version, version_etag, AppJson, AppPath};
use super::AppState;

// =========================================================================
// Request types
// =========================================================================

/// Body of `POST /tours`
pub type CreateTourRequest = TourDraft;

/// Body of `PUT /tours/:tour_id`
pub type ReplaceTourRequest = TourChanges;

/// Body of `PUT /tours/:tour_id/stops/:stop_id`
pub type UpdateStopRequest = StopPatch;

/// Body of `POST /tours/:tour_id/stops`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStopRequest {
    #[serde(alias = "zip")]
    pub postal_code: String,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/tours", post(create_tour).get(list_tours))
        .route(
            "/tours/:tour_id",
            get(get_tour).put(replace_tour).delete(delete_tour),
        )
        .route("/tours/:tour_id/stops", post(add_stop))
        .route(
            "/tours/:tour_id/stops/:stop_id",
            put(update_stop).delete(remove_stop),
        )
}

// =========================================================================
// POST /tours
// =========================================================================

/// Create a new tour
async fn create_tour(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    AppJson(request): AppJson<CreateTourRequest>,
) -> AppResult<(StatusCode, Json<Tour>)> {
    let tour = state.store.create(request).await?;

    tracing::info!(
        correlation_id = %context.correlation_id,
        tour_id = %tour.id(),
        "Tour created"
    );

    Ok((StatusCode::CREATED, Json(tour)))
}

// =========================================================================
// GET /tours
// =========================================================================

/// List all tours, projected to id, title and launch date
async fn list_tours(State(state): State<AppState>) -> AppResult<Json<Vec<TourSummary>>> {
    Ok(Json(state.store.list_all().await?))
}

// =========================================================================
// GET /tours/:tour_id
// =========================================================================

/// Get a tour with all its stops
async fn get_tour(
    State(state): State<AppState>,
    AppPath(tour_id): AppPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    let tour = state.store.get_by_id(tour_id).await?;
    Ok(([(header::ETAG, version_etag(tour.version()))], Json(tour)))
}

// =========================================================================
// PUT /tours/:tour_id
// =========================================================================

/// Replace title and activities.
///
/// Last write wins unless the caller sends `If-Match: "<version>"`, in which
/// case a stale version is rejected with 409.
async fn replace_tour(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    AppPath(tour_id): AppPath<Uuid>,
    headers: HeaderMap,
    AppJson(request): AppJson<ReplaceTourRequest>,
) -> AppResult<impl IntoResponse> {
    let expected = expected_version(&headers)?;
    let tour = state.store.replace(tour_id, request, expected).await?;

    tracing::info!(
        correlation_id = %context.correlation_id,
        tour_id = %tour_id,
        version = tour.version(),
        "Tour replaced"
    );

    Ok(([(header::ETAG, version_etag(tour.version()))], Json(tour)))
}

// =========================================================================
// DELETE /tours/:tour_id
// =========================================================================

/// Delete a tour and its stops
async fn delete_tour(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    AppPath(tour_id): AppPath<Uuid>,
) -> AppResult<StatusCode> {
    state.store.delete(tour_id).await?;

    tracing::info!(
        correlation_id = %context.correlation_id,
        tour_id = %tour_id,
        "Tour deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

// =========================================================================
// POST /tours/:tour_id/stops
// =========================================================================

/// Enrich a postal code into a stop and append it to the tour
async fn add_stop(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    AppPath(tour_id): AppPath<Uuid>,
    AppJson(request): AppJson<AddStopRequest>,
) -> AppResult<Json<Stop>> {
    // Unknown tours fail before any provider is called
    state.store.get_by_id(tour_id).await?;

    // Enrichment and append run as one task: a caller hanging up cannot stop
    // it between the lookups and the write.
    let AppState { store, enricher } = state;
    let task = tokio::spawn(async move {
        let stop = enricher.enrich(&request.postal_code).await?;
        store.add_stop(tour_id, stop.clone()).await?;
        Ok::<Stop, AppError>(stop)
    });

    let stop = task
        .await
        .map_err(|e| AppError::Internal(format!("add stop task failed: {}", e)))??;

    tracing::info!(
        correlation_id = %context.correlation_id,
        tour_id = %tour_id,
        stop_id = %stop.id,
        postal_code = %stop.location.postal_code,
        "Stop added"
    );

    Ok(Json(stop))
}

// =========================================================================
// PUT /tours/:tour_id/stops/:stop_id
// =========================================================================

/// Update the patchable fields of a stop
async fn update_stop(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    AppPath((tour_id, stop_id)): AppPath<(Uuid, Uuid)>,
    AppJson(request): AppJson<UpdateStopRequest>,
) -> AppResult<Json<Stop>> {
    let stop = state.store.update_stop(tour_id, stop_id, request).await?;

    tracing::info!(
        correlation_id = %context.correlation_id,
        tour_id = %tour_id,
        stop_id = %stop_id,
        "Stop updated"
    );

    Ok(Json(stop))
}

// =========================================================================
// DELETE /tours/:tour_id/stops/:stop_id
// =========================================================================

/// Remove a stop from its tour
async fn remove_stop(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    AppPath((tour_id, stop_id)): AppPath<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    state.store.remove_stop(tour_id, stop_id).await?;

    tracing::info!(
        correlation_id = %context.correlation_id,
        tour_id = %tour_id,
        stop_id = %stop_id,
        "Stop removed"
    );

    Ok(StatusCode::NO_CONTENT)
}
