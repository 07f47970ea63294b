//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::DomainError;
use crate::enrichment::EnrichmentError;
use crate::store::StoreError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    // Stop enrichment errors
    #[error(transparent)]
    Enrichment(#[from] EnrichmentError),

    // Server errors (5xx)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Domain(e) => AppError::Domain(e),
            StoreError::Database(e) => AppError::Database(e),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str, Option<String>) {
        match self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }

            // Domain errors - map to appropriate HTTP status
            AppError::Domain(domain_err) => match domain_err {
                DomainError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "validation_error", Some(msg.clone()))
                }
                DomainError::TourNotFound(id) => {
                    (StatusCode::NOT_FOUND, "tour_not_found", Some(id.to_string()))
                }
                DomainError::StopNotFound { stop_id, .. } => {
                    (StatusCode::NOT_FOUND, "stop_not_found", Some(stop_id.to_string()))
                }
                DomainError::VersionConflict { expected, found } => (
                    StatusCode::CONFLICT,
                    "version_conflict",
                    Some(format!("expected {}, found {}", expected, found)),
                ),
            },

            // Enrichment errors: bad input vs degraded provider
            AppError::Enrichment(enrichment_err) => match enrichment_err {
                EnrichmentError::InvalidIdentifier(code) => {
                    (StatusCode::BAD_REQUEST, "invalid_identifier", Some(code.clone()))
                }
                EnrichmentError::LocationNotFound(code) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "location_not_found",
                    Some(code.clone()),
                ),
                EnrichmentError::WeatherUnavailable(_) => {
                    (StatusCode::BAD_GATEWAY, "weather_unavailable", None)
                }
                EnrichmentError::UpstreamUnavailable(_) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "upstream_unavailable", None)
                }
            },

            // 500 Internal Server Error
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = self.status_and_code();

        match &self {
            AppError::Database(e) => tracing::error!("Database error: {:?}", e),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            AppError::Enrichment(e) if e.is_upstream_error() => {
                tracing::warn!("Enrichment provider failure: {}", e)
            }
            AppError::Enrichment(e) if e.is_client_error() => {
                tracing::debug!("Stop enrichment rejected: {}", e)
            }
            _ => {}
        }

        let body = ErrorResponse {
            error: self.to_string(),
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
