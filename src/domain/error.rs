//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors
///
/// These errors represent rule violations on the Tour aggregate.
/// They are independent of the web/infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Malformed draft or patch
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Tour not found
    #[error("Tour not found: {0}")]
    TourNotFound(Uuid),

    /// Stop not found within its parent tour
    #[error("Stop {stop_id} not found in tour {tour_id}")]
    StopNotFound { tour_id: Uuid, stop_id: Uuid },

    /// Aggregate version conflict (optimistic locking)
    #[error("Version conflict: expected {expected}, found {found}")]
    VersionConflict { expected: i64, found: i64 },
}

impl DomainError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Check if the target tour or stop does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TourNotFound(_) | Self::StopNotFound { .. })
    }

    /// Check if this is a conflict error (retry may help)
    pub fn is_conflict_error(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}
