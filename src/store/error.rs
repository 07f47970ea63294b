//! Store Errors
//!
//! Error types for tour store operations.

use crate::domain::DomainError;

/// Errors that can occur in the tour store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Domain rule violation (not found, validation, version conflict)
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Backend failure without a more specific cause
    #[error("Storage error: {0}")]
    Storage(String),
}

impl StoreError {
    /// Check if the target tour or stop does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Domain(e) if e.is_not_found())
    }

    /// Check if this error is a version conflict
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, StoreError::Domain(e) if e.is_conflict_error())
    }
}
