//! Request Context
//!
//! Metadata about the current request, used for log correlation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for a request, attached as an axum extension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// Correlation ID for request tracing
    pub correlation_id: Uuid,
}

impl RequestContext {
    /// Create a context with a fresh correlation ID
    pub fn new() -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
        }
    }

    /// Create context with an existing correlation ID
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = correlation_id;
        self
    }

    /// Parse a caller-supplied correlation header, falling back to a new ID
    pub fn from_header(value: Option<&str>) -> Self {
        match value.and_then(|s| Uuid::parse_str(s.trim()).ok()) {
            Some(id) => Self::new().with_correlation_id(id),
            None => Self::new(),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
