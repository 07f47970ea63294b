//! Domain module
//!
//! Core domain types and business logic.

pub mod context;
pub mod error;
pub mod stop;
pub mod tour;

pub use context::RequestContext;
pub use error::DomainError;
pub use stop::{Location, Stop, StopPatch, Weather};
pub use tour::{Tour, TourChanges, TourDraft, TourSummary};
