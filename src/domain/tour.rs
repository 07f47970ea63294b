//! Tour Aggregate
//!
//! A tour and its embedded stops form one consistency and versioning unit.
//! Every mutation goes through a method here so that the version bump is
//! part of the same change the store persists.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DomainError, Stop, StopPatch};

/// Client-supplied fields for a new tour
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourDraft {
    pub title: String,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub launch_date: Option<DateTime<Utc>>,
}

impl TourDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            activities: Vec::new(),
            launch_date: None,
        }
    }

    pub fn with_activities<I, S>(mut self, activities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.activities = activities.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_launch_date(mut self, launch_date: DateTime<Utc>) -> Self {
        self.launch_date = Some(launch_date);
        self
    }
}

/// Replaceable fields of an existing tour.
///
/// `id`, `launchDate`, `version` and `stops` in a request body are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourChanges {
    pub title: String,
    #[serde(default)]
    pub activities: Vec<String>,
}

impl TourChanges {
    pub fn new(title: impl Into<String>, activities: Vec<String>) -> Self {
        Self {
            title: title.into(),
            activities,
        }
    }
}

/// List projection of a tour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourSummary {
    pub id: Uuid,
    pub title: String,
    pub launch_date: DateTime<Utc>,
}

/// Tour Aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tour {
    pub(crate) id: Uuid,
    pub(crate) title: String,
    pub(crate) activities: Vec<String>,
    pub(crate) launch_date: DateTime<Utc>,
    pub(crate) version: i64,
    pub(crate) stops: Vec<Stop>,
}

fn validate_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(DomainError::validation("title is required"));
    }
    Ok(title.to_string())
}

impl Tour {
    // =========================================================================
    // Tour::create()
    // =========================================================================

    /// Create a new tour at version 0 with no stops
    pub fn create(draft: TourDraft) -> Result<Self, DomainError> {
        let title = validate_title(&draft.title)?;

        Ok(Self {
            id: Uuid::new_v4(),
            title,
            activities: draft.activities,
            // Microsecond precision, as stored by Postgres
            launch_date: draft.launch_date.unwrap_or_else(Utc::now).trunc_subsecs(6),
            version: 0,
            stops: Vec::new(),
        })
    }

    // =========================================================================
    // Tour::replace()
    // =========================================================================

    /// Replace title and activities. Stops, id and launch date are kept.
    pub fn replace(&mut self, changes: TourChanges) -> Result<(), DomainError> {
        let title = validate_title(&changes.title)?;

        self.title = title;
        self.activities = changes.activities;
        self.bump_version();
        Ok(())
    }

    /// Reject the write if the caller saw a different version
    pub fn check_version(&self, expected: Option<i64>) -> Result<(), DomainError> {
        match expected {
            Some(expected) if expected != self.version => Err(DomainError::VersionConflict {
                expected,
                found: self.version,
            }),
            _ => Ok(()),
        }
    }

    // =========================================================================
    // Stop operations
    // =========================================================================

    /// Append an enriched stop
    pub fn add_stop(&mut self, stop: Stop) {
        self.stops.push(stop);
        self.bump_version();
    }

    /// Patch a stop and return its new state
    pub fn update_stop(&mut self, stop_id: Uuid, patch: &StopPatch) -> Result<Stop, DomainError> {
        let tour_id = self.id;
        let stop = self
            .stops
            .iter_mut()
            .find(|s| s.id == stop_id)
            .ok_or(DomainError::StopNotFound { tour_id, stop_id })?;

        stop.apply_patch(patch);
        let updated = stop.clone();
        self.bump_version();
        Ok(updated)
    }

    /// Remove a stop and return it
    pub fn remove_stop(&mut self, stop_id: Uuid) -> Result<Stop, DomainError> {
        let position = self
            .stops
            .iter()
            .position(|s| s.id == stop_id)
            .ok_or(DomainError::StopNotFound {
                tour_id: self.id,
                stop_id,
            })?;

        let removed = self.stops.remove(position);
        self.bump_version();
        Ok(removed)
    }

    fn bump_version(&mut self) {
        self.version += 1;
    }

    /// Project to the list view
    pub fn summary(&self) -> TourSummary {
        TourSummary {
            id: self.id,
            title: self.title.clone(),
            launch_date: self.launch_date,
        }
    }

    // Getters
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn activities(&self) -> &[String] {
        &self.activities
    }

    pub fn launch_date(&self) -> DateTime<Utc> {
        self.launch_date
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }
}
