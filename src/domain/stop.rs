//! Stop value
//!
//! A stop is owned by its parent tour and only exists fully enriched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Geographic data resolved from a postal code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub postal_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// State or region; always present once resolved
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Current conditions at a resolved location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weather {
    /// Temperature in degrees Fahrenheit
    pub temperature: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
    pub observed_at: DateTime<Utc>,
}

/// A stop embedded in a tour.
///
/// Both `location` and `weather` are required: a stop cannot be built from a
/// partial enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub id: Uuid,
    pub location: Location,
    pub weather: Weather,
    #[serde(default)]
    pub attendance: Option<u32>,
}

impl Stop {
    /// Build a freshly enriched stop with a new id and no attendance
    pub fn enriched(location: Location, weather: Weather) -> Self {
        Self {
            id: Uuid::new_v4(),
            location,
            weather,
            attendance: None,
        }
    }

    /// Apply the whitelisted patch fields
    pub fn apply_patch(&mut self, patch: &StopPatch) {
        if let Some(attendance) = patch.attendance {
            self.attendance = Some(attendance);
        }
    }
}

/// Fields a client may change on an existing stop.
///
/// Anything else in the request body (including `location` and `weather`)
/// is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopPatch {
    #[serde(default)]
    pub attendance: Option<u32>,
}

impl StopPatch {
    pub fn attendance(attendance: u32) -> Self {
        Self {
            attendance: Some(attendance),
        }
    }
}
