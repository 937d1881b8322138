//! Location domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::InvalidLocation;
use crate::models::user::UserId;

/// Where a location report came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocationSource {
    /// Reported directly by the user.
    Manual,
    /// Written by the background status poller.
    StatusPoll,
}

impl LocationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationSource::Manual => "manual",
            LocationSource::StatusPoll => "status-poll",
        }
    }
}

impl std::fmt::Display for LocationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Last known position of a user. One per user, overwritten on every report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Location {
    pub user_id: UserId,
    pub latitude: f64,
    pub longitude: f64,
    pub source: String,
    pub updated_at: DateTime<Utc>,
}

/// A latitude/longitude pair known to be within range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidLocation> {
        shared::validation::validate_latitude(latitude)
            .map_err(|_| InvalidLocation { latitude, longitude })?;
        shared::validation::validate_longitude(longitude)
            .map_err(|_| InvalidLocation { latitude, longitude })?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Request payload for reporting the caller's own location.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdateLocationRequest {
    pub latitude: f64,
    pub longitude: f64,
}
