//! Team domain models for location sharing teams.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::models::user::UserId;

/// Color given to a team's owner when the team is created.
pub const OWNER_DEFAULT_COLOR: &str = "FF0000";

/// Whether a member currently shares with the team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberState {
    On,
    Off,
}

impl MemberState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberState::On => "on",
            MemberState::Off => "off",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, MemberState::On)
    }
}

impl FromStr for MemberState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "on" => Ok(MemberState::On),
            "off" => Ok(MemberState::Off),
            _ => Err(format!("Invalid member state: {}", s)),
        }
    }
}

impl fmt::Display for MemberState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a team of users sharing location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Team {
    pub id: Uuid,
    pub owner_id: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// One member of a team roster, joined with the member's last location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RosterEntry {
    pub team_id: Uuid,
    pub user_id: UserId,
    pub display_name: String,
    pub color: String,
    pub state: MemberState,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_updated_at: Option<DateTime<Utc>>,
}

/// Request payload for creating a team.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateTeamRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,
}

/// Response payload for team creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CreateTeamResponse {
    pub id: Uuid,
    pub name: String,
}

/// Request payload for adding a member to a team.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct AddMemberRequest {
    #[validate(length(min = 1, message = "User id is required"))]
    pub user_id: String,
}

/// Request payload for changing a member's state or color.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdateMemberRequest {
    pub state: Option<MemberState>,
    pub color: Option<String>,
}

/// Query parameters for roster fetches.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RosterQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// Response payload for a roster fetch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RosterResponse {
    pub team_id: Uuid,
    pub name: String,
    pub owner_id: UserId,
    pub members: Vec<RosterEntry>,
}
