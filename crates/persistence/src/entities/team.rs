//! Team entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{MemberState, UserId};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for member_state that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "member_state", rename_all = "lowercase")]
pub enum MemberStateDb {
    On,
    Off,
}

impl From<MemberStateDb> for MemberState {
    fn from(db_state: MemberStateDb) -> Self {
        match db_state {
            MemberStateDb::On => MemberState::On,
            MemberStateDb::Off => MemberState::Off,
        }
    }
}

impl From<MemberState> for MemberStateDb {
    fn from(state: MemberState) -> Self {
        match state {
            MemberState::On => MemberStateDb::On,
            MemberState::Off => MemberStateDb::Off,
        }
    }
}

/// Database row mapping for the teams table.
#[derive(Debug, Clone, FromRow)]
pub struct TeamEntity {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<TeamEntity> for domain::models::Team {
    fn from(entity: TeamEntity) -> Self {
        Self {
            id: entity.id,
            owner_id: UserId::from(entity.owner_id),
            name: entity.name,
            created_at: entity.created_at,
        }
    }
}

/// Membership joined with user and last location.
#[derive(Debug, Clone, FromRow)]
pub struct RosterEntryEntity {
    pub team_id: Uuid,
    pub user_id: String,
    pub display_name: String,
    pub color: String,
    pub state: MemberStateDb,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_updated_at: Option<DateTime<Utc>>,
}

impl From<RosterEntryEntity> for domain::models::RosterEntry {
    fn from(entity: RosterEntryEntity) -> Self {
        Self {
            team_id: entity.team_id,
            user_id: UserId::from(entity.user_id),
            display_name: entity.display_name,
            color: entity.color,
            state: entity.state.into(),
            latitude: entity.latitude,
            longitude: entity.longitude,
            location_updated_at: entity.location_updated_at,
        }
    }
}
