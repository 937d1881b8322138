//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{ExternalId, PollTarget, UserId};
use sqlx::FromRow;

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: String,
    pub display_name: String,
    pub external_id: Option<String>,
    pub level: i32,
    pub verified: bool,
    pub blacklisted: bool,
    pub status_polling: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntity> for domain::models::User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: UserId::from(entity.id),
            display_name: entity.display_name,
            external_id: entity.external_id.map(ExternalId::from),
            level: entity.level,
            verified: entity.verified,
            blacklisted: entity.blacklisted,
            status_polling: entity.status_polling,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Row returned when enumerating users that opted into status polling.
#[derive(Debug, Clone, FromRow)]
pub struct PollTargetEntity {
    pub id: String,
    pub external_id: Option<String>,
}

impl From<PollTargetEntity> for PollTarget {
    fn from(entity: PollTargetEntity) -> Self {
        Self {
            user_id: UserId::from(entity.id),
            // An empty string is as good as missing.
            external_id: entity
                .external_id
                .filter(|id| !id.is_empty())
                .map(ExternalId::from),
        }
    }
}
