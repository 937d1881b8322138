//! Location entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::UserId;
use sqlx::FromRow;

/// Database row mapping for the locations table.
#[derive(Debug, Clone, FromRow)]
pub struct LocationEntity {
    pub user_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub source: String,
    pub updated_at: DateTime<Utc>,
}

impl From<LocationEntity> for domain::models::Location {
    fn from(entity: LocationEntity) -> Self {
        Self {
            user_id: UserId::from(entity.user_id),
            latitude: entity.latitude,
            longitude: entity.longitude,
            source: entity.source,
            updated_at: entity.updated_at,
        }
    }
}
