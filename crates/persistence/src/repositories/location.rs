//! Location repository for database operations.

use domain::errors::InvalidLocation;
use domain::models::location::Coordinates;
use domain::models::{LocationSource, UserId};
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;

use crate::entities::LocationEntity;
use crate::metrics::QueryTimer;

/// Errors from writing a location.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error(transparent)]
    InvalidLocation(#[from] InvalidLocation),

    #[error("Database error: {0}")]
    Store(#[from] sqlx::Error),
}

/// Repository for location-related database operations.
#[derive(Clone)]
pub struct LocationRepository {
    pool: PgPool,
}

impl LocationRepository {
    /// Creates a new LocationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Upsert the single location row for a user.
    ///
    /// Out-of-range coordinates are rejected before the store is touched, so
    /// any previously stored location stays as it was. Concurrent writers are
    /// last write wins.
    pub async fn set_location(
        &self,
        user_id: &UserId,
        latitude: f64,
        longitude: f64,
        source: LocationSource,
    ) -> Result<(), LocationError> {
        let coords = Coordinates::new(latitude, longitude)?;

        let timer = QueryTimer::new("set_location");
        let result = sqlx::query(
            r#"
            INSERT INTO locations (user_id, latitude, longitude, source, updated_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (user_id) DO UPDATE
            SET latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                source = EXCLUDED.source,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_id.as_str())
        .bind(coords.latitude())
        .bind(coords.longitude())
        .bind(source.as_str())
        .execute(&self.pool)
        .await;
        timer.record();
        result?;

        debug!(user_id = %user_id, source = %source, "Location updated");
        Ok(())
    }

    /// Last known location of a user.
    pub async fn get_location(
        &self,
        user_id: &UserId,
    ) -> Result<Option<LocationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("get_location");
        let result = sqlx::query_as::<_, LocationEntity>(
            r#"
            SELECT user_id, latitude, longitude, source, updated_at
            FROM locations
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
