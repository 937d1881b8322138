//! User repository for database operations.

use domain::models::{ExternalId, PollTarget, TrustAgent, UserId};
use sqlx::PgPool;

use crate::entities::{PollTargetEntity, UserEntity};
use crate::metrics::QueryTimer;

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the user on first sight, or update the display name.
    pub async fn upsert_user(
        &self,
        id: &UserId,
        display_name: &str,
    ) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_user");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (id, display_name)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE
            SET display_name = EXCLUDED.display_name, updated_at = NOW()
            RETURNING id, display_name, external_id, level, verified, blacklisted,
                      status_polling, created_at, updated_at
            "#,
        )
        .bind(id.as_str())
        .bind(display_name)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a user by primary identifier.
    pub async fn find_by_id(&self, id: &UserId) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, display_name, external_id, level, verified, blacklisted,
                   status_polling, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Read the trust API identifier stored for a user.
    ///
    /// Returns `None` both for unknown users and for users without one.
    pub async fn external_id(&self, id: &UserId) -> Result<Option<ExternalId>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_external_id");
        let result = sqlx::query_scalar::<_, Option<String>>(
            r#"
            SELECT external_id FROM users WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        Ok(result?
            .flatten()
            .filter(|e| !e.is_empty())
            .map(ExternalId::from))
    }

    /// Opt a user in or out of status polling.
    ///
    /// Returns false if the user does not exist.
    pub async fn set_status_polling(&self, id: &UserId, enabled: bool) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("set_status_polling");
        let result = sqlx::query(
            r#"
            UPDATE users
            SET status_polling = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .bind(enabled)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// All users that opted into status polling.
    pub async fn status_poll_targets(&self) -> Result<Vec<PollTarget>, sqlx::Error> {
        let timer = QueryTimer::new("status_poll_targets");
        let result = sqlx::query_as::<_, PollTargetEntity>(
            r#"
            SELECT id, external_id
            FROM users
            WHERE status_polling = TRUE
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result?.into_iter().map(PollTarget::from).collect())
    }

    /// Overwrite the trust fields of a user with data from the trust API.
    ///
    /// Returns false if the user does not exist.
    pub async fn apply_trust_record(
        &self,
        id: &UserId,
        agent: &TrustAgent,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("apply_trust_record");
        let result = sqlx::query(
            r#"
            UPDATE users
            SET display_name = $2, level = $3, verified = $4, blacklisted = $5,
                external_id = $6, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .bind(&agent.agent)
        .bind(agent.level_i32())
        .bind(agent.verified)
        .bind(agent.blacklisted)
        .bind(agent.external_id().map(|e| e.as_str().to_string()))
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
