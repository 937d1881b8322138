//! Team repository for database operations.

use domain::models::team::OWNER_DEFAULT_COLOR;
use domain::models::{MemberState, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{MemberStateDb, RosterEntryEntity, TeamEntity};
use crate::metrics::QueryTimer;

/// Repository for team and membership database operations.
#[derive(Clone)]
pub struct TeamRepository {
    pool: PgPool,
}

impl TeamRepository {
    /// Creates a new TeamRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Whether a user belongs to a team.
    ///
    /// Members in the `off` state only count when `include_inactive` is set.
    pub async fn is_member(
        &self,
        user_id: &UserId,
        team_id: Uuid,
        include_inactive: bool,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("is_team_member");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM team_memberships
                WHERE team_id = $1 AND user_id = $2 AND ($3 OR state = 'on')
            )
            "#,
        )
        .bind(team_id)
        .bind(user_id.as_str())
        .bind(include_inactive)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Whether a user owns a team. Unknown teams are owned by nobody.
    pub async fn is_owner(&self, user_id: &UserId, team_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("is_team_owner");
        let result = sqlx::query_scalar::<_, String>(
            r#"
            SELECT owner_id FROM teams WHERE id = $1
            "#,
        )
        .bind(team_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        Ok(result?.is_some_and(|owner| owner == user_id.as_str()))
    }

    /// Find a team by ID.
    pub async fn find_by_id(&self, team_id: Uuid) -> Result<Option<TeamEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_team_by_id");
        let result = sqlx::query_as::<_, TeamEntity>(
            r#"
            SELECT id, owner_id, name, created_at
            FROM teams
            WHERE id = $1
            "#,
        )
        .bind(team_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Create a team and add the owner as an active member.
    pub async fn create_team(&self, name: &str, owner_id: &UserId) -> Result<Uuid, sqlx::Error> {
        let timer = QueryTimer::new("create_team");
        let team_id = Uuid::new_v4();

        // Team and owner membership are created atomically
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO teams (id, owner_id, name)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(team_id)
        .bind(owner_id.as_str())
        .bind(name)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO team_memberships (team_id, user_id, state, color)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(team_id)
        .bind(owner_id.as_str())
        .bind(MemberStateDb::On)
        .bind(OWNER_DEFAULT_COLOR)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(team_id)
    }

    /// Delete a team together with all of its memberships.
    ///
    /// Both deletes run in one transaction; nothing is removed if either fails.
    /// Returns false if the team did not exist.
    pub async fn delete_team(&self, team_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_team");
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM team_memberships WHERE team_id = $1
            "#,
        )
        .bind(team_id)
        .execute(&mut *tx)
        .await?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM teams WHERE id = $1
            "#,
        )
        .bind(team_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        timer.record();
        Ok(deleted > 0)
    }

    /// Add a user to a team. New members start inactive with no color.
    pub async fn add_member(&self, team_id: Uuid, user_id: &UserId) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("add_team_member");
        let result = sqlx::query(
            r#"
            INSERT INTO team_memberships (team_id, user_id, state, color)
            VALUES ($1, $2, 'off', '')
            "#,
        )
        .bind(team_id)
        .bind(user_id.as_str())
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    /// Remove a user from a team. Returns false if they were not a member.
    pub async fn remove_member(&self, team_id: Uuid, user_id: &UserId) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("remove_team_member");
        let result = sqlx::query(
            r#"
            DELETE FROM team_memberships WHERE team_id = $1 AND user_id = $2
            "#,
        )
        .bind(team_id)
        .bind(user_id.as_str())
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Switch a member on or off. Returns false if they were not a member.
    pub async fn set_member_state(
        &self,
        team_id: Uuid,
        user_id: &UserId,
        state: MemberState,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("set_member_state");
        let result = sqlx::query(
            r#"
            UPDATE team_memberships SET state = $3
            WHERE team_id = $1 AND user_id = $2
            "#,
        )
        .bind(team_id)
        .bind(user_id.as_str())
        .bind(MemberStateDb::from(state))
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Change a member's display color. Returns false if they were not a member.
    pub async fn set_member_color(
        &self,
        team_id: Uuid,
        user_id: &UserId,
        color: &str,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("set_member_color");
        let result = sqlx::query(
            r#"
            UPDATE team_memberships SET color = $3
            WHERE team_id = $1 AND user_id = $2
            "#,
        )
        .bind(team_id)
        .bind(user_id.as_str())
        .bind(color)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Apply a state and/or color change in one statement.
    ///
    /// `None` leaves the field as it is. Returns false if they were not a member.
    pub async fn update_member(
        &self,
        team_id: Uuid,
        user_id: &UserId,
        state: Option<MemberState>,
        color: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("update_member");
        let result = sqlx::query(
            r#"
            UPDATE team_memberships
            SET state = COALESCE($3, state),
                color = COALESCE($4, color)
            WHERE team_id = $1 AND user_id = $2
            "#,
        )
        .bind(team_id)
        .bind(user_id.as_str())
        .bind(state.map(MemberStateDb::from))
        .bind(color)
        .execute(&self.pool)
        .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Team members with their last known location.
    ///
    /// Members without a location row are included with empty coordinates.
    /// Ordered by display name, then user id.
    pub async fn fetch_roster(
        &self,
        team_id: Uuid,
        include_inactive: bool,
    ) -> Result<Vec<RosterEntryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("fetch_roster");
        let result = sqlx::query_as::<_, RosterEntryEntity>(
            r#"
            SELECT
                m.team_id, m.user_id, u.display_name, m.color, m.state,
                l.latitude, l.longitude, l.updated_at AS location_updated_at
            FROM team_memberships m
            JOIN users u ON u.id = m.user_id
            LEFT JOIN locations l ON l.user_id = m.user_id
            WHERE m.team_id = $1 AND ($2 OR m.state = 'on')
            ORDER BY u.display_name, u.id
            "#,
        )
        .bind(team_id)
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
