//! Endpoints acting on the calling user.

use axum::{extract::State, Json};
use domain::models::user::{SetStatusPollingRequest, UpsertUserRequest};
use domain::models::{AgentIdentifier, User};
use persistence::repositories::UserRepository;
use serde::Serialize;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CallerId;

/// Result of syncing the caller with the trust API.
#[derive(Debug, Serialize)]
pub struct AgentSyncResponse {
    /// Whether the caller's record was changed.
    pub synced: bool,
    pub user: User,
}

/// Register the caller or change their display name.
///
/// PUT /api/v1/me
pub async fn upsert_me(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Json(request): Json<UpsertUserRequest>,
) -> Result<Json<User>, ApiError> {
    request.validate()?;

    let repo = UserRepository::new(state.pool.clone());
    let user = repo.upsert_user(&user_id, request.display_name.trim()).await?;

    info!(user_id = %user_id, "User registered");
    Ok(Json(user.into()))
}

/// Opt the caller in or out of status polling.
///
/// PUT /api/v1/me/status-polling
pub async fn set_status_polling(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Json(request): Json<SetStatusPollingRequest>,
) -> Result<Json<User>, ApiError> {
    let repo = UserRepository::new(state.pool.clone());

    if !repo.set_status_polling(&user_id, request.enabled).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let user: User = repo
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?
        .into();

    if user.status_polling && user.external_id.is_none() {
        info!(user_id = %user_id, "Status polling enabled before agent sync; user will be skipped");
    }

    Ok(Json(user))
}

/// Look the caller up at the trust API and store the result.
///
/// Uses the stored external identifier when the caller has one, otherwise the
/// caller's own identifier.
///
/// POST /api/v1/me/agent/sync
pub async fn sync_agent(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
) -> Result<Json<AgentSyncResponse>, ApiError> {
    let repo = UserRepository::new(state.pool.clone());

    if repo.find_by_id(&user_id).await?.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let identifier = match repo.external_id(&user_id).await? {
        Some(external_id) => AgentIdentifier::External(external_id),
        None => AgentIdentifier::User(user_id.clone()),
    };

    let record = state.trust.lookup_agent(&identifier).await?;
    let synced = state.trust.sync_agent(&repo, &user_id, &record).await?;

    let user = repo
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    info!(user_id = %user_id, synced, "Agent sync finished");
    Ok(Json(AgentSyncResponse {
        synced,
        user: user.into(),
    }))
}
