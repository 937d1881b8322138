//! Team endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::team::{
    AddMemberRequest, CreateTeamRequest, CreateTeamResponse, RosterQuery, RosterResponse,
    UpdateMemberRequest,
};
use domain::models::{RosterEntry, Team, UserId};
use persistence::repositories::TeamRepository;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CallerId;

/// Whether `caller` may change or remove the membership of `target`.
///
/// Owners manage everyone; members manage only themselves.
fn can_manage_member(caller: &UserId, owner: &UserId, target: &UserId) -> bool {
    caller == owner || caller == target
}

async fn load_team(repo: &TeamRepository, team_id: Uuid) -> Result<Team, ApiError> {
    repo.find_by_id(team_id)
        .await?
        .map(Team::from)
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))
}

/// Create a team owned by the caller.
///
/// POST /api/v1/teams
pub async fn create_team(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Json(request): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<CreateTeamResponse>), ApiError> {
    request.validate()?;

    let repo = TeamRepository::new(state.pool.clone());
    let name = request.name.trim().to_string();
    let team_id = repo.create_team(&name, &user_id).await?;

    info!(team_id = %team_id, owner_id = %user_id, "Team created");

    Ok((
        StatusCode::CREATED,
        Json(CreateTeamResponse { id: team_id, name }),
    ))
}

/// Team roster with member locations.
///
/// Any member may read the roster, including members who are switched off.
///
/// GET /api/v1/teams/:team_id
pub async fn get_roster(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Path(team_id): Path<Uuid>,
    Query(query): Query<RosterQuery>,
) -> Result<Json<RosterResponse>, ApiError> {
    let repo = TeamRepository::new(state.pool.clone());
    let team = load_team(&repo, team_id).await?;

    if !repo.is_member(&user_id, team_id, true).await? {
        return Err(ApiError::Forbidden(
            "You are not a member of this team".to_string(),
        ));
    }

    let members: Vec<RosterEntry> = repo
        .fetch_roster(team_id, query.include_inactive)
        .await?
        .into_iter()
        .map(RosterEntry::from)
        .collect();

    Ok(Json(RosterResponse {
        team_id: team.id,
        name: team.name,
        owner_id: team.owner_id,
        members,
    }))
}

/// DELETE /api/v1/teams/:team_id
pub async fn delete_team(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Path(team_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = TeamRepository::new(state.pool.clone());
    let team = load_team(&repo, team_id).await?;

    if team.owner_id != user_id {
        return Err(ApiError::Forbidden(
            "Only the team owner can delete the team".to_string(),
        ));
    }

    if !repo.delete_team(team_id).await? {
        return Err(ApiError::NotFound("Team not found".to_string()));
    }

    info!(team_id = %team_id, user_id = %user_id, "Team deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Add a user to the team. New members start switched off.
///
/// POST /api/v1/teams/:team_id/members
pub async fn add_member(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Path(team_id): Path<Uuid>,
    Json(request): Json<AddMemberRequest>,
) -> Result<StatusCode, ApiError> {
    request.validate()?;

    let repo = TeamRepository::new(state.pool.clone());
    let team = load_team(&repo, team_id).await?;

    if team.owner_id != user_id {
        return Err(ApiError::Forbidden(
            "Only the team owner can add members".to_string(),
        ));
    }

    let member_id = UserId::new(request.user_id.trim());
    // Duplicate membership maps to 409, unknown user to 404
    repo.add_member(team_id, &member_id).await?;

    info!(team_id = %team_id, member_id = %member_id, "Member added");
    Ok(StatusCode::CREATED)
}

/// DELETE /api/v1/teams/:team_id/members/:user_id
pub async fn remove_member(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Path((team_id, member_id)): Path<(Uuid, String)>,
) -> Result<StatusCode, ApiError> {
    let member_id = UserId::new(member_id);
    let repo = TeamRepository::new(state.pool.clone());
    let team = load_team(&repo, team_id).await?;

    if !can_manage_member(&user_id, &team.owner_id, &member_id) {
        return Err(ApiError::Forbidden(
            "Only the team owner can remove other members".to_string(),
        ));
    }

    if member_id == team.owner_id {
        return Err(ApiError::Validation(
            "The owner cannot leave the team; delete it instead".to_string(),
        ));
    }

    if !repo.remove_member(team_id, &member_id).await? {
        return Err(ApiError::NotFound("Member not found".to_string()));
    }

    info!(team_id = %team_id, member_id = %member_id, "Member removed");
    Ok(StatusCode::NO_CONTENT)
}

/// Switch a member on or off, or change their color.
///
/// PUT /api/v1/teams/:team_id/members/:user_id
pub async fn update_member(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Path((team_id, member_id)): Path<(Uuid, String)>,
    Json(request): Json<UpdateMemberRequest>,
) -> Result<StatusCode, ApiError> {
    if request.state.is_none() && request.color.is_none() {
        return Err(ApiError::Validation(
            "Nothing to update: provide state or color".to_string(),
        ));
    }

    let color = request.color.as_deref().map(str::trim);
    if let Some(color) = color {
        shared::validation::validate_color(color).map_err(|e| {
            ApiError::Validation(
                e.message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid color".to_string()),
            )
        })?;
    }

    let member_id = UserId::new(member_id);
    let repo = TeamRepository::new(state.pool.clone());
    let team = load_team(&repo, team_id).await?;

    if !can_manage_member(&user_id, &team.owner_id, &member_id) {
        return Err(ApiError::Forbidden(
            "Only the team owner can change other members".to_string(),
        ));
    }

    if !repo
        .update_member(team_id, &member_id, request.state, color)
        .await?
    {
        return Err(ApiError::NotFound("Member not found".to_string()));
    }

    info!(
        team_id = %team_id,
        member_id = %member_id,
        state = ?request.state,
        "Member updated"
    );
    Ok(StatusCode::NO_CONTENT)
}
