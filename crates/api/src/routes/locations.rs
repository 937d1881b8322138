//! Location endpoint handlers.

use axum::{extract::State, Json};
use domain::models::location::UpdateLocationRequest;
use domain::models::{Location, LocationSource};
use persistence::repositories::LocationRepository;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CallerId;

/// Report the caller's position.
///
/// PUT /api/v1/me/location
pub async fn update_my_location(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Json(request): Json<UpdateLocationRequest>,
) -> Result<Json<Location>, ApiError> {
    let repo = LocationRepository::new(state.pool.clone());

    repo.set_location(
        &user_id,
        request.latitude,
        request.longitude,
        LocationSource::Manual,
    )
    .await?;

    let location = repo
        .get_location(&user_id)
        .await?
        .ok_or_else(|| ApiError::Internal("Location missing after write".to_string()))?;

    Ok(Json(location.into()))
}

/// GET /api/v1/me/location
pub async fn get_my_location(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
) -> Result<Json<Location>, ApiError> {
    let repo = LocationRepository::new(state.pool.clone());

    let location = repo
        .get_location(&user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No location reported yet".to_string()))?;

    Ok(Json(location.into()))
}
