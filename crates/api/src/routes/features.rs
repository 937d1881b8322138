//! Feature flags exposed to the front-end.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::app::AppState;

#[derive(Debug, Serialize)]
pub struct FeaturesResponse {
    /// Agent lookups and status polling are available.
    pub trust_enabled: bool,
}

/// GET /api/v1/features
pub async fn get_features(State(state): State<AppState>) -> Json<FeaturesResponse> {
    Json(FeaturesResponse {
        trust_enabled: state.trust.is_configured(),
    })
}
