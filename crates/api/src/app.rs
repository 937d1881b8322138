use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{features, health, locations, teams, users};
use crate::services::TrustClient;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub trust: Arc<TrustClient>,
}

pub fn create_app(config: Config, pool: PgPool, trust: Arc<TrustClient>) -> Router {
    let config = Arc::new(config);

    let state = AppState {
        pool,
        config: config.clone(),
        trust,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Routes acting on the caller named by X-User-Id
    let user_routes = Router::new()
        .route("/api/v1/me", put(users::upsert_me))
        .route("/api/v1/me/status-polling", put(users::set_status_polling))
        .route("/api/v1/me/agent/sync", post(users::sync_agent))
        .route(
            "/api/v1/me/location",
            put(locations::update_my_location).get(locations::get_my_location),
        );

    let team_routes = Router::new()
        .route("/api/v1/teams", post(teams::create_team))
        .route(
            "/api/v1/teams/:team_id",
            get(teams::get_roster).delete(teams::delete_team),
        )
        .route("/api/v1/teams/:team_id/members", post(teams::add_member))
        .route(
            "/api/v1/teams/:team_id/members/:user_id",
            put(teams::update_member).delete(teams::remove_member),
        );

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/v1/features", get(features::get_features))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(team_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
