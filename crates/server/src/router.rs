//! 路由表

use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

/// 组装全部路由
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/config",
            get(handlers::get_config).post(handlers::update_config),
        )
        .route("/api/generate-daily", post(handlers::generate_daily))
        .route("/api/generate-weekly", post(handlers::generate_weekly))
        .route("/api/save-daily", post(handlers::save_daily))
        .route("/api/save-weekly", post(handlers::save_weekly))
        .route("/api/check-exists", get(handlers::check_exists))
        .route(
            "/api/current-week/dailies",
            get(handlers::current_week_dailies),
        )
        .route("/api/history", get(handlers::history))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
