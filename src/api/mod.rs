//! API handlers for the target router REST endpoints

pub mod health;
pub mod openapi;
pub mod route;
pub mod targets;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let routes = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Target registry
        .route(
            "/api/targets",
            get(targets::list_targets).post(targets::create_target),
        )
        .route(
            "/api/target/:id",
            get(targets::get_target)
                .post(targets::update_target)
                .delete(targets::delete_target),
        )
        .route("/api/target/:id/traffic", get(targets::get_traffic))
        // Decisions
        .route("/route", post(route::route_visitor))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
