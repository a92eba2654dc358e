//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{health, route, targets};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Target Router API",
        version = "1.0.0",
        description = "Traffic routing decisions over a registry of advertiser targets"
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Targets
        targets::list_targets,
        targets::create_target,
        targets::get_target,
        targets::update_target,
        targets::delete_target,
        targets::get_traffic,
        // Decisions
        route::route_visitor,
    ),
    components(
        schemas(
            // Targets
            crate::models::target::Target,
            crate::models::target::TargetPayload,
            crate::models::target::TargetEnvelope,
            crate::models::target::TargetList,
            crate::models::target::AcceptRules,
            crate::models::target::InSet,
            crate::models::traffic::TrafficView,
            // Decisions
            crate::models::decision::VisitorEvent,
            crate::models::decision::EventTimestamp,
            crate::models::decision::DecisionResponse,
            crate::models::decision::Decision,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "targets", description = "Target registry"),
        (name = "route", description = "Routing decisions")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
