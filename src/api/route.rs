//! Routing decision endpoint

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::{DecisionResponse, VisitorEvent},
};

/// Route a visitor to the best matching target
#[utoipa::path(
    post,
    path = "/route",
    tag = "route",
    request_body = VisitorEvent,
    responses(
        (status = 200, description = "Accept with destination url, or reject", body = DecisionResponse),
        (status = 400, description = "Missing or unparseable timestamp / geoState", body = crate::error::ErrorResponse),
        (status = 503, description = "Store unavailable", body = crate::error::ErrorResponse)
    )
)]
pub async fn route_visitor(
    State(state): State<crate::AppState>,
    Json(event): Json<VisitorEvent>,
) -> AppResult<Json<DecisionResponse>> {
    let outcome = state.services.decisions.decide(&event).await?;
    Ok(Json(outcome.into()))
}
