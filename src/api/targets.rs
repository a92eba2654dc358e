//! Target registry endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        target::{TargetEnvelope, TargetList, TargetPayload},
        traffic::TrafficView,
        Target,
    },
};

/// List all targets
#[utoipa::path(
    get,
    path = "/api/targets",
    tag = "targets",
    responses(
        (status = 200, description = "All registered targets", body = TargetList)
    )
)]
pub async fn list_targets(State(state): State<crate::AppState>) -> AppResult<Json<TargetList>> {
    let targets = state.services.targets.list().await?;
    Ok(Json(TargetList { targets }))
}

/// Register a target
#[utoipa::path(
    post,
    path = "/api/targets",
    tag = "targets",
    request_body = TargetPayload,
    responses(
        (status = 200, description = "Target registered", body = Target),
        (status = 400, description = "Missing id or invalid field", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_target(
    State(state): State<crate::AppState>,
    Json(data): Json<TargetPayload>,
) -> AppResult<Json<Target>> {
    let target = state.services.targets.create(data).await?;
    Ok(Json(target))
}

/// Get target by ID
#[utoipa::path(
    get,
    path = "/api/target/{id}",
    tag = "targets",
    params(("id" = String, Path, description = "Target ID")),
    responses(
        (status = 200, description = "The target, or null when unknown", body = TargetEnvelope)
    )
)]
pub async fn get_target(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<TargetEnvelope>> {
    let target = state.services.targets.get(&id).await?;
    Ok(Json(TargetEnvelope { target }))
}

/// Update target
#[utoipa::path(
    post,
    path = "/api/target/{id}",
    tag = "targets",
    params(("id" = String, Path, description = "Target ID")),
    request_body = TargetPayload,
    responses(
        (status = 200, description = "Target updated", body = Target)
    )
)]
pub async fn update_target(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    Json(data): Json<TargetPayload>,
) -> AppResult<Json<Target>> {
    let target = state.services.targets.update(&id, data).await?;
    Ok(Json(target))
}

/// Delete target and its traffic counter
#[utoipa::path(
    delete,
    path = "/api/target/{id}",
    tag = "targets",
    params(("id" = String, Path, description = "Target ID")),
    responses(
        (status = 204, description = "Target deleted"),
        (status = 404, description = "Unknown target", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_target(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.services.targets.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Today's acceptance count for a target
#[utoipa::path(
    get,
    path = "/api/target/{id}/traffic",
    tag = "targets",
    params(("id" = String, Path, description = "Target ID")),
    responses(
        (status = 200, description = "Traffic counter for today", body = TrafficView),
        (status = 404, description = "Unknown target", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_traffic(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<TrafficView>> {
    let view = state.services.targets.traffic(&id).await?;
    Ok(Json(view))
}
