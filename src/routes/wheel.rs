use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::{
        common::ActionResponse,
        wheel::{AddOptionRequest, WheelSnapshotResponse},
    },
    error::AppError,
    services::option_service,
    state::SharedState,
};

/// Routes serving the wheel snapshot and option registration.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/state", get(wheel_snapshot))
        .route("/options", post(add_option))
        .route("/reset", post(reset_wheel))
}

/// Return the full wheel snapshot polled by viewers.
#[utoipa::path(
    get,
    path = "/state",
    tag = "wheel",
    responses(
        (status = 200, description = "Current shared wheel state", body = WheelSnapshotResponse)
    )
)]
pub async fn wheel_snapshot(
    State(state): State<SharedState>,
) -> Result<Json<WheelSnapshotResponse>, AppError> {
    let snapshot = option_service::snapshot(state.coordinator()).await?;
    Ok(Json(snapshot))
}

/// Register a new option with a usage limit.
#[utoipa::path(
    post,
    path = "/options",
    tag = "wheel",
    request_body = AddOptionRequest,
    responses(
        (status = 200, description = "Registration outcome", body = ActionResponse)
    )
)]
pub async fn add_option(
    State(state): State<SharedState>,
    Json(payload): Json<AddOptionRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    payload.validate()?;
    let reply = option_service::add_option(
        state.coordinator(),
        &payload.name,
        &payload.description,
        payload.limit,
    )
    .await?;
    Ok(Json(reply.into()))
}

/// Reset the shared state to the default document.
#[utoipa::path(
    post,
    path = "/reset",
    tag = "wheel",
    responses(
        (status = 200, description = "State reset", body = ActionResponse)
    )
)]
pub async fn reset_wheel(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    option_service::reset(state.coordinator()).await?;
    Ok(Json(ActionResponse {
        ok: true,
        message: "Shared state reset.".into(),
    }))
}
