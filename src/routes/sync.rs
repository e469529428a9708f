use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::{common::ActionResponse, sync::SyncStatusResponse},
    error::AppError,
    services::sync_status_service,
    state::SharedState,
};

/// Routes exposing the storage backend state.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/sync/status", get(sync_status))
        .route("/sync/probe", post(probe_remote))
}

/// Report which backend is active and any pending degradation warning.
/// Reading the status consumes the warning.
#[utoipa::path(
    get,
    path = "/sync/status",
    tag = "sync",
    responses(
        (status = 200, description = "Current backend status", body = SyncStatusResponse)
    )
)]
pub async fn sync_status(
    State(state): State<SharedState>,
) -> Result<Json<SyncStatusResponse>, AppError> {
    let status = sync_status_service::sync_status(&state).await?;
    Ok(Json(status))
}

/// Re-test the remote backend and clear the local pin on success.
#[utoipa::path(
    post,
    path = "/sync/probe",
    tag = "sync",
    responses(
        (status = 200, description = "Probe outcome", body = ActionResponse),
        (status = 503, description = "Remote backend unreachable or unconfigured")
    )
)]
pub async fn probe_remote(
    State(state): State<SharedState>,
) -> Result<Json<ActionResponse>, AppError> {
    let reply = sync_status_service::probe_remote(&state).await?;
    Ok(Json(reply.into()))
}
