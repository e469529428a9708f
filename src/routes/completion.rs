use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::{
        common::ActionResponse,
        completion::{AssignmentSummary, LeaderboardRow, SubmitCompletionRequest},
    },
    error::AppError,
    services::{completion_service, option_service},
    state::SharedState,
};

/// Routes handling task completions and the leaderboard.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/assignments/pending", get(pending_assignments))
        .route("/completions", post(submit_completion))
        .route("/leaderboard", get(leaderboard))
}

/// List assignments still awaiting a completion, sorted by spin id.
#[utoipa::path(
    get,
    path = "/assignments/pending",
    tag = "completion",
    responses(
        (status = 200, description = "Pending task assignments", body = [AssignmentSummary])
    )
)]
pub async fn pending_assignments(
    State(state): State<SharedState>,
) -> Result<Json<Vec<AssignmentSummary>>, AppError> {
    let document = state.coordinator().load().await?;
    let mut pending: Vec<AssignmentSummary> = document
        .assignments
        .iter()
        .filter(|assignment| assignment.completed_at_ms.is_none())
        .map(AssignmentSummary::from)
        .collect();
    pending.sort_by_key(|assignment| assignment.spin_id);
    Ok(Json(pending))
}

/// Record a team's completion for a pending assignment.
#[utoipa::path(
    post,
    path = "/completions",
    tag = "completion",
    request_body = SubmitCompletionRequest,
    responses(
        (status = 200, description = "Submission outcome", body = ActionResponse)
    )
)]
pub async fn submit_completion(
    State(state): State<SharedState>,
    Json(payload): Json<SubmitCompletionRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    payload.validate()?;
    let reply = completion_service::submit_completion(
        state.coordinator(),
        payload.spin_id,
        &payload.team_name,
    )
    .await?;
    Ok(Json(reply.into()))
}

/// Rank completed assignments by duration, fastest first.
#[utoipa::path(
    get,
    path = "/leaderboard",
    tag = "completion",
    responses(
        (status = 200, description = "Completion leaderboard", body = [LeaderboardRow])
    )
)]
pub async fn leaderboard(
    State(state): State<SharedState>,
) -> Result<Json<Vec<LeaderboardRow>>, AppError> {
    let document = state.coordinator().load().await?;
    Ok(Json(option_service::leaderboard(&document)))
}
