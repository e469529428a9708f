use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use validator::Validate;

use crate::{
    dto::{common::ActionResponse, email::SendResultEmailRequest},
    error::AppError,
    services::email_service,
    state::SharedState,
};

/// Routes for mailing spin results.
pub fn router() -> Router<SharedState> {
    Router::new().route("/spins/{spin_id}/email", post(send_result_email))
}

/// Email a spin's assigned task to a recipient. Repeated requests for the
/// same spin and recipient are acknowledged without re-sending.
#[utoipa::path(
    post,
    path = "/spins/{spin_id}/email",
    tag = "email",
    params(
        ("spin_id" = u64, Path, description = "Spin whose result to send")
    ),
    request_body = SendResultEmailRequest,
    responses(
        (status = 200, description = "Send outcome", body = ActionResponse),
        (status = 503, description = "No email transport configured")
    )
)]
pub async fn send_result_email(
    State(state): State<SharedState>,
    Path(spin_id): Path<u64>,
    Json(payload): Json<SendResultEmailRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    payload.validate()?;
    let reply = email_service::send_result_email(&state, spin_id, &payload.recipient).await?;
    Ok(Json(reply.into()))
}
