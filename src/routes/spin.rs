use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::spin::SpinResponse,
    error::AppError,
    services::spin_service,
    state::SharedState,
};

/// Routes executing spins.
pub fn router() -> Router<SharedState> {
    Router::new().route("/spin", post(spin))
}

/// Spin the wheel once; `winner` is null when no option is available.
#[utoipa::path(
    post,
    path = "/spin",
    tag = "spin",
    responses(
        (status = 200, description = "Spin outcome", body = SpinResponse)
    )
)]
pub async fn spin(State(state): State<SharedState>) -> Result<Json<SpinResponse>, AppError> {
    let outcome = spin_service::spin_once(state.coordinator()).await?;
    Ok(Json(SpinResponse {
        winner: outcome.map(Into::into),
    }))
}
