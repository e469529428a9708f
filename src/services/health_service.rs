use crate::{dto::health::HealthResponse, state::SharedState};

/// Respond with the current health status.
///
/// The service is degraded when a remote backend is configured but the
/// session is pinned to the local store after a failure.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let coordinator = state.coordinator();
    let degraded = coordinator.remote().is_some() && coordinator.session().force_local();

    if degraded {
        HealthResponse::degraded()
    } else {
        HealthResponse::ok()
    }
}
