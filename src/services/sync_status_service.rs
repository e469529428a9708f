//! Sync diagnostics projections for the status and probe endpoints.

use crate::{
    dao::models::ActionReply,
    dto::sync::SyncStatusResponse,
    error::ServiceError,
    state::SharedState,
};

/// Report the session flags plus a few document counters.
///
/// Reading the status consumes the pending warning, matching the one-time
/// warning banner behavior.
pub async fn sync_status(state: &SharedState) -> Result<SyncStatusResponse, ServiceError> {
    let coordinator = state.coordinator();
    let document = coordinator.load().await?;
    let session = coordinator.session();

    let active_options = document.pool_indices().len();

    Ok(SyncStatusResponse {
        backend: session.backend().label().to_string(),
        remote_configured: coordinator.remote().is_some(),
        force_local: session.force_local(),
        spin_procedure_enabled: session.spin_procedure_enabled(),
        submit_procedure_enabled: session.submit_procedure_enabled(),
        active_options,
        total_options: document.options.len(),
        spin_id: document.spin_id,
        warning: session.take_warning(),
    })
}

/// Test the remote connection, clearing the sticky local pin on success.
pub async fn probe_remote(state: &SharedState) -> Result<ActionReply, ServiceError> {
    state.coordinator().probe_remote().await?;
    Ok(ActionReply::accepted("Cloud connection OK"))
}
