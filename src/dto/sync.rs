use serde::Serialize;
use utoipa::ToSchema;

/// Sync diagnostics mirrored from the session flags.
#[derive(Debug, Serialize, ToSchema)]
pub struct SyncStatusResponse {
    /// Backend that served the most recent call ("local" or "remote").
    pub backend: String,
    /// Whether a remote backend is configured at all.
    pub remote_configured: bool,
    /// Sticky flag pinning the session to the local store.
    pub force_local: bool,
    /// Whether the atomic remote spin procedure is still enabled.
    pub spin_procedure_enabled: bool,
    /// Whether the atomic remote completion procedure is still enabled.
    pub submit_procedure_enabled: bool,
    /// Options with remaining uses.
    pub active_options: usize,
    /// All registered options.
    pub total_options: usize,
    /// Last-issued spin identifier.
    pub spin_id: u64,
    /// Pending user-facing warning, consumed by this read.
    pub warning: Option<String>,
}
