//! Backend routing between the remote table and the local file.
//!
//! The coordinator is the single decision point for which store answers a
//! call. All session flags live in an explicit [`SyncSession`] owned by the
//! coordinator, so independent sessions (and tests) never share state.

use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, MutexGuard};
use tracing::warn;

use crate::{
    dao::{
        models::WheelState,
        wheel_store::{local::LocalWheelStore, rest::RestWheelStore},
    },
    error::ServiceError,
};

/// Which store answered the most recent call. Informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncBackend {
    /// The locked local file.
    Local,
    /// The remote state table.
    Remote,
}

impl SyncBackend {
    /// Stable label used in diagnostics and responses.
    pub fn label(self) -> &'static str {
        match self {
            SyncBackend::Local => "local",
            SyncBackend::Remote => "remote",
        }
    }
}

/// Session-scoped sync flags: active backend, sticky fallback, capability
/// downgrades, and the pending user-facing warning (consumed on read).
#[derive(Debug)]
pub struct SyncSession {
    backend: StdMutex<SyncBackend>,
    force_local: AtomicBool,
    spin_procedure_enabled: AtomicBool,
    submit_procedure_enabled: AtomicBool,
    warning: StdMutex<Option<String>>,
}

impl Default for SyncSession {
    fn default() -> Self {
        Self {
            backend: StdMutex::new(SyncBackend::Local),
            force_local: AtomicBool::new(false),
            spin_procedure_enabled: AtomicBool::new(true),
            submit_procedure_enabled: AtomicBool::new(true),
            warning: StdMutex::new(None),
        }
    }
}

impl SyncSession {
    /// Backend that answered the most recent call.
    pub fn backend(&self) -> SyncBackend {
        *self.backend.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn set_backend(&self, backend: SyncBackend) {
        *self
            .backend
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = backend;
    }

    /// Sticky flag pinning the session to the local store after a remote
    /// failure; cleared by the next successful remote call.
    pub fn force_local(&self) -> bool {
        self.force_local.load(Ordering::Relaxed)
    }

    pub(crate) fn set_force_local(&self, value: bool) {
        self.force_local.store(value, Ordering::Relaxed);
    }

    /// Whether the atomic remote spin procedure is still considered present.
    pub fn spin_procedure_enabled(&self) -> bool {
        self.spin_procedure_enabled.load(Ordering::Relaxed)
    }

    /// Permanently (for this session) stop calling the spin procedure.
    pub fn disable_spin_procedure(&self) {
        self.spin_procedure_enabled.store(false, Ordering::Relaxed);
    }

    /// Whether the atomic remote completion procedure is still considered present.
    pub fn submit_procedure_enabled(&self) -> bool {
        self.submit_procedure_enabled.load(Ordering::Relaxed)
    }

    /// Permanently (for this session) stop calling the completion procedure.
    pub fn disable_submit_procedure(&self) {
        self.submit_procedure_enabled.store(false, Ordering::Relaxed);
    }

    /// Record a user-facing diagnostic, also logged.
    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        warn!(%message, "sync warning");
        *self
            .warning
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(message);
    }

    /// Take the pending warning, clearing it.
    pub fn take_warning(&self) -> Option<String> {
        self.warning
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

/// Single decision point for "which backend answers this call", plus the
/// process-wide gate serializing every read-modify-write cycle.
pub struct SyncCoordinator {
    local: LocalWheelStore,
    remote: Option<RestWheelStore>,
    session: SyncSession,
    op_gate: Mutex<()>,
}

impl SyncCoordinator {
    /// Build a coordinator over the local store and an optional remote store.
    pub fn new(local: LocalWheelStore, remote: Option<RestWheelStore>) -> Self {
        Self {
            local,
            remote,
            session: SyncSession::default(),
            op_gate: Mutex::new(()),
        }
    }

    /// Session flags owned by this coordinator.
    pub fn session(&self) -> &SyncSession {
        &self.session
    }

    /// The remote store when configured, regardless of the sticky flag.
    pub fn remote(&self) -> Option<&RestWheelStore> {
        self.remote.as_ref()
    }

    /// The remote store when configured and not pinned local.
    pub fn remote_if_active(&self) -> Option<&RestWheelStore> {
        if self.session.force_local() {
            return None;
        }
        self.remote.as_ref()
    }

    /// Serialize a read-modify-write cycle against concurrent mutations in
    /// this process. Held across load, mutation, and save.
    pub async fn lock_operations(&self) -> MutexGuard<'_, ()> {
        self.op_gate.lock().await
    }

    /// Load the canonical document from the active backend.
    ///
    /// Remote failure never raises here: it records a warning, pins the
    /// session local, and serves the local snapshot instead.
    pub async fn load(&self) -> Result<WheelState, ServiceError> {
        let Some(remote) = self.remote_if_active() else {
            self.session.set_backend(SyncBackend::Local);
            return Ok(self.local.load().await?);
        };

        match remote.load().await {
            Ok(state) => {
                self.session.set_backend(SyncBackend::Remote);
                self.session.set_force_local(false);
                Ok(state)
            }
            Err(err) => {
                self.session.set_backend(SyncBackend::Local);
                self.session.set_force_local(true);
                self.session.warn(format!(
                    "Cloud read unavailable ({err}). Showing local snapshot for now."
                ));
                Ok(self.local.load().await?)
            }
        }
    }

    /// Persist the canonical document through the active backend.
    ///
    /// A remote save failure raises: writing the local file instead would
    /// diverge the canonical record from what the cloud believes.
    pub async fn save(&self, state: WheelState) -> Result<(), ServiceError> {
        let Some(remote) = self.remote_if_active() else {
            self.session.set_backend(SyncBackend::Local);
            return Ok(self.local.save(state).await?);
        };

        match remote.save(state).await {
            Ok(()) => {
                self.session.set_backend(SyncBackend::Remote);
                self.session.set_force_local(false);
                Ok(())
            }
            Err(err) => {
                self.session.warn(format!(
                    "Cloud save failed ({err}). The change was not saved to the cloud."
                ));
                self.session.set_force_local(true);
                Err(ServiceError::RemoteSaveFailed(err))
            }
        }
    }

    /// Attempt a remote load regardless of the sticky flag; success clears
    /// it. This is the recovery path for a session pinned local.
    pub async fn probe_remote(&self) -> Result<WheelState, ServiceError> {
        let Some(remote) = self.remote.as_ref() else {
            return Err(ServiceError::RemoteUnconfigured);
        };

        let state = remote.load().await.map_err(ServiceError::Unavailable)?;
        self.session.set_force_local(false);
        self.session.set_backend(SyncBackend::Remote);
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::WheelOption;
    use crate::dao::wheel_store::rest::RestConfig;
    use tempfile::TempDir;

    fn local_only(dir: &TempDir) -> SyncCoordinator {
        let store = LocalWheelStore::new(dir.path().join("shared_state.json"));
        SyncCoordinator::new(store, None)
    }

    // Nothing listens on port 1, so every remote call fails to connect.
    fn unreachable_remote() -> RestWheelStore {
        RestWheelStore::connect(RestConfig::new("http://127.0.0.1:1", "test-key"))
            .expect("client")
    }

    #[tokio::test]
    async fn remote_load_failure_serves_local_snapshot_and_pins_local() {
        let dir = TempDir::new().expect("tempdir");
        let local = LocalWheelStore::new(dir.path().join("shared_state.json"));

        let mut seeded = WheelState::new_default();
        seeded.options.push(WheelOption {
            name: "Pizza".into(),
            description: String::new(),
            limit: 2,
            remaining: 2,
        });
        local.save(seeded).await.expect("seed");

        let coordinator = SyncCoordinator::new(local, Some(unreachable_remote()));

        let state = coordinator.load().await.expect("load");
        assert_eq!(state.options.len(), 1);
        assert_eq!(state.options[0].name, "Pizza");

        assert!(coordinator.session().force_local());
        assert_eq!(coordinator.session().backend(), SyncBackend::Local);
        let warning = coordinator.session().take_warning().expect("warning");
        assert!(warning.contains("Cloud read unavailable"));

        // The pinned session stops offering the remote store.
        assert!(coordinator.remote_if_active().is_none());
    }

    #[tokio::test]
    async fn remote_save_failure_raises_and_pins_local() {
        let dir = TempDir::new().expect("tempdir");
        let local = LocalWheelStore::new(dir.path().join("shared_state.json"));
        local.save(WheelState::new_default()).await.expect("seed");

        let coordinator = SyncCoordinator::new(local, Some(unreachable_remote()));

        let mut state = WheelState::new_default();
        state.spin_id = 9;
        let result = coordinator.save(state).await;
        assert!(matches!(result, Err(ServiceError::RemoteSaveFailed(_))));

        assert!(coordinator.session().force_local());
        let warning = coordinator.session().take_warning().expect("warning");
        assert!(warning.contains("Cloud save failed"));

        // The rejected change was not written to the local file either.
        let local_state = coordinator.load().await.expect("load");
        assert_eq!(local_state.spin_id, 0);
    }

    #[tokio::test]
    async fn local_only_routing_records_local_backend() {
        let dir = TempDir::new().expect("tempdir");
        let coordinator = local_only(&dir);

        let state = coordinator.load().await.expect("load");
        assert_eq!(coordinator.session().backend(), SyncBackend::Local);
        coordinator.save(state).await.expect("save");
        assert_eq!(coordinator.session().backend(), SyncBackend::Local);
    }

    #[tokio::test]
    async fn probe_without_remote_config_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let coordinator = local_only(&dir);

        let result = coordinator.probe_remote().await;
        assert!(matches!(result, Err(ServiceError::RemoteUnconfigured)));
    }

    #[test]
    fn warning_is_consumed_on_read() {
        let session = SyncSession::default();
        session.warn("cloud hiccup");
        assert_eq!(session.take_warning().as_deref(), Some("cloud hiccup"));
        assert_eq!(session.take_warning(), None);
    }

    #[test]
    fn sessions_do_not_share_flags() {
        let first = SyncSession::default();
        let second = SyncSession::default();

        first.set_force_local(true);
        first.disable_spin_procedure();

        assert!(first.force_local());
        assert!(!first.spin_procedure_enabled());
        assert!(!second.force_local());
        assert!(second.spin_procedure_enabled());
    }

    #[test]
    fn pinned_session_hides_the_remote_store() {
        let dir = TempDir::new().expect("tempdir");
        let coordinator = local_only(&dir);

        // No remote configured at all.
        assert!(coordinator.remote_if_active().is_none());
        coordinator.session().set_force_local(true);
        assert!(coordinator.remote_if_active().is_none());
    }
}
