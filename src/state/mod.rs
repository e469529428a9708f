use std::sync::{Arc, Mutex};

use crate::services::{email_service::EmailSender, sync_service::SyncCoordinator};

/// Shared handle to the application state.
pub type SharedState = Arc<AppState>;

/// Central application state: the sync coordinator plus the email seam.
pub struct AppState {
    coordinator: SyncCoordinator,
    mailer: Option<Arc<dyn EmailSender>>,
    last_email_signature: Mutex<Option<String>>,
}

impl AppState {
    /// Construct the state wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(coordinator: SyncCoordinator, mailer: Option<Arc<dyn EmailSender>>) -> SharedState {
        Arc::new(Self {
            coordinator,
            mailer,
            last_email_signature: Mutex::new(None),
        })
    }

    /// Backend routing and session flags.
    pub fn coordinator(&self) -> &SyncCoordinator {
        &self.coordinator
    }

    /// The installed email transport, if any.
    pub fn mailer(&self) -> Option<Arc<dyn EmailSender>> {
        self.mailer.clone()
    }

    /// Whether a result email with this signature already went out.
    pub fn email_already_sent(&self, signature: &str) -> bool {
        self.last_email_signature
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_deref()
            == Some(signature)
    }

    /// Remember the signature of the most recent successful email.
    pub fn mark_email_sent(&self, signature: String) {
        *self
            .last_email_signature
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(signature);
    }
}
