//! Result email construction and dedup.
//!
//! Delivery itself is consumed through the [`EmailSender`] seam; this crate
//! only builds the message, validates the recipient, and skips repeat sends
//! for the same spin and address.

use futures::future::BoxFuture;
use thiserror::Error;
use validator::ValidateEmail;

use crate::{
    dao::models::ActionReply,
    error::ServiceError,
    state::SharedState,
};

/// Failure reported by an email transport.
#[derive(Debug, Error)]
#[error("email delivery failed: {message}")]
pub struct EmailSendError {
    /// Transport-specific description.
    pub message: String,
}

/// Outbound email transport, injected by the embedding deployment.
pub trait EmailSender: Send + Sync {
    /// Deliver one message to `recipient`.
    fn send(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> BoxFuture<'static, Result<(), EmailSendError>>;
}

/// Build the subject/body pair for a spin result.
pub fn build_message(winner_name: &str, winner_description: &str) -> (String, String) {
    let subject = format!("Spin Result: {winner_name}");
    let body = format!(
        "You spun the wheel and got:\n\nOption: {winner_name}\nDescription: {winner_description}\n"
    );
    (subject, body)
}

/// Dedup signature for one spin result and recipient.
pub fn send_signature(spin_id: u64, recipient: &str) -> String {
    format!("{spin_id}|{}", recipient.to_lowercase())
}

/// Email the recorded result of spin `spin_id` to `recipient`.
///
/// Repeat requests for the same spin and address are acknowledged without a
/// second delivery. Email failures never affect spin state.
pub async fn send_result_email(
    state: &SharedState,
    spin_id: u64,
    recipient: &str,
) -> Result<ActionReply, ServiceError> {
    let recipient = recipient.trim();
    if !recipient.validate_email() {
        return Ok(ActionReply::rejected("Please enter a valid email address."));
    }

    let document = state.coordinator().load().await?;
    let Some(position) = document.assignment_position(spin_id) else {
        return Ok(ActionReply::rejected("Spin result not found."));
    };
    let option_name = document.assignments[position].option_name.clone();
    let description = document
        .options
        .iter()
        .find(|option| option.name == option_name)
        .map(|option| option.description.clone())
        .unwrap_or_default();

    let signature = send_signature(spin_id, recipient);
    if state.email_already_sent(&signature) {
        return Ok(ActionReply::accepted(
            "Email already sent for this spin result and address.",
        ));
    }

    let mailer = state.mailer().ok_or(ServiceError::EmailUnconfigured)?;
    let (subject, body) = build_message(&option_name, &description);
    mailer
        .send(recipient, &subject, &body)
        .await
        .map_err(ServiceError::EmailSend)?;

    state.mark_email_sent(signature);
    Ok(ActionReply::accepted(format!("Email sent to {recipient}!")))
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    };

    use super::*;
    use crate::dao::models::{SpinAssignment, WheelOption, WheelState};
    use crate::dao::wheel_store::local::LocalWheelStore;
    use crate::services::sync_service::SyncCoordinator;
    use crate::state::AppState;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingSender {
        sent: Arc<Mutex<Vec<(String, String, String)>>>,
        fail: AtomicBool,
    }

    impl EmailSender for RecordingSender {
        fn send(
            &self,
            recipient: &str,
            subject: &str,
            body: &str,
        ) -> BoxFuture<'static, Result<(), EmailSendError>> {
            let sent = self.sent.clone();
            let fail = self.fail.load(Ordering::Relaxed);
            let message = (recipient.to_string(), subject.to_string(), body.to_string());
            Box::pin(async move {
                if fail {
                    return Err(EmailSendError {
                        message: "transport refused".into(),
                    });
                }
                sent.lock().expect("lock").push(message);
                Ok(())
            })
        }
    }

    async fn app_with_sender(dir: &TempDir, sender: Arc<RecordingSender>) -> SharedState {
        let store = LocalWheelStore::new(dir.path().join("shared_state.json"));
        let coordinator = SyncCoordinator::new(store, None);

        let mut document = WheelState::new_default();
        document.options.push(WheelOption {
            name: "Pizza".into(),
            description: "friday lunch".into(),
            limit: 1,
            remaining: 0,
        });
        document.assignments.push(SpinAssignment {
            spin_id: 1,
            option_name: "Pizza".into(),
            assigned_at_ms: 0,
            team_name: String::new(),
            completed_at_ms: None,
            submission_seq: None,
        });
        coordinator.save(document).await.expect("seed");

        AppState::new(coordinator, Some(sender))
    }

    #[test]
    fn message_names_option_and_description() {
        let (subject, body) = build_message("Pizza", "friday lunch");
        assert_eq!(subject, "Spin Result: Pizza");
        assert!(body.contains("Option: Pizza"));
        assert!(body.contains("Description: friday lunch"));
    }

    #[test]
    fn signature_lowercases_the_recipient() {
        assert_eq!(send_signature(3, "Name@Example.COM"), "3|name@example.com");
        assert_ne!(send_signature(3, "a@b.co"), send_signature(4, "a@b.co"));
    }

    #[tokio::test]
    async fn repeat_sends_are_deduplicated() {
        let dir = TempDir::new().expect("tempdir");
        let sender = Arc::new(RecordingSender::default());
        let state = app_with_sender(&dir, sender.clone()).await;

        let first = send_result_email(&state, 1, "name@example.com")
            .await
            .expect("send");
        assert!(first.ok);

        let second = send_result_email(&state, 1, "NAME@example.com")
            .await
            .expect("send");
        assert!(second.ok);
        assert!(second.message.contains("already sent"));

        assert_eq!(sender.sent.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn invalid_addresses_and_unknown_spins_are_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let sender = Arc::new(RecordingSender::default());
        let state = app_with_sender(&dir, sender.clone()).await;

        let invalid = send_result_email(&state, 1, "not-an-address")
            .await
            .expect("send");
        assert!(!invalid.ok);

        let unknown = send_result_email(&state, 99, "name@example.com")
            .await
            .expect("send");
        assert!(!unknown.ok);

        assert!(sender.sent.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn transport_failure_does_not_mark_the_signature() {
        let dir = TempDir::new().expect("tempdir");
        let sender = Arc::new(RecordingSender::default());
        sender.fail.store(true, Ordering::Relaxed);
        let state = app_with_sender(&dir, sender.clone()).await;

        let result = send_result_email(&state, 1, "name@example.com").await;
        assert!(matches!(result, Err(ServiceError::EmailSend(_))));

        // A retry after the transport recovers still goes out.
        sender.fail.store(false, Ordering::Relaxed);
        let retry = send_result_email(&state, 1, "name@example.com")
            .await
            .expect("send");
        assert!(retry.ok);
        assert_eq!(sender.sent.lock().expect("lock").len(), 1);
    }
}
