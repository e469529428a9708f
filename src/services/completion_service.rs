//! Completion engine: records a team's submission against a pending spin
//! assignment, first submission wins.

use crate::{
    dao::models::{ActionReply, current_time_ms},
    error::ServiceError,
    services::sync_service::{SyncBackend, SyncCoordinator},
};

/// Record a team's completion for the assignment with `spin_id`.
///
/// Business-rule rejections (unknown assignment, duplicate submission,
/// missing team name) come back as `ok = false` replies; only
/// infrastructure failures raise.
pub async fn submit_completion(
    coordinator: &SyncCoordinator,
    spin_id: u64,
    team_name: &str,
) -> Result<ActionReply, ServiceError> {
    let team_name = team_name.trim();
    if team_name.is_empty() {
        return Ok(ActionReply::rejected("Team name is required."));
    }

    if let Some(remote) = coordinator.remote_if_active()
        && coordinator.session().submit_procedure_enabled()
    {
        match remote.submit_completion_once(spin_id, team_name).await {
            Ok(reply) => {
                coordinator.session().set_backend(SyncBackend::Remote);
                coordinator.session().set_force_local(false);
                return Ok(reply);
            }
            Err(err) if err.is_capability_missing() => {
                coordinator.session().disable_submit_procedure();
                coordinator.session().warn(
                    "Atomic cloud submit procedure not installed. Using standard submit mode.",
                );
            }
            Err(err) => {
                coordinator.session().warn(format!(
                    "Cloud submit procedure unavailable ({err}). Using standard submit mode."
                ));
            }
        }
    }

    submit_read_modify_write(coordinator, spin_id, team_name).await
}

async fn submit_read_modify_write(
    coordinator: &SyncCoordinator,
    spin_id: u64,
    team_name: &str,
) -> Result<ActionReply, ServiceError> {
    let _gate = coordinator.lock_operations().await;

    let mut state = coordinator.load().await?;
    let Some(position) = state.assignment_position(spin_id) else {
        return Ok(ActionReply::rejected("Task assignment not found."));
    };

    if state.assignments[position].completed_at_ms.is_some() {
        return Ok(ActionReply::rejected("This task was already submitted."));
    }

    let submission_seq = state.next_submission_seq.max(1);
    let assignment = &mut state.assignments[position];
    assignment.team_name = team_name.to_string();
    assignment.completed_at_ms = Some(current_time_ms());
    assignment.submission_seq = Some(submission_seq);
    state.next_submission_seq = submission_seq + 1;

    coordinator.save(state).await?;
    Ok(ActionReply::accepted("Completion submitted successfully."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::{SpinAssignment, WheelState};
    use crate::dao::wheel_store::local::LocalWheelStore;
    use crate::dao::wheel_store::rest::{RestConfig, RestWheelStore};
    use tempfile::TempDir;

    // Minimal HTTP listener answering 404 to everything, like a gateway
    // without the optional procedures installed.
    async fn spawn_not_found_server() -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buffer = [0u8; 4096];
                    let _ = socket.read(&mut buffer).await;
                    let _ = socket
                        .write_all(
                            b"HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                        )
                        .await;
                });
            }
        });
        format!("http://{addr}")
    }

    fn coordinator_in(dir: &TempDir) -> SyncCoordinator {
        let store = LocalWheelStore::new(dir.path().join("shared_state.json"));
        SyncCoordinator::new(store, None)
    }

    fn pending_assignment(spin_id: u64) -> SpinAssignment {
        SpinAssignment {
            spin_id,
            option_name: "task".into(),
            assigned_at_ms: 1_000,
            team_name: String::new(),
            completed_at_ms: None,
            submission_seq: None,
        }
    }

    async fn seed(coordinator: &SyncCoordinator, assignments: Vec<SpinAssignment>) {
        let mut state = WheelState::new_default();
        state.assignments = assignments;
        coordinator.save(state).await.expect("seed");
    }

    #[tokio::test]
    async fn first_submission_wins_and_duplicates_are_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let coordinator = coordinator_in(&dir);
        seed(&coordinator, vec![pending_assignment(1)]).await;

        let first = submit_completion(&coordinator, 1, " red ")
            .await
            .expect("submit");
        assert!(first.ok);

        let second = submit_completion(&coordinator, 1, "blue")
            .await
            .expect("submit");
        assert!(!second.ok);
        assert_eq!(second.message, "This task was already submitted.");

        let state = coordinator.load().await.expect("load");
        let assignment = &state.assignments[0];
        // The first team's name sticks; the duplicate changed nothing.
        assert_eq!(assignment.team_name, "red");
        assert_eq!(assignment.submission_seq, Some(1));
        assert!(assignment.completed_at_ms.is_some());
        assert_eq!(state.next_submission_seq, 2);
    }

    #[tokio::test]
    async fn unknown_assignment_is_rejected_without_mutation() {
        let dir = TempDir::new().expect("tempdir");
        let coordinator = coordinator_in(&dir);
        seed(&coordinator, vec![pending_assignment(1)]).await;

        let reply = submit_completion(&coordinator, 99, "red")
            .await
            .expect("submit");
        assert!(!reply.ok);
        assert_eq!(reply.message, "Task assignment not found.");

        let state = coordinator.load().await.expect("load");
        assert_eq!(state.next_submission_seq, 1);
        assert!(state.assignments[0].completed_at_ms.is_none());
    }

    #[tokio::test]
    async fn empty_team_name_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let coordinator = coordinator_in(&dir);
        seed(&coordinator, vec![pending_assignment(1)]).await;

        let reply = submit_completion(&coordinator, 1, "   ")
            .await
            .expect("submit");
        assert!(!reply.ok);
    }

    #[tokio::test]
    async fn missing_remote_procedure_disables_it_and_submits_locally() {
        let dir = TempDir::new().expect("tempdir");
        let store = LocalWheelStore::new(dir.path().join("shared_state.json"));
        let mut state = WheelState::new_default();
        state.assignments = vec![pending_assignment(1)];
        store.save(state).await.expect("seed");

        let config = RestConfig::new(spawn_not_found_server().await, "test-key");
        let remote = RestWheelStore::connect(config).expect("client");
        let coordinator = SyncCoordinator::new(store, Some(remote));

        let reply = submit_completion(&coordinator, 1, "red")
            .await
            .expect("submit");
        assert!(reply.ok);

        assert!(!coordinator.session().submit_procedure_enabled());
        assert!(coordinator.session().force_local());
        assert!(coordinator.session().take_warning().is_some());

        let state = coordinator.load().await.expect("load");
        assert_eq!(state.assignments[0].team_name, "red");
        assert_eq!(state.assignments[0].submission_seq, Some(1));
    }

    #[tokio::test]
    async fn submission_sequence_is_monotonic_across_assignments() {
        let dir = TempDir::new().expect("tempdir");
        let coordinator = coordinator_in(&dir);
        seed(
            &coordinator,
            vec![
                pending_assignment(1),
                pending_assignment(2),
                pending_assignment(3),
            ],
        )
        .await;

        for (spin_id, team) in [(2, "red"), (1, "blue"), (3, "green")] {
            let reply = submit_completion(&coordinator, spin_id, team)
                .await
                .expect("submit");
            assert!(reply.ok);
        }

        let state = coordinator.load().await.expect("load");
        let mut seqs: Vec<u64> = state
            .assignments
            .iter()
            .filter_map(|a| a.submission_seq)
            .collect();
        seqs.sort_unstable();
        assert_eq!(seqs, vec![1, 2, 3]);
        assert_eq!(state.next_submission_seq, 4);
    }
}
