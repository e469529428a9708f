//! Option registration, reset, and read projections (snapshot, leaderboard).

use crate::{
    dao::models::{ActionReply, WheelOption, WheelState},
    dto::{
        completion::LeaderboardRow,
        format_epoch_ms,
        wheel::WheelSnapshotResponse,
    },
    error::ServiceError,
    services::sync_service::SyncCoordinator,
};

/// Register a new option with a usage limit.
///
/// Empty and case-insensitively duplicate names are rejected with
/// `ok = false`; infrastructure failures raise.
pub async fn add_option(
    coordinator: &SyncCoordinator,
    name: &str,
    description: &str,
    limit: u32,
) -> Result<ActionReply, ServiceError> {
    let clean_name = name.trim();
    if clean_name.is_empty() {
        return Ok(ActionReply::rejected("Option name is required."));
    }
    if limit < 1 {
        return Ok(ActionReply::rejected("Usage limit must be at least 1."));
    }

    let _gate = coordinator.lock_operations().await;

    let mut state = coordinator.load().await?;
    if state.has_option_named(clean_name) {
        return Ok(ActionReply::rejected(format!(
            "'{clean_name}' already exists!"
        )));
    }

    state.options.push(WheelOption {
        name: clean_name.to_string(),
        description: description.to_string(),
        limit,
        remaining: limit,
    });

    coordinator.save(state).await?;
    Ok(ActionReply::accepted(format!("Added '{clean_name}'")))
}

/// Recreate the default document, discarding options, assignments, and
/// counters.
pub async fn reset(coordinator: &SyncCoordinator) -> Result<(), ServiceError> {
    let _gate = coordinator.lock_operations().await;
    coordinator.save(WheelState::new_default()).await
}

/// Load the current document and project it for polling viewers.
pub async fn snapshot(
    coordinator: &SyncCoordinator,
) -> Result<WheelSnapshotResponse, ServiceError> {
    let state = coordinator.load().await?;
    Ok(WheelSnapshotResponse::from_state(
        &state,
        coordinator.session().backend().label(),
    ))
}

/// Rank completed assignments by duration ascending, breaking ties by
/// completion time, then submission sequence.
pub fn leaderboard(state: &WheelState) -> Vec<LeaderboardRow> {
    let mut completed: Vec<(i64, i64, u64, &crate::dao::models::SpinAssignment)> = state
        .assignments
        .iter()
        .filter_map(|assignment| {
            let completed_at_ms = assignment.completed_at_ms?;
            let duration_ms = (completed_at_ms - assignment.assigned_at_ms).max(0);
            Some((
                duration_ms,
                completed_at_ms,
                assignment.submission_seq.unwrap_or(0),
                assignment,
            ))
        })
        .collect();

    completed.sort_by_key(|(duration, completed_at, seq, _)| (*duration, *completed_at, *seq));

    completed
        .into_iter()
        .enumerate()
        .map(|(index, (duration_ms, completed_at_ms, _, assignment))| LeaderboardRow {
            rank: index + 1,
            team_name: assignment.team_name.clone(),
            option_name: assignment.option_name.clone(),
            spin_id: assignment.spin_id,
            assigned_at: format_epoch_ms(assignment.assigned_at_ms),
            completed_at: format_epoch_ms(completed_at_ms),
            duration_ms,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::SpinAssignment;
    use crate::dao::wheel_store::local::LocalWheelStore;
    use crate::services::spin_service;
    use tempfile::TempDir;

    fn coordinator_in(dir: &TempDir) -> SyncCoordinator {
        let store = LocalWheelStore::new(dir.path().join("shared_state.json"));
        SyncCoordinator::new(store, None)
    }

    #[tokio::test]
    async fn duplicate_names_are_rejected_case_insensitively() {
        let dir = TempDir::new().expect("tempdir");
        let coordinator = coordinator_in(&dir);

        let first = add_option(&coordinator, "Pizza", "", 2).await.expect("add");
        assert!(first.ok);

        for duplicate in ["pizza", " PIZZA ", "Pizza"] {
            let reply = add_option(&coordinator, duplicate, "", 1)
                .await
                .expect("add");
            assert!(!reply.ok, "`{duplicate}` should be rejected");
        }

        let state = coordinator.load().await.expect("load");
        assert_eq!(state.options.len(), 1);
    }

    #[tokio::test]
    async fn blank_names_and_zero_limits_are_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let coordinator = coordinator_in(&dir);

        assert!(!add_option(&coordinator, "   ", "", 1).await.expect("add").ok);
        assert!(!add_option(&coordinator, "a", "", 0).await.expect("add").ok);

        let state = coordinator.load().await.expect("load");
        assert!(state.options.is_empty());
    }

    #[tokio::test]
    async fn added_options_start_with_full_remaining() {
        let dir = TempDir::new().expect("tempdir");
        let coordinator = coordinator_in(&dir);

        add_option(&coordinator, " Tacos ", "tuesday", 3)
            .await
            .expect("add");

        let state = coordinator.load().await.expect("load");
        let option = &state.options[0];
        assert_eq!(option.name, "Tacos");
        assert_eq!(option.description, "tuesday");
        assert_eq!(option.limit, 3);
        assert_eq!(option.remaining, 3);
    }

    #[tokio::test]
    async fn reset_recreates_the_default_document() {
        let dir = TempDir::new().expect("tempdir");
        let coordinator = coordinator_in(&dir);

        add_option(&coordinator, "a", "", 1).await.expect("add");
        spin_service::spin_once(&coordinator).await.expect("spin");

        reset(&coordinator).await.expect("reset");

        let state = coordinator.load().await.expect("load");
        assert!(state.options.is_empty());
        assert!(state.assignments.is_empty());
        assert_eq!(state.spin_id, 0);
        assert_eq!(state.next_submission_seq, 1);
    }

    fn completed(
        spin_id: u64,
        team: &str,
        assigned_at_ms: i64,
        completed_at_ms: i64,
        seq: u64,
    ) -> SpinAssignment {
        SpinAssignment {
            spin_id,
            option_name: "task".into(),
            assigned_at_ms,
            team_name: team.into(),
            completed_at_ms: Some(completed_at_ms),
            submission_seq: Some(seq),
        }
    }

    #[test]
    fn leaderboard_orders_by_duration_then_completion_then_sequence() {
        let mut state = WheelState::new_default();
        state.assignments = vec![
            completed(1, "slow", 0, 50, 1),
            // Two 10 ms runs: earlier completion time wins the tie.
            completed(2, "late-finish", 100, 110, 3),
            completed(3, "early-finish", 90, 100, 2),
            // Same duration and completion time: lower sequence wins.
            completed(4, "seq-five", 90, 100, 5),
        ];

        let rows = leaderboard(&state);
        let teams: Vec<&str> = rows.iter().map(|row| row.team_name.as_str()).collect();
        assert_eq!(teams, vec!["early-finish", "seq-five", "late-finish", "slow"]);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[3].rank, 4);
        assert_eq!(rows[3].duration_ms, 50);
    }

    #[test]
    fn leaderboard_ignores_pending_assignments() {
        let mut state = WheelState::new_default();
        state.assignments = vec![
            completed(1, "done", 0, 10, 1),
            SpinAssignment {
                spin_id: 2,
                option_name: "task".into(),
                assigned_at_ms: 0,
                team_name: String::new(),
                completed_at_ms: None,
                submission_seq: None,
            },
        ];

        assert_eq!(leaderboard(&state).len(), 1);
    }
}
