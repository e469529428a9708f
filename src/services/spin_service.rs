//! Spin engine: atomic remote procedure first, local read-modify-write
//! fallback under the coordinator's operation gate.

use rand::seq::IndexedRandom;

use crate::{
    dao::models::{SpinAssignment, SpinOutcome, current_time_ms},
    error::ServiceError,
    services::sync_service::{SyncBackend, SyncCoordinator},
};

/// Run one spin. Exactly one option's remaining count decreases and one
/// assignment is appended, or nothing changes and `None` is returned when
/// the pool is empty.
pub async fn spin_once(
    coordinator: &SyncCoordinator,
) -> Result<Option<SpinOutcome>, ServiceError> {
    if let Some(remote) = coordinator.remote_if_active()
        && coordinator.session().spin_procedure_enabled()
    {
        match remote.spin_once().await {
            Ok(outcome) => {
                coordinator.session().set_backend(SyncBackend::Remote);
                coordinator.session().set_force_local(false);
                if let Some(ref spun) = outcome {
                    // The procedure owns the decrement and the spin id; the
                    // assignment log entry is written best-effort from here.
                    record_assignment(coordinator, spun.spin_id, &spun.winner_name).await;
                }
                return Ok(outcome);
            }
            Err(err) if err.is_capability_missing() => {
                coordinator.session().disable_spin_procedure();
                coordinator.session().warn(
                    "Atomic cloud spin procedure not installed. Using standard cloud mode.",
                );
            }
            Err(err) => {
                coordinator.session().warn(format!(
                    "Cloud spin procedure unavailable ({err}). Using standard cloud mode."
                ));
            }
        }
    }

    spin_read_modify_write(coordinator).await
}

async fn spin_read_modify_write(
    coordinator: &SyncCoordinator,
) -> Result<Option<SpinOutcome>, ServiceError> {
    let _gate = coordinator.lock_operations().await;

    let mut state = coordinator.load().await?;
    let pool = state.pool_indices();
    let Some(&winner_index) = pool.as_slice().choose(&mut rand::rng()) else {
        return Ok(None);
    };

    // Labels are captured before the decrement so the rendered wheel shows
    // every contestant, winner included.
    let labels_for_spin: Vec<String> = pool
        .iter()
        .map(|&index| state.options[index].name.clone())
        .collect();

    let winner_name = state.options[winner_index].name.clone();
    let winner_description = state.options[winner_index].description.clone();

    state.options[winner_index].remaining -= 1;
    state.spin_id += 1;

    let assignment = SpinAssignment {
        spin_id: state.spin_id,
        option_name: winner_name.clone(),
        assigned_at_ms: current_time_ms(),
        team_name: String::new(),
        completed_at_ms: None,
        submission_seq: None,
    };
    if !state.has_assignment(assignment.spin_id) {
        state.assignments.push(assignment);
    }

    let spin_id = state.spin_id;
    coordinator.save(state).await?;

    Ok(Some(SpinOutcome {
        winner_name,
        winner_description,
        labels_for_spin,
        spin_id,
    }))
}

/// Idempotently append an assignment entry for an already-final spin.
///
/// The spin result is final by the time this runs, so failures surface as
/// warnings instead of failing the spin.
pub(crate) async fn record_assignment(
    coordinator: &SyncCoordinator,
    spin_id: u64,
    option_name: &str,
) {
    let _gate = coordinator.lock_operations().await;

    let mut state = match coordinator.load().await {
        Ok(state) => state,
        Err(err) => {
            coordinator
                .session()
                .warn(format!("Spin recorded, but assignment log failed ({err})."));
            return;
        }
    };

    if state.has_assignment(spin_id) {
        return;
    }

    state.assignments.push(SpinAssignment {
        spin_id,
        option_name: option_name.to_string(),
        assigned_at_ms: current_time_ms(),
        team_name: String::new(),
        completed_at_ms: None,
        submission_seq: None,
    });

    if let Err(err) = coordinator.save(state).await {
        coordinator
            .session()
            .warn(format!("Assignment log save failed ({err})."));
    }
}
