use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Canonical shared document synchronized across all viewers.
///
/// Every write is a whole-document replace derived from a full prior read;
/// no field-level updates exist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WheelState {
    /// Registered options, insertion order is the display/pool order.
    pub options: Vec<WheelOption>,
    /// Spin outcomes and their task lifecycle, in creation order.
    pub assignments: Vec<SpinAssignment>,
    /// Next submission sequence number, global across all assignments.
    pub next_submission_seq: u64,
    /// Last-issued spin identifier; the next spin uses `spin_id + 1`.
    pub spin_id: u64,
    /// Timestamp of the last write (epoch milliseconds), informational only.
    pub updated_at_ms: i64,
}

/// A named, limited-use entry eligible to be chosen by a spin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WheelOption {
    /// Case-insensitively unique display name.
    pub name: String,
    /// Optional free-text description.
    pub description: String,
    /// Total allowed selections.
    pub limit: u32,
    /// Selections still available, always within `0..=limit`.
    pub remaining: u32,
}

/// One spin outcome and its lifecycle as a task assignment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpinAssignment {
    /// Unique key within `assignments`.
    pub spin_id: u64,
    /// Winning option name at spin time; survives option deletion.
    pub option_name: String,
    /// Spin time in epoch milliseconds.
    pub assigned_at_ms: i64,
    /// Submitting team, empty until a completion is recorded.
    pub team_name: String,
    /// Completion time; presence signals "completed", set at most once.
    pub completed_at_ms: Option<i64>,
    /// Sequence number assigned on the first successful completion.
    pub submission_seq: Option<u64>,
}

/// Result of one successful spin, as shown to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpinOutcome {
    /// Name of the winning option.
    pub winner_name: String,
    /// Description of the winning option.
    pub winner_description: String,
    /// Pool labels as they were before the decrement, winner included.
    pub labels_for_spin: Vec<String>,
    /// Identifier issued to this spin.
    pub spin_id: u64,
}

/// Structured `(ok, message)` outcome of a business operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReply {
    /// Whether the operation was accepted.
    pub ok: bool,
    /// Human-readable outcome message.
    pub message: String,
}

impl ActionReply {
    /// Successful reply carrying `message`.
    pub fn accepted(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    /// Business-rule rejection carrying `message`.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

impl WheelState {
    /// Fresh default document: no options, no assignments, counters at rest.
    pub fn new_default() -> Self {
        Self {
            options: Vec::new(),
            assignments: Vec::new(),
            next_submission_seq: 1,
            spin_id: 0,
            updated_at_ms: current_time_ms(),
        }
    }

    /// Indices of options that still have remaining uses.
    pub fn pool_indices(&self) -> Vec<usize> {
        self.options
            .iter()
            .enumerate()
            .filter(|(_, option)| option.remaining > 0)
            .map(|(index, _)| index)
            .collect()
    }

    /// Whether an assignment with `spin_id` already exists.
    pub fn has_assignment(&self, spin_id: u64) -> bool {
        self.assignments
            .iter()
            .any(|assignment| assignment.spin_id == spin_id)
    }

    /// Position of the assignment with `spin_id`, if present.
    pub fn assignment_position(&self, spin_id: u64) -> Option<usize> {
        self.assignments
            .iter()
            .position(|assignment| assignment.spin_id == spin_id)
    }

    /// Whether an option with the same trimmed, case-folded name exists.
    pub fn has_option_named(&self, name: &str) -> bool {
        let wanted = name.trim().to_lowercase();
        self.options
            .iter()
            .any(|option| option.name.trim().to_lowercase() == wanted)
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn current_time_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(name: &str, remaining: u32) -> WheelOption {
        WheelOption {
            name: name.into(),
            description: String::new(),
            limit: 3,
            remaining,
        }
    }

    #[test]
    fn pool_excludes_depleted_options() {
        let mut state = WheelState::new_default();
        state.options = vec![option("a", 2), option("b", 0), option("c", 1)];
        assert_eq!(state.pool_indices(), vec![0, 2]);
    }

    #[test]
    fn option_name_lookup_is_case_insensitive_and_trimmed() {
        let mut state = WheelState::new_default();
        state.options = vec![option("  Pizza ", 1)];
        assert!(state.has_option_named("pizza"));
        assert!(state.has_option_named(" PIZZA"));
        assert!(!state.has_option_named("pasta"));
    }
}
