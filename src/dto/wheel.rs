use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{WheelOption, WheelState},
    dto::{completion::AssignmentSummary, format_epoch_ms},
};

/// Payload registering a new option on the wheel.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AddOptionRequest {
    /// Display name, must be unique case-insensitively.
    #[validate(length(min = 1, message = "Option name is required."))]
    pub name: String,
    /// Optional free-text description.
    #[serde(default)]
    pub description: String,
    /// How many times the option may be selected.
    #[validate(range(min = 1, message = "Usage limit must be at least 1."))]
    pub limit: u32,
}

/// Public projection of one registered option.
#[derive(Debug, Serialize, ToSchema)]
pub struct OptionSummary {
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Total allowed selections.
    pub limit: u32,
    /// Selections still available.
    pub remaining: u32,
    /// Whether the option has been used up.
    pub depleted: bool,
}

impl From<&WheelOption> for OptionSummary {
    fn from(option: &WheelOption) -> Self {
        Self {
            name: option.name.clone(),
            description: option.description.clone(),
            limit: option.limit,
            remaining: option.remaining,
            depleted: option.remaining == 0,
        }
    }
}

/// Full wheel snapshot polled by viewers.
#[derive(Debug, Serialize, ToSchema)]
pub struct WheelSnapshotResponse {
    /// Every registered option, active and depleted.
    pub options: Vec<OptionSummary>,
    /// Names of options still in the pool, in display order.
    pub active_labels: Vec<String>,
    /// Whether a spin can currently produce a winner.
    pub can_spin: bool,
    /// Last-issued spin identifier.
    pub spin_id: u64,
    /// Assignments awaiting a completion, sorted by spin id.
    pub pending_assignments: Vec<AssignmentSummary>,
    /// Number of completed assignments.
    pub completed_count: usize,
    /// Which backend served this snapshot ("local" or "remote").
    pub backend: String,
    /// Last write time of the document.
    pub updated_at: String,
}

impl WheelSnapshotResponse {
    /// Build the snapshot projection from the canonical document.
    pub fn from_state(state: &WheelState, backend: &'static str) -> Self {
        let pool = state.pool_indices();
        let active_labels: Vec<String> = pool
            .iter()
            .map(|&index| state.options[index].name.clone())
            .collect();

        let mut pending_assignments: Vec<AssignmentSummary> = state
            .assignments
            .iter()
            .filter(|assignment| assignment.completed_at_ms.is_none())
            .map(AssignmentSummary::from)
            .collect();
        pending_assignments.sort_by_key(|assignment| assignment.spin_id);

        let completed_count = state
            .assignments
            .iter()
            .filter(|assignment| assignment.completed_at_ms.is_some())
            .count();

        Self {
            options: state.options.iter().map(OptionSummary::from).collect(),
            can_spin: !active_labels.is_empty(),
            active_labels,
            spin_id: state.spin_id,
            pending_assignments,
            completed_count,
            backend: backend.to_string(),
            updated_at: format_epoch_ms(state.updated_at_ms),
        }
    }
}
