use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{dao::models::SpinAssignment, dto::format_epoch_ms};

/// Payload recording a team's completion of an assigned task.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SubmitCompletionRequest {
    /// Identifier of the spin whose task was completed.
    pub spin_id: u64,
    /// Submitting team's name.
    #[validate(length(min = 1, message = "Team name is required."))]
    pub team_name: String,
}

/// Public projection of a pending task assignment.
#[derive(Debug, Serialize, ToSchema)]
pub struct AssignmentSummary {
    /// Spin identifier.
    pub spin_id: u64,
    /// Option that was assigned.
    pub option_name: String,
    /// When the spin happened, formatted.
    pub assigned_at: String,
    /// When the spin happened, epoch milliseconds.
    pub assigned_at_ms: i64,
}

impl From<&SpinAssignment> for AssignmentSummary {
    fn from(assignment: &SpinAssignment) -> Self {
        Self {
            spin_id: assignment.spin_id,
            option_name: assignment.option_name.clone(),
            assigned_at: format_epoch_ms(assignment.assigned_at_ms),
            assigned_at_ms: assignment.assigned_at_ms,
        }
    }
}

/// One ranked leaderboard entry for a completed assignment.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardRow {
    /// Position, 1-based, fastest first.
    pub rank: usize,
    /// Submitting team.
    pub team_name: String,
    /// Completed task (option name).
    pub option_name: String,
    /// Spin identifier.
    pub spin_id: u64,
    /// Assignment time, formatted.
    pub assigned_at: String,
    /// Completion time, formatted.
    pub completed_at: String,
    /// Time from assignment to completion, clamped at zero.
    pub duration_ms: i64,
}
