use serde::Serialize;
use utoipa::ToSchema;

use crate::dao::models::SpinOutcome;

/// Result of one spin request; `winner` is null when the pool is empty.
#[derive(Debug, Serialize, ToSchema)]
pub struct SpinResponse {
    /// Outcome of the spin, absent when no option was available.
    pub winner: Option<SpinOutcomeDto>,
}

/// Public projection of a spin outcome.
#[derive(Debug, Serialize, ToSchema)]
pub struct SpinOutcomeDto {
    /// Winning option name.
    pub winner_name: String,
    /// Winning option description.
    pub winner_description: String,
    /// Pool labels at spin time, winner included, for the wheel animation.
    pub labels_for_spin: Vec<String>,
    /// Identifier issued to this spin.
    pub spin_id: u64,
}

impl From<SpinOutcome> for SpinOutcomeDto {
    fn from(outcome: SpinOutcome) -> Self {
        Self {
            winner_name: outcome.winner_name,
            winner_description: outcome.winner_description,
            labels_for_spin: outcome.labels_for_spin,
            spin_id: outcome.spin_id,
        }
    }
}
