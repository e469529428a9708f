//! Wire models for the remote state table and its optional procedures.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Table holding one state row per application id.
pub const STATE_TABLE: &str = "wheel_state";
/// Atomic server-side spin procedure.
pub const SPIN_PROCEDURE: &str = "spin_once";
/// Atomic server-side completion procedure.
pub const SUBMIT_PROCEDURE: &str = "submit_completion_once";

/// Row shape of the state table: the whole document in one field.
#[derive(Debug, Serialize)]
pub struct StateRow {
    /// Application id keying the row.
    pub id: String,
    /// Entire canonical document.
    pub state: Value,
}

/// Projection returned by `select=state` queries.
#[derive(Debug, Deserialize)]
pub struct StateCell {
    /// Entire canonical document.
    pub state: Value,
}

/// Payload returned by the `spin_once` procedure.
#[derive(Debug, Default, Deserialize)]
pub struct SpinProcedureRow {
    /// Server-side failure, when set.
    #[serde(default)]
    pub error: Option<String>,
    /// Winning option name; `None`/empty means the pool was empty.
    #[serde(default)]
    pub winner_name: Option<String>,
    /// Winning option description.
    #[serde(default)]
    pub winner_description: Option<String>,
    /// Pool labels used for the spin.
    #[serde(default)]
    pub labels_for_spin: Option<Vec<String>>,
    /// Identifier issued to the spin.
    #[serde(default)]
    pub spin_id: Option<u64>,
}

/// Payload returned by the `submit_completion_once` procedure.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitProcedureRow {
    /// Server-side failure, when set.
    #[serde(default)]
    pub error: Option<String>,
    /// Whether the completion was recorded.
    #[serde(default)]
    pub ok: Option<bool>,
    /// Outcome message for the caller.
    #[serde(default)]
    pub message: Option<String>,
}
