use serde::Serialize;
use utoipa::ToSchema;

use crate::dao::models::ActionReply;

/// Structured outcome of a business operation.
///
/// `ok = false` is an expected rejection (duplicate name, duplicate
/// submission), not a transport failure.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    /// Whether the operation was accepted.
    pub ok: bool,
    /// Human-readable outcome message.
    pub message: String,
}

impl From<ActionReply> for ActionResponse {
    fn from(reply: ActionReply) -> Self {
        Self {
            ok: reply.ok,
            message: reply.message,
        }
    }
}
