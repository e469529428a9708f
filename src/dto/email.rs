use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Payload requesting that a spin result be emailed.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SendResultEmailRequest {
    /// Recipient address.
    #[validate(email(message = "Please enter a valid email address."))]
    pub recipient: String,
}
