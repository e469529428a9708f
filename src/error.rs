use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::dao::storage::StorageError;
use crate::services::email_service::EmailSendError;

/// Errors that can occur in service layer operations.
///
/// Business-rule rejections (duplicate option, duplicate submission, unknown
/// assignment) are not errors: they come back as `(ok, message)` replies.
/// These variants cover infrastructure failures only.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable (I/O, network, or lock timeout).
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Remote save failed; the change was deliberately not written locally
    /// so the local and remote records cannot silently diverge.
    #[error("cloud save failed; the change was not saved to the cloud")]
    RemoteSaveFailed(#[source] StorageError),
    /// Remote sync is not configured for this deployment.
    #[error("remote sync is not configured")]
    RemoteUnconfigured,
    /// No email transport has been installed.
    #[error("email transport is not configured")]
    EmailUnconfigured,
    /// The email transport rejected the message.
    #[error("failed to send email")]
    EmailSend(#[source] EmailSendError),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::RemoteSaveFailed(source) => AppError::ServiceUnavailable(format!(
                "cloud save failed ({source}); the change was not saved to the cloud"
            )),
            ServiceError::RemoteUnconfigured => {
                AppError::ServiceUnavailable("remote sync is not configured".into())
            }
            ServiceError::EmailUnconfigured => {
                AppError::ServiceUnavailable("email transport is not configured".into())
            }
            ServiceError::EmailSend(source) => AppError::Internal(source.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
