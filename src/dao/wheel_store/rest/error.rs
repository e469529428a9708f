//! Error types shared by the remote table store.

use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::storage::StorageError;

/// Convenient result alias returning [`RestDaoError`] failures.
pub type RestResult<T> = Result<T, RestDaoError>;

/// Failures that can occur while talking to the remote state table.
#[derive(Debug, Error)]
pub enum RestDaoError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build remote sync client")]
    ClientBuilder {
        /// Builder failure.
        #[source]
        source: reqwest::Error,
    },
    /// A request could not be sent.
    #[error("failed to send remote request to `{path}`")]
    RequestSend {
        /// Target path of the request.
        path: String,
        /// Transport failure.
        #[source]
        source: reqwest::Error,
    },
    /// The gateway returned an unexpected status code.
    #[error("unexpected remote response status {status} for `{path}`")]
    RequestStatus {
        /// Target path of the request.
        path: String,
        /// Returned status code.
        status: StatusCode,
    },
    /// A response payload could not be parsed.
    #[error("failed to decode remote response for `{path}`")]
    DecodeResponse {
        /// Target path of the request.
        path: String,
        /// Decode failure.
        #[source]
        source: reqwest::Error,
    },
    /// The optional atomic procedure is not installed on the backend.
    #[error("remote procedure `{procedure}` is not installed")]
    ProcedureMissing {
        /// Name of the missing procedure.
        procedure: &'static str,
    },
    /// The procedure answered with a shape we cannot interpret.
    #[error("unexpected `{procedure}` response: {detail}")]
    MalformedRpcResponse {
        /// Name of the procedure.
        procedure: &'static str,
        /// What was wrong with the payload.
        detail: String,
    },
    /// The procedure reported a server-side error.
    #[error("remote procedure `{procedure}` failed: {message}")]
    RpcFailure {
        /// Name of the procedure.
        procedure: &'static str,
        /// Error reported by the backend.
        message: String,
    },
}

impl From<RestDaoError> for StorageError {
    fn from(err: RestDaoError) -> Self {
        match err {
            RestDaoError::ProcedureMissing { procedure } => {
                StorageError::CapabilityMissing { procedure }
            }
            other => {
                let message = other.to_string();
                StorageError::unavailable(message, other)
            }
        }
    }
}
