use std::error::Error;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying medium.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not serve the call (I/O, network, decode).
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Backend-specific description of the failure.
        message: String,
        /// Underlying cause.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The advisory lock on the local state file could not be acquired in time.
    #[error("timed out waiting for the state file lock at `{path}`")]
    LockTimeout {
        /// Path of the contended lock file.
        path: PathBuf,
    },
    /// An optional remote procedure is not installed on the backend.
    ///
    /// Distinguished from transient failures because its effect is a
    /// permanent-for-session capability downgrade, not a retry.
    #[error("remote procedure `{procedure}` is not installed")]
    CapabilityMissing {
        /// Name of the missing procedure.
        procedure: &'static str,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Whether this failure means the remote procedure does not exist.
    pub fn is_capability_missing(&self) -> bool {
        matches!(self, StorageError::CapabilityMissing { .. })
    }
}
