//! File-backed wheel state store.
//!
//! The document lives in one JSON file, pretty-printed so operators can
//! inspect or edit it directly. Every access holds an exclusive advisory
//! lock on a sibling `.lock` file, giving read-modify-write atomicity
//! across processes on the same machine.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;
use tracing::warn;

use crate::dao::models::{WheelState, current_time_ms};
use crate::dao::normalize::{normalize, repair};
use crate::dao::storage::{StorageError, StorageResult};

/// Default on-disk location of the shared state document.
const DEFAULT_STATE_PATH: &str = "data/shared_state.json";
/// Environment variable overriding [`DEFAULT_STATE_PATH`].
const STATE_PATH_ENV: &str = "WHEEL_STATE_PATH";
/// Bounded wait for the advisory lock before failing with `LockTimeout`.
const LOCK_TIMEOUT: Duration = Duration::from_secs(5);
/// Poll interval while waiting for the advisory lock.
const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Store persisting the canonical document in a locked local file.
#[derive(Debug, Clone)]
pub struct LocalWheelStore {
    path: PathBuf,
    lock_path: PathBuf,
    lock_timeout: Duration,
}

impl LocalWheelStore {
    /// Create a store backed by `path`; the lock file sits next to it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut lock_name = path.as_os_str().to_os_string();
        lock_name.push(".lock");
        Self {
            lock_path: PathBuf::from(lock_name),
            path,
            lock_timeout: LOCK_TIMEOUT,
        }
    }

    /// Build a store from `WHEEL_STATE_PATH`, falling back to the default path.
    pub fn from_env() -> Self {
        let path = std::env::var(STATE_PATH_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STATE_PATH.to_string());
        Self::new(path)
    }

    #[cfg(test)]
    fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Create the backing file with the default document if it is absent.
    pub async fn ensure_exists(&self) -> StorageResult<()> {
        let store = self.clone();
        run_blocking(move || store.ensure_exists_blocking()).await
    }

    /// Read and normalize the document.
    ///
    /// Decode and I/O failures fall back to the default document; only a
    /// lock timeout is surfaced to the caller.
    pub async fn load(&self) -> StorageResult<WheelState> {
        let store = self.clone();
        run_blocking(move || store.load_blocking()).await
    }

    /// Normalize, stamp `updated_at_ms`, and overwrite the document.
    pub async fn save(&self, state: WheelState) -> StorageResult<()> {
        let store = self.clone();
        run_blocking(move || store.save_blocking(state)).await
    }

    fn ensure_exists_blocking(&self) -> StorageResult<()> {
        let _lock = FileLockGuard::acquire(&self.lock_path, self.lock_timeout)?;
        if self.path.exists() {
            return Ok(());
        }
        self.write_document(&WheelState::new_default())
    }

    fn load_blocking(&self) -> StorageResult<WheelState> {
        let _lock = FileLockGuard::acquire(&self.lock_path, self.lock_timeout)?;

        if !self.path.exists() {
            let state = WheelState::new_default();
            self.write_document(&state)?;
            return Ok(state);
        }

        let raw = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to read state file; using default state");
                return Ok(WheelState::new_default());
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(normalize(&value)),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "state file is not valid JSON; using default state");
                Ok(WheelState::new_default())
            }
        }
    }

    fn save_blocking(&self, state: WheelState) -> StorageResult<()> {
        let mut state = repair(state);
        state.updated_at_ms = current_time_ms();

        let _lock = FileLockGuard::acquire(&self.lock_path, self.lock_timeout)?;
        self.write_document(&state)
    }

    fn write_document(&self, state: &WheelState) -> StorageResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| {
                StorageError::unavailable(
                    format!("failed to create state directory `{}`", parent.display()),
                    err,
                )
            })?;
        }

        let payload = serde_json::to_string_pretty(state).map_err(|err| {
            StorageError::unavailable("failed to serialize state document".into(), err)
        })?;

        fs::write(&self.path, payload).map_err(|err| {
            StorageError::unavailable(
                format!("failed to write state file `{}`", self.path.display()),
                err,
            )
        })
    }
}

/// Exclusive advisory lock held for the duration of one store operation.
struct FileLockGuard {
    file: File,
}

impl FileLockGuard {
    fn acquire(lock_path: &Path, timeout: Duration) -> StorageResult<Self> {
        if let Some(parent) = lock_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| {
                StorageError::unavailable(
                    format!("failed to create lock directory `{}`", parent.display()),
                    err,
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(lock_path)
            .map_err(|err| {
                StorageError::unavailable(
                    format!("failed to open lock file `{}`", lock_path.display()),
                    err,
                )
            })?;

        let deadline = Instant::now() + timeout;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(Self { file }),
                Err(_) if Instant::now() < deadline => {
                    std::thread::sleep(LOCK_POLL_INTERVAL);
                }
                Err(_) => {
                    return Err(StorageError::LockTimeout {
                        path: lock_path.to_path_buf(),
                    });
                }
            }
        }
    }
}

impl Drop for FileLockGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

async fn run_blocking<T, F>(operation: F) -> StorageResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> StorageResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(operation)
        .await
        .map_err(|err| StorageError::unavailable("state file task failed".into(), err))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::WheelOption;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> LocalWheelStore {
        LocalWheelStore::new(dir.path().join("shared_state.json"))
    }

    #[tokio::test]
    async fn ensure_exists_creates_default_document() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);

        store.ensure_exists().await.expect("ensure");
        let state = store.load().await.expect("load");
        assert!(state.options.is_empty());
        assert_eq!(state.spin_id, 0);
        assert_eq!(state.next_submission_seq, 1);
    }

    #[tokio::test]
    async fn save_and_load_round_trip() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);

        let mut state = WheelState::new_default();
        state.options.push(WheelOption {
            name: "Pizza".into(),
            description: "lunch".into(),
            limit: 2,
            remaining: 2,
        });
        state.spin_id = 4;
        store.save(state.clone()).await.expect("save");

        let loaded = store.load().await.expect("load");
        assert_eq!(loaded.options, state.options);
        assert_eq!(loaded.spin_id, 4);
    }

    #[tokio::test]
    async fn corrupt_file_falls_back_to_default() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);
        fs::write(dir.path().join("shared_state.json"), "{not json").expect("write");

        let state = store.load().await.expect("load");
        assert!(state.options.is_empty());
        assert_eq!(state.next_submission_seq, 1);
    }

    #[tokio::test]
    async fn save_repairs_invariants_before_writing() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);

        let mut state = WheelState::new_default();
        state.options.push(WheelOption {
            name: "a".into(),
            description: String::new(),
            limit: 2,
            remaining: 9,
        });
        state.next_submission_seq = 0;
        store.save(state).await.expect("save");

        let loaded = store.load().await.expect("load");
        assert_eq!(loaded.options[0].remaining, 2);
        assert_eq!(loaded.next_submission_seq, 1);
    }

    #[tokio::test]
    async fn contended_lock_times_out() {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir).with_lock_timeout(Duration::from_millis(120));

        let lock_path = dir.path().join("shared_state.json.lock");
        let holder =
            FileLockGuard::acquire(&lock_path, Duration::from_millis(120)).expect("lock");

        let result = store.load().await;
        assert!(matches!(result, Err(StorageError::LockTimeout { .. })));
        drop(holder);

        store.load().await.expect("lock released");
    }
}
