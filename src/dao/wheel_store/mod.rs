/// File-backed store guarded by an advisory lock.
pub mod local;
/// Remote table-backed store with optional atomic procedures.
pub mod rest;
