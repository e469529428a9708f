/// Canonical shared-state document definitions.
pub mod models;
/// Repair of raw persisted documents into valid state.
pub mod normalize;
/// Storage abstraction layer shared by both backends.
pub mod storage;
/// Wheel state storage backends (local file and remote table).
pub mod wheel_store;
