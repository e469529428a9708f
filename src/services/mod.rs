/// Completion engine recording team submissions.
pub mod completion_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Result email construction and the transport seam.
pub mod email_service;
/// Health check service.
pub mod health_service;
/// Option registration, reset, and read projections.
pub mod option_service;
/// Spin engine selecting uniformly among available options.
pub mod spin_service;
/// Backend routing and session-scoped sync state.
pub mod sync_service;
/// Sync diagnostics endpoints.
pub mod sync_status_service;
