use axum::Router;

use crate::state::SharedState;

/// Task completion and leaderboard routes.
pub mod completion;
/// Swagger UI routes.
pub mod docs;
/// Result email routes.
pub mod email;
/// Health check routes.
pub mod health;
/// Spin routes.
pub mod spin;
/// Sync diagnostics routes.
pub mod sync;
/// Wheel snapshot and option routes.
pub mod wheel;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(wheel::router())
        .merge(spin::router())
        .merge(completion::router())
        .merge(email::router())
        .merge(sync::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
