use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI document for Spin Wheel Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::wheel::wheel_snapshot,
        crate::routes::wheel::add_option,
        crate::routes::wheel::reset_wheel,
        crate::routes::spin::spin,
        crate::routes::completion::pending_assignments,
        crate::routes::completion::submit_completion,
        crate::routes::completion::leaderboard,
        crate::routes::email::send_result_email,
        crate::routes::sync::sync_status,
        crate::routes::sync::probe_remote,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::common::ActionResponse,
            crate::dto::wheel::AddOptionRequest,
            crate::dto::wheel::OptionSummary,
            crate::dto::wheel::WheelSnapshotResponse,
            crate::dto::spin::SpinResponse,
            crate::dto::spin::SpinOutcomeDto,
            crate::dto::completion::SubmitCompletionRequest,
            crate::dto::completion::AssignmentSummary,
            crate::dto::completion::LeaderboardRow,
            crate::dto::email::SendResultEmailRequest,
            crate::dto::sync::SyncStatusResponse,
        )
    ),
    tags(
        (name = "wheel", description = "Option registration and wheel snapshots"),
        (name = "spin", description = "Spin execution"),
        (name = "completion", description = "Task completions and leaderboard"),
        (name = "email", description = "Result email delivery"),
        (name = "sync", description = "Shared-state sync diagnostics"),
        (name = "health", description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;
