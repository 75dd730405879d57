use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Match Desk.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::matches::match_status,
        crate::routes::matches::check_in,
        crate::routes::matches::report_score,
        crate::routes::matches::resolve_confirmation,
        crate::routes::matches::disqualify,
        crate::routes::command::dispatch_command,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::command::ButtonPayload,
            crate::dto::matches::CheckInRequest,
            crate::dto::matches::ReportScoreRequest,
            crate::dto::matches::ConfirmationRequest,
            crate::dto::matches::DisqualifyRequest,
            crate::dto::matches::ActionOutcome,
            crate::dto::matches::MatchStatusSnapshot,
            crate::dto::matches::PlayerSnapshot,
            crate::dao::models::MatchState,
            crate::dao::models::Slot,
            crate::dao::models::SyncStatus,
            crate::dao::models::WinnerMark,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "matches", description = "Match lifecycle operations"),
        (name = "commands", description = "Chat button payload dispatch"),
    )
)]
pub struct ApiDoc;
