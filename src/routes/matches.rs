use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::matches::{
        ActionOutcome, CheckInRequest, ConfirmationRequest, DisqualifyRequest,
        MatchStatusSnapshot, ReportScoreRequest,
    },
    error::AppError,
    services::{
        checkin_service, confirmation_service, dq_service, match_access, report_service,
    },
    state::SharedState,
};

/// Routes handling the match lifecycle operations.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/matches/{id}", get(match_status))
        .route("/matches/{id}/check-in", post(check_in))
        .route("/matches/{id}/report", post(report_score))
        .route("/matches/{id}/confirmation", post(resolve_confirmation))
        .route("/matches/{id}/disqualify", post(disqualify))
}

/// Return a read-only snapshot of a match.
#[utoipa::path(
    get,
    path = "/matches/{id}",
    tag = "matches",
    params(("id" = String, Path, description = "Match identifier")),
    responses(
        (status = 200, description = "Current match snapshot", body = MatchStatusSnapshot),
        (status = 404, description = "No such match")
    )
)]
pub async fn match_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<MatchStatusSnapshot>, AppError> {
    let (_store, entity) = match_access::require_match(&state, &id).await?;
    Ok(Json(MatchStatusSnapshot::from_entity(&entity, false)))
}

/// Record one participant's readiness.
#[utoipa::path(
    post,
    path = "/matches/{id}/check-in",
    tag = "matches",
    params(("id" = String, Path, description = "Match identifier")),
    request_body = CheckInRequest,
    responses(
        (status = 200, description = "Check-in recorded", body = ActionOutcome),
        (status = 409, description = "Check-in window closed or state moved on")
    )
)]
pub async fn check_in(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<CheckInRequest>,
) -> Result<Json<ActionOutcome>, AppError> {
    let outcome = checkin_service::check_in(&state, &id, payload).await?;
    Ok(Json(outcome))
}

/// Report the outcome of a match.
#[utoipa::path(
    post,
    path = "/matches/{id}/report",
    tag = "matches",
    params(("id" = String, Path, description = "Match identifier")),
    request_body = ReportScoreRequest,
    responses(
        (status = 200, description = "Report accepted", body = ActionOutcome),
        (status = 409, description = "Match not in a reportable state")
    )
)]
pub async fn report_score(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<ReportScoreRequest>,
) -> Result<Json<ActionOutcome>, AppError> {
    let outcome = report_service::report_score(&state, &id, payload).await?;
    Ok(Json(outcome))
}

/// Accept or dispute the pending claim.
#[utoipa::path(
    post,
    path = "/matches/{id}/confirmation",
    tag = "matches",
    params(("id" = String, Path, description = "Match identifier")),
    request_body = ConfirmationRequest,
    responses(
        (status = 200, description = "Confirmation resolved", body = ActionOutcome),
        (status = 409, description = "No pending claim to resolve")
    )
)]
pub async fn resolve_confirmation(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<ConfirmationRequest>,
) -> Result<Json<ActionOutcome>, AppError> {
    let outcome = confirmation_service::resolve_confirmation(&state, &id, payload).await?;
    Ok(Json(outcome))
}

/// Disqualify one participant and close the match.
#[utoipa::path(
    post,
    path = "/matches/{id}/disqualify",
    tag = "matches",
    params(("id" = String, Path, description = "Match identifier")),
    request_body = DisqualifyRequest,
    responses(
        (status = 200, description = "Disqualification applied", body = ActionOutcome),
        (status = 409, description = "Match already finalized")
    )
)]
pub async fn disqualify(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<DisqualifyRequest>,
) -> Result<Json<ActionOutcome>, AppError> {
    let outcome = dq_service::disqualify(&state, &id, payload).await?;
    Ok(Json(outcome))
}
