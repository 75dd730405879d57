use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::{command::ButtonPayload, matches::ActionOutcome},
    error::AppError,
    services::command_service,
    state::SharedState,
};

/// Route handling decoded chat-button payloads.
pub fn router() -> Router<SharedState> {
    Router::new().route("/commands", post(dispatch_command))
}

/// Dispatch a decoded button payload to the operation it encodes.
#[utoipa::path(
    post,
    path = "/commands",
    tag = "commands",
    request_body = ButtonPayload,
    responses(
        (status = 200, description = "Command executed", body = ActionOutcome),
        (status = 400, description = "Unknown prefix or malformed payload")
    )
)]
pub async fn dispatch_command(
    State(state): State<SharedState>,
    Json(payload): Json<ButtonPayload>,
) -> Result<Json<ActionOutcome>, AppError> {
    let outcome = command_service::dispatch(&state, payload).await?;
    Ok(Json(outcome))
}
