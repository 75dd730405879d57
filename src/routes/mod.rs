use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{services::documentation::ApiDoc, state::SharedState};

/// Chat button payload dispatch route.
pub mod command;
/// Health check route.
pub mod health;
/// Match lifecycle routes.
pub mod matches;

/// Compose all route trees, wiring in shared state and the Swagger UI.
pub fn router(state: SharedState) -> Router<()> {
    let swagger: Router<SharedState> = SwaggerUi::new("/docs")
        .url("/api-doc/openapi.json", ApiDoc::openapi())
        .into();

    health::router()
        .merge(matches::router())
        .merge(command::router())
        .merge(swagger)
        .with_state(state)
}
