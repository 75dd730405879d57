//! Shared lookup path: identifier validation, then store access.

use std::sync::Arc;

use crate::{
    dao::{match_store::MatchStore, models::MatchEntity},
    dto::validation::validate_match_id,
    error::ServiceError,
    state::SharedState,
};

/// Validate the identifier, then load the match.
///
/// Validation runs first so malformed identifiers are rejected without any
/// storage access.
pub(crate) async fn require_match(
    state: &SharedState,
    match_id: &str,
) -> Result<(Arc<dyn MatchStore>, MatchEntity), ServiceError> {
    validate_match_id(match_id)
        .map_err(|err| ServiceError::InvalidIdentifier(err.to_string()))?;

    let store = state.require_match_store().await?;
    let Some(entity) = store.find_match(match_id).await? else {
        return Err(ServiceError::NotFound(format!(
            "match `{match_id}` not found"
        )));
    };

    Ok((store, entity))
}
