//! Score reporting protocol: classify a reported outcome as a trusted loser
//! confirmation or an unverified self-report, and apply the matching
//! conditional transition.

use tracing::info;

use crate::{
    dao::models::{MatchOutcome, ScoreUpdate},
    dto::matches::{ActionOutcome, MatchStatusSnapshot, ReportScoreRequest},
    error::ServiceError,
    services::sync_service::SyncJob,
    state::{
        SharedState,
        match_machine::{self, MatchEvent, REPORTABLE_STATES},
    },
};

use super::match_access::require_match;

/// Accept a reported outcome from one participant.
///
/// A reporter naming the *opponent* as winner is trusted immediately (a
/// player has no incentive to falsely declare themselves the loser) and
/// finalizes the match; a reporter naming *themselves* moves the match to
/// PENDING_CONFIRMATION instead.
pub async fn report_score(
    state: &SharedState,
    match_id: &str,
    request: ReportScoreRequest,
) -> Result<ActionOutcome, ServiceError> {
    let (store, entity) = require_match(state, match_id).await?;

    let Some(reporter) = entity.slot_of_identity(&request.acting_identity) else {
        return Err(ServiceError::Unauthorized(
            "acting identity is not a participant of this match".into(),
        ));
    };

    let self_report = request.winner_slot == reporter;
    let event = if self_report {
        MatchEvent::WinClaimed
    } else {
        MatchEvent::LoserConfirmed
    };
    // Rejects reports from CALLED (check-in incomplete), from
    // PENDING_CONFIRMATION (an open claim must be confirmed or disputed
    // first) and from terminal states.
    match_machine::next_state(entity.state, event)?;

    let score = request
        .score
        .clone()
        .map_or(ScoreUpdate::Keep, ScoreUpdate::Record);
    let outcome = if self_report {
        MatchOutcome::provisional(request.winner_slot, score)
    } else {
        MatchOutcome::finalized(request.winner_slot, score)
    };

    let applied = store
        .apply_outcome(match_id, REPORTABLE_STATES.to_vec(), None, outcome)
        .await?;
    if !applied {
        return Err(ServiceError::StaleState(format!(
            "match `{match_id}` was modified concurrently; report not applied"
        )));
    }

    if self_report {
        info!(match_id, winner = ?request.winner_slot, "win claimed; awaiting opponent confirmation");
    } else {
        info!(match_id, winner = ?request.winner_slot, "loser confirmation; match completed");
        state.enqueue_sync(SyncJob {
            match_id: match_id.to_owned(),
            winner: request.winner_slot,
            set_ref: entity.external_set_ref.clone(),
        });
    }

    let Some(fresh) = store.find_match(match_id).await? else {
        return Err(ServiceError::NotFound(format!(
            "match `{match_id}` not found"
        )));
    };

    let (message, auto_completed) = if self_report {
        ("win claimed — waiting for opponent confirmation", false)
    } else {
        ("result recorded — match complete", true)
    };
    Ok(ActionOutcome::ok(
        message,
        MatchStatusSnapshot::from_entity(&fresh, auto_completed),
    ))
}
