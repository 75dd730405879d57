//! Administrative disqualification: terminate a match from any non-terminal
//! state, awarding the opponent.

use tracing::info;

use crate::{
    dao::models::MatchOutcome,
    dto::matches::{ActionOutcome, DisqualifyRequest, MatchStatusSnapshot},
    error::ServiceError,
    state::{SharedState, match_machine::DQ_SOURCE_STATES},
};

use super::match_access::require_match;

/// Disqualify one participant.
///
/// Sync is deliberately not enqueued here; whether a DQ propagates to the
/// bracket of record is the sync collaborator's call.
pub async fn disqualify(
    state: &SharedState,
    match_id: &str,
    request: DisqualifyRequest,
) -> Result<ActionOutcome, ServiceError> {
    let (store, entity) = require_match(state, match_id).await?;

    if entity.state.is_terminal() {
        return Err(ServiceError::AlreadyFinalized(format!(
            "match `{match_id}` is {:?}",
            entity.state
        )));
    }

    let applied = store
        .apply_outcome(
            match_id,
            DQ_SOURCE_STATES.to_vec(),
            None,
            MatchOutcome::disqualified(request.player_slot),
        )
        .await?;
    if !applied {
        // Guard failed: a concurrent report or confirm finalized the match
        // first. Never double-apply.
        return Err(ServiceError::AlreadyFinalized(format!(
            "match `{match_id}` was finalized concurrently"
        )));
    }

    if let Some(admin) = &request.admin_identity {
        info!(
            match_id,
            admin,
            dq_slot = ?request.player_slot,
            reason = %request.reason,
            "player disqualified by moderator"
        );
    } else {
        info!(
            match_id,
            dq_slot = ?request.player_slot,
            reason = %request.reason,
            "player disqualified"
        );
    }

    let Some(fresh) = store.find_match(match_id).await? else {
        return Err(ServiceError::NotFound(format!(
            "match `{match_id}` not found"
        )));
    };

    Ok(ActionOutcome::ok(
        "player disqualified — match closed",
        MatchStatusSnapshot::from_entity(&fresh, false),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::{MatchState, Slot, SyncStatus, WinnerMark};
    use crate::services::testing::{MATCH_ID, StoreTestExt, memory_state, sample_match};

    fn no_show(slot: Slot) -> DisqualifyRequest {
        DisqualifyRequest {
            player_slot: slot,
            reason: "no-show".into(),
            admin_identity: Some("mod-1".into()),
        }
    }

    #[tokio::test]
    async fn dq_from_not_started_awards_the_opponent() {
        let (state, store, mut sync) = memory_state().await;
        store
            .seed(sample_match(MATCH_ID, MatchState::NotStarted))
            .await;

        disqualify(&state, MATCH_ID, no_show(Slot::One))
            .await
            .unwrap();

        let entity = store.entity(MATCH_ID).await;
        assert_eq!(entity.state, MatchState::Disqualified);
        assert_eq!(entity.players[0].mark, WinnerMark::Loser);
        assert_eq!(entity.players[1].mark, WinnerMark::Winner);
        // DQ does not enqueue sync on its own.
        assert!(sync.try_recv().is_err());
        assert_eq!(entity.sync_status, SyncStatus::NotSynced);
    }

    #[tokio::test]
    async fn second_dq_is_already_finalized() {
        let (state, store, _sync) = memory_state().await;
        store
            .seed(sample_match(MATCH_ID, MatchState::NotStarted))
            .await;

        disqualify(&state, MATCH_ID, no_show(Slot::One))
            .await
            .unwrap();
        let err = disqualify(&state, MATCH_ID, no_show(Slot::One))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyFinalized(_)));
    }

    #[tokio::test]
    async fn dq_interrupts_a_pending_claim() {
        let (state, store, _sync) = memory_state().await;
        store
            .seed(sample_match(MATCH_ID, MatchState::PendingConfirmation))
            .await;

        disqualify(&state, MATCH_ID, no_show(Slot::Two))
            .await
            .unwrap();
        assert_eq!(store.entity(MATCH_ID).await.state, MatchState::Disqualified);
    }

    #[tokio::test]
    async fn dq_on_completed_match_is_rejected() {
        let (state, store, _sync) = memory_state().await;
        store
            .seed(sample_match(MATCH_ID, MatchState::Completed))
            .await;

        let err = disqualify(&state, MATCH_ID, no_show(Slot::One))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyFinalized(_)));
    }
}
