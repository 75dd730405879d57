//! Confirmation/dispute resolution for a pending self-reported claim.

use tracing::info;

use crate::{
    dao::models::{DisputeEntity, MatchOutcome, MatchState, ScoreUpdate},
    dto::matches::{ActionOutcome, ConfirmationRequest, MatchStatusSnapshot},
    error::ServiceError,
    services::sync_service::SyncJob,
    state::{
        SharedState,
        match_machine::{self, MatchEvent},
    },
};

use super::match_access::require_match;

/// Accept the non-reporting participant's confirm-or-dispute decision.
///
/// On confirm the provisional claim is finalized; on dispute the match is
/// fully reset — state back to CHECKED_IN *and* both marks back to unset in
/// the same conditional write, so reporting can restart cleanly.
pub async fn resolve_confirmation(
    state: &SharedState,
    match_id: &str,
    request: ConfirmationRequest,
) -> Result<ActionOutcome, ServiceError> {
    let (store, entity) = require_match(state, match_id).await?;

    let event = if request.accepted {
        MatchEvent::ClaimConfirmed
    } else {
        MatchEvent::ClaimDisputed
    };
    match_machine::next_state(entity.state, event)?;

    let Some(acting) = entity.slot_of_identity(&request.acting_identity) else {
        return Err(ServiceError::Unauthorized(
            "acting identity is not a participant of this match".into(),
        ));
    };
    let Some(claimant) = entity.winner_slot() else {
        // Pending state with no provisional mark means the claim was reset
        // underneath us.
        return Err(ServiceError::StaleState(format!(
            "match `{match_id}` no longer carries a pending claim"
        )));
    };
    if acting == claimant {
        return Err(ServiceError::Unauthorized(
            "the reporter cannot confirm their own claim".into(),
        ));
    }

    let outcome = if request.accepted {
        MatchOutcome::finalized(claimant, ScoreUpdate::Keep)
    } else {
        MatchOutcome::reset()
    };

    // Guarded on both the state and the claimant still holding the
    // provisional mark, so a dispute-then-new-claim interleaving cannot be
    // resolved with stale authorization.
    let applied = store
        .apply_outcome(
            match_id,
            vec![MatchState::PendingConfirmation],
            Some(claimant),
            outcome,
        )
        .await?;
    if !applied {
        return Err(ServiceError::StaleState(format!(
            "match `{match_id}` was modified concurrently; decision not applied"
        )));
    }

    if request.accepted {
        info!(match_id, winner = ?claimant, "claim confirmed; match completed");
        state.enqueue_sync(SyncJob {
            match_id: match_id.to_owned(),
            winner: claimant,
            set_ref: entity.external_set_ref.clone(),
        });
    } else {
        let reason = request
            .reason
            .clone()
            .unwrap_or_else(|| "result disputed".into());
        store
            .insert_dispute(DisputeEntity::open(match_id, acting, reason))
            .await?;
        info!(match_id, disputed_by = ?acting, "claim disputed; match reset for re-reporting");
    }

    let Some(fresh) = store.find_match(match_id).await? else {
        return Err(ServiceError::NotFound(format!(
            "match `{match_id}` not found"
        )));
    };

    let (message, auto_completed) = if request.accepted {
        ("result confirmed — match complete", true)
    } else {
        ("result disputed — reporting reopened", false)
    };
    Ok(ActionOutcome::ok(
        message,
        MatchStatusSnapshot::from_entity(&fresh, auto_completed),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::{Slot, WinnerMark};
    use crate::dto::matches::ReportScoreRequest;
    use crate::services::report_service::report_score;
    use crate::services::testing::{MATCH_ID, StoreTestExt, memory_state, sample_match};

    async fn seed_pending(
        state: &crate::state::SharedState,
        store: &crate::dao::match_store::memory::MemoryMatchStore,
    ) {
        store
            .seed(sample_match(MATCH_ID, MatchState::CheckedIn))
            .await;
        // A claims their own win.
        report_score(
            state,
            MATCH_ID,
            ReportScoreRequest {
                acting_identity: "acct-a".into(),
                winner_slot: Slot::One,
                score: Some("2-0".into()),
            },
        )
        .await
        .unwrap();
    }

    fn decision(identity: &str, accepted: bool) -> ConfirmationRequest {
        ConfirmationRequest {
            acting_identity: identity.into(),
            accepted,
            reason: None,
        }
    }

    #[tokio::test]
    async fn confirm_finalizes_and_enqueues_sync() {
        let (state, store, mut sync) = memory_state().await;
        seed_pending(&state, &store).await;

        let outcome = resolve_confirmation(&state, MATCH_ID, decision("acct-b", true))
            .await
            .unwrap();

        assert!(outcome.match_status.unwrap().auto_completed);
        let entity = store.entity(MATCH_ID).await;
        assert_eq!(entity.state, MatchState::Completed);
        assert_eq!(entity.players[0].mark, WinnerMark::Winner);
        assert_eq!(entity.players[1].mark, WinnerMark::Loser);

        let job = sync.try_recv().expect("sync job enqueued");
        assert_eq!(job.winner, Slot::One);
    }

    #[tokio::test]
    async fn dispute_fully_resets_and_reporting_restarts() {
        let (state, store, mut sync) = memory_state().await;
        seed_pending(&state, &store).await;

        resolve_confirmation(&state, MATCH_ID, decision("acct-b", false))
            .await
            .unwrap();

        let entity = store.entity(MATCH_ID).await;
        assert_eq!(entity.state, MatchState::CheckedIn);
        assert!(entity.players.iter().all(|p| p.mark == WinnerMark::Unset));
        assert_eq!(entity.reported_score, None);
        assert!(sync.try_recv().is_err());

        // A fresh report must go through without StaleState.
        let rereport = report_score(
            &state,
            MATCH_ID,
            ReportScoreRequest {
                acting_identity: "acct-b".into(),
                winner_slot: Slot::One,
                score: None,
            },
        )
        .await
        .unwrap();
        assert!(rereport.match_status.unwrap().auto_completed);
        assert_eq!(store.entity(MATCH_ID).await.state, MatchState::Completed);
    }

    #[tokio::test]
    async fn dispute_records_an_annotation() {
        let (state, store, _sync) = memory_state().await;
        seed_pending(&state, &store).await;

        resolve_confirmation(
            &state,
            MATCH_ID,
            ConfirmationRequest {
                acting_identity: "acct-b".into(),
                accepted: false,
                reason: Some("we played a different set".into()),
            },
        )
        .await
        .unwrap();

        let disputes = store.disputes();
        assert_eq!(disputes.len(), 1);
        assert_eq!(disputes[0].match_id, MATCH_ID);
        assert_eq!(disputes[0].raised_by, Slot::Two);
        assert_eq!(disputes[0].reason, "we played a different set");
    }

    #[tokio::test]
    async fn reporter_cannot_confirm_own_claim() {
        let (state, store, _sync) = memory_state().await;
        seed_pending(&state, &store).await;

        let err = resolve_confirmation(&state, MATCH_ID, decision("acct-a", true))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn confirmation_outside_pending_state_is_rejected() {
        let (state, store, _sync) = memory_state().await;
        store
            .seed(sample_match(MATCH_ID, MatchState::CheckedIn))
            .await;

        let err = resolve_confirmation(&state, MATCH_ID, decision("acct-b", true))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::StaleState(_)));
    }
}
