use std::time::SystemTime;

use tracing::info;

use crate::{
    dao::models::MatchState,
    dto::matches::{ActionOutcome, CheckInRequest, MatchStatusSnapshot},
    error::ServiceError,
    state::SharedState,
};

use super::match_access::require_match;

/// Record one participant's readiness and, when both are in, drive the match
/// to CHECKED_IN.
pub async fn check_in(
    state: &SharedState,
    match_id: &str,
    request: CheckInRequest,
) -> Result<ActionOutcome, ServiceError> {
    let (store, entity) = require_match(state, match_id).await?;

    let player = entity.player(request.slot);
    let authorized = player
        .account_id
        .as_deref()
        .is_some_and(|linked| linked == request.acting_identity);
    if !authorized {
        return Err(ServiceError::Unauthorized(
            "acting identity does not occupy that slot".into(),
        ));
    }

    if entity.state.is_terminal() {
        return Err(ServiceError::AlreadyFinalized(format!(
            "match `{match_id}` is {:?}",
            entity.state
        )));
    }

    if player.checked_in {
        // Benign repeat; no mutation.
        return Ok(ActionOutcome::ok(
            "already checked in",
            MatchStatusSnapshot::from_entity(&entity, false),
        ));
    }

    if let Some(deadline) = entity.checkin_deadline
        && SystemTime::now() > deadline
    {
        return Err(ServiceError::DeadlineExpired);
    }

    let marked = store
        .mark_checked_in(match_id, request.slot, SystemTime::now())
        .await?;
    if !marked {
        // A concurrent duplicate of this same request landed first; the flag
        // is set either way.
        info!(match_id, slot = ?request.slot, "duplicate check-in write ignored");
    }

    // Authoritative re-read *after* our own write. Two players clicking
    // within milliseconds must not both conclude "only I am ready".
    let count = store
        .checked_in_count(match_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("match `{match_id}` not found")))?;

    if count >= 2 {
        let transitioned = store
            .transition_state(
                match_id,
                vec![MatchState::NotStarted, MatchState::Called],
                MatchState::CheckedIn,
            )
            .await?;
        if transitioned {
            info!(match_id, "both players checked in; match ready");
        }
        // Losing this CAS to the peer's request is fine: the transition
        // happened exactly once.
    }

    let Some(fresh) = store.find_match(match_id).await? else {
        return Err(ServiceError::NotFound(format!(
            "match `{match_id}` not found"
        )));
    };

    let message = if count >= 2 {
        "both players checked in — match is ready"
    } else {
        "checked in — waiting for your opponent"
    };
    Ok(ActionOutcome::ok(
        message,
        MatchStatusSnapshot::from_entity(&fresh, false),
    ))
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;
    use crate::dao::models::Slot;
    use crate::services::testing::{MATCH_ID, StoreTestExt, memory_state, sample_match};

    fn request(identity: &str, slot: Slot) -> CheckInRequest {
        CheckInRequest {
            acting_identity: identity.into(),
            slot,
        }
    }

    #[tokio::test]
    async fn check_in_is_idempotent() {
        let (state, store, _sync) = memory_state().await;
        store.seed(sample_match(MATCH_ID, MatchState::Called)).await;

        check_in(&state, MATCH_ID, request("acct-a", Slot::One))
            .await
            .unwrap();
        let repeat = check_in(&state, MATCH_ID, request("acct-a", Slot::One))
            .await
            .unwrap();

        assert_eq!(repeat.message, "already checked in");
        let entity = store.entity(MATCH_ID).await;
        assert_eq!(entity.checked_in_count(), 1);
        assert_eq!(entity.state, MatchState::Called);
    }

    #[tokio::test]
    async fn second_check_in_transitions_to_checked_in() {
        let (state, store, _sync) = memory_state().await;
        store.seed(sample_match(MATCH_ID, MatchState::Called)).await;

        check_in(&state, MATCH_ID, request("acct-a", Slot::One))
            .await
            .unwrap();
        let second = check_in(&state, MATCH_ID, request("acct-b", Slot::Two))
            .await
            .unwrap();

        assert_eq!(second.message, "both players checked in — match is ready");
        assert_eq!(store.entity(MATCH_ID).await.state, MatchState::CheckedIn);
    }

    #[tokio::test]
    async fn concurrent_check_ins_transition_exactly_once() {
        let (state, store, _sync) = memory_state().await;
        store.seed(sample_match(MATCH_ID, MatchState::Called)).await;

        let a = {
            let state = state.clone();
            tokio::spawn(
                async move { check_in(&state, MATCH_ID, request("acct-a", Slot::One)).await },
            )
        };
        let b = {
            let state = state.clone();
            tokio::spawn(
                async move { check_in(&state, MATCH_ID, request("acct-b", Slot::Two)).await },
            )
        };

        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let entity = store.entity(MATCH_ID).await;
        assert_eq!(entity.state, MatchState::CheckedIn);
        assert_eq!(entity.checked_in_count(), 2);
    }

    #[tokio::test]
    async fn wrong_identity_is_unauthorized() {
        let (state, store, _sync) = memory_state().await;
        store.seed(sample_match(MATCH_ID, MatchState::Called)).await;

        let err = check_in(&state, MATCH_ID, request("acct-b", Slot::One))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn expired_deadline_is_rejected() {
        let (state, store, _sync) = memory_state().await;
        let mut entity = sample_match(MATCH_ID, MatchState::Called);
        entity.checkin_deadline = Some(SystemTime::now() - Duration::from_secs(60));
        store.seed(entity).await;

        let err = check_in(&state, MATCH_ID, request("acct-a", Slot::One))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::DeadlineExpired));
    }

    #[tokio::test]
    async fn malformed_id_rejected_without_storage_access() {
        // No store installed at all: a storage touch would surface as
        // Degraded, not InvalidIdentifier.
        let (state, _store, _sync) = memory_state().await;
        state.clear_match_store().await;

        let err = check_in(&state, "NOT-A-VALID-ID", request("acct-a", Slot::One))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidIdentifier(_)));
    }
}
