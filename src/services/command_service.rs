//! Dispatch of decoded chat-button payloads onto the lifecycle services.
//!
//! The prefix resolves into [`CommandKind`] and dispatch is an exhaustive
//! `match`; adding an operation without wiring it here fails to compile.

use tracing::debug;

use crate::{
    dao::models::Slot,
    dto::{
        command::{ButtonPayload, CommandKind},
        matches::{
            ActionOutcome, CheckInRequest, ConfirmationRequest, DisqualifyRequest,
            ReportScoreRequest,
        },
    },
    error::ServiceError,
    services::{checkin_service, confirmation_service, dq_service, report_service},
    state::SharedState,
};

/// Route a button payload to the operation it encodes.
pub async fn dispatch(
    state: &SharedState,
    payload: ButtonPayload,
) -> Result<ActionOutcome, ServiceError> {
    let Some(kind) = CommandKind::from_prefix(&payload.prefix) else {
        return Err(ServiceError::InvalidInput(format!(
            "unknown command prefix '{}'",
            payload.prefix
        )));
    };
    debug!(prefix = %payload.prefix, match_id = %payload.match_id, "dispatching command");

    match kind {
        CommandKind::CheckIn => {
            let slot = parse_slot(payload.extra.first(), "check-in slot")?;
            checkin_service::check_in(
                state,
                &payload.match_id,
                CheckInRequest {
                    acting_identity: payload.acting_identity,
                    slot,
                },
            )
            .await
        }
        CommandKind::Report => {
            let winner_slot = parse_slot(payload.extra.first(), "claimed winner slot")?;
            let score = payload.extra.get(1).filter(|s| !s.is_empty()).cloned();
            report_service::report_score(
                state,
                &payload.match_id,
                ReportScoreRequest {
                    acting_identity: payload.acting_identity,
                    winner_slot,
                    score,
                },
            )
            .await
        }
        CommandKind::Confirm => {
            confirmation_service::resolve_confirmation(
                state,
                &payload.match_id,
                ConfirmationRequest {
                    acting_identity: payload.acting_identity,
                    accepted: true,
                    reason: None,
                },
            )
            .await
        }
        CommandKind::Dispute => {
            let reason = payload.extra.first().filter(|s| !s.is_empty()).cloned();
            confirmation_service::resolve_confirmation(
                state,
                &payload.match_id,
                ConfirmationRequest {
                    acting_identity: payload.acting_identity,
                    accepted: false,
                    reason,
                },
            )
            .await
        }
        CommandKind::Disqualify => {
            let player_slot = parse_slot(payload.extra.first(), "disqualified slot")?;
            let reason = payload
                .extra
                .get(1..)
                .filter(|rest| !rest.is_empty())
                .map(|rest| rest.join(" "))
                .unwrap_or_else(|| "disqualified by moderator".to_owned());
            dq_service::disqualify(
                state,
                &payload.match_id,
                DisqualifyRequest {
                    player_slot,
                    reason,
                    admin_identity: Some(payload.acting_identity),
                },
            )
            .await
        }
    }
}

fn parse_slot(part: Option<&String>, what: &str) -> Result<Slot, ServiceError> {
    part.and_then(|raw| Slot::parse(raw))
        .ok_or_else(|| ServiceError::InvalidInput(format!("missing or invalid {what}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::models::{MatchState, SyncStatus, WinnerMark},
        services::testing::{MATCH_ID, StoreTestExt, memory_state, sample_match},
    };

    fn payload(prefix: &str, identity: &str, extra: &[&str]) -> ButtonPayload {
        ButtonPayload {
            prefix: prefix.to_owned(),
            match_id: MATCH_ID.to_owned(),
            extra: extra.iter().map(|s| (*s).to_owned()).collect(),
            acting_identity: identity.to_owned(),
        }
    }

    #[tokio::test]
    async fn checkin_button_reaches_the_checkin_service() {
        let (state, store, _sync_rx) = memory_state().await;
        store.seed(sample_match(MATCH_ID, MatchState::Called)).await;

        let outcome = dispatch(&state, payload("checkin", "acct-a", &["1"]))
            .await
            .unwrap();

        assert!(outcome.success);
        assert!(store.entity(MATCH_ID).await.players[0].checked_in);
    }

    #[tokio::test]
    async fn report_button_carries_winner_and_score() {
        let (state, store, mut sync_rx) = memory_state().await;
        store
            .seed(sample_match(MATCH_ID, MatchState::InProgress))
            .await;

        // Loser reports the opponent as winner: finalizes immediately.
        let outcome = dispatch(&state, payload("report", "acct-b", &["1", "2-1"]))
            .await
            .unwrap();

        assert!(outcome.success);
        let entity = store.entity(MATCH_ID).await;
        assert_eq!(entity.state, MatchState::Completed);
        assert_eq!(entity.reported_score.as_deref(), Some("2-1"));
        assert!(sync_rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn dispute_button_resets_the_pending_claim() {
        let (state, store, mut sync_rx) = memory_state().await;
        let mut entity = sample_match(MATCH_ID, MatchState::PendingConfirmation);
        entity.players[0].mark = WinnerMark::Winner;
        entity.players[1].mark = WinnerMark::Loser;
        store.seed(entity).await;

        let outcome = dispatch(&state, payload("dispute", "acct-b", &["bad score"]))
            .await
            .unwrap();

        assert!(outcome.success);
        let entity = store.entity(MATCH_ID).await;
        assert_eq!(entity.state, MatchState::CheckedIn);
        assert_eq!(entity.players[0].mark, WinnerMark::Unset);
        assert!(sync_rx.try_recv().is_err());
        let disputes = store.disputes();
        assert_eq!(disputes.len(), 1);
        assert_eq!(disputes[0].reason, "bad score");
    }

    #[tokio::test]
    async fn dq_button_records_the_admin_identity() {
        let (state, store, _sync_rx) = memory_state().await;
        store
            .seed(sample_match(MATCH_ID, MatchState::NotStarted))
            .await;

        let outcome = dispatch(&state, payload("dq", "mod-7", &["2", "no-show"]))
            .await
            .unwrap();

        assert!(outcome.success);
        let entity = store.entity(MATCH_ID).await;
        assert_eq!(entity.state, MatchState::Disqualified);
        assert_eq!(entity.players[0].mark, WinnerMark::Winner);
        assert_eq!(entity.sync_status, SyncStatus::NotSynced);
    }

    #[tokio::test]
    async fn unknown_prefix_is_invalid_input() {
        let (state, _store, _sync_rx) = memory_state().await;

        let err = dispatch(&state, payload("registration", "acct-a", &[]))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn malformed_slot_is_invalid_input() {
        let (state, store, _sync_rx) = memory_state().await;
        store.seed(sample_match(MATCH_ID, MatchState::Called)).await;

        let err = dispatch(&state, payload("checkin", "acct-a", &["left"]))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}
