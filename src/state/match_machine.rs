use thiserror::Error;

use crate::dao::models::MatchState;

/// Events that drive a match through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEvent {
    /// Scheduler notified both players and opened check-in.
    PlayersCalled,
    /// The authoritative checked-in count reached two.
    BothCheckedIn,
    /// The presentation layer observed play starting.
    PlayStarted,
    /// A player reported the *opponent* as winner; trusted immediately.
    LoserConfirmed,
    /// A player reported *themselves* as winner; needs opponent confirmation.
    WinClaimed,
    /// The opponent accepted the pending claim.
    ClaimConfirmed,
    /// The opponent rejected the pending claim.
    ClaimDisputed,
    /// Administrative termination of the match.
    Disqualify,
}

/// Error returned when an event cannot be applied from the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// State the match was in when the invalid event arrived.
    pub from: MatchState,
    /// The event that cannot be applied from this state.
    pub event: MatchEvent,
}

/// Compute the state an event moves the match to, or reject the edge.
///
/// This is the single exhaustive description of the lifecycle; the store's
/// conditional writes enforce it against concurrent writers, this function
/// enforces it against callers.
pub fn next_state(from: MatchState, event: MatchEvent) -> Result<MatchState, InvalidTransition> {
    use MatchEvent::*;
    use MatchState::*;

    let next = match (from, event) {
        (NotStarted, PlayersCalled) => Called,
        // Both players may check in before the call message lands, so the
        // transition is accepted straight from NotStarted too.
        (NotStarted | Called, BothCheckedIn) => CheckedIn,
        (CheckedIn, PlayStarted) => InProgress,
        (CheckedIn | InProgress, LoserConfirmed) => Completed,
        (CheckedIn | InProgress, WinClaimed) => PendingConfirmation,
        (PendingConfirmation, ClaimConfirmed) => Completed,
        (PendingConfirmation, ClaimDisputed) => CheckedIn,
        (
            NotStarted | Called | CheckedIn | InProgress | PendingConfirmation,
            Disqualify,
        ) => Disqualified,
        (from, event) => return Err(InvalidTransition { from, event }),
    };

    Ok(next)
}

/// States from which a result report is accepted. A report straight from
/// CHECKED_IN is allowed; waiting for an explicit play-started signal would
/// only punish matches nobody watched.
pub const REPORTABLE_STATES: [MatchState; 2] = [MatchState::CheckedIn, MatchState::InProgress];

/// Every state a disqualification may interrupt.
pub const DQ_SOURCE_STATES: [MatchState; 5] = [
    MatchState::NotStarted,
    MatchState::Called,
    MatchState::CheckedIn,
    MatchState::InProgress,
    MatchState::PendingConfirmation,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_happy_path_with_confirmation() {
        let mut state = MatchState::NotStarted;
        for (event, expected) in [
            (MatchEvent::PlayersCalled, MatchState::Called),
            (MatchEvent::BothCheckedIn, MatchState::CheckedIn),
            (MatchEvent::PlayStarted, MatchState::InProgress),
            (MatchEvent::WinClaimed, MatchState::PendingConfirmation),
            (MatchEvent::ClaimConfirmed, MatchState::Completed),
        ] {
            state = next_state(state, event).unwrap();
            assert_eq!(state, expected);
        }
    }

    #[test]
    fn loser_confirmation_completes_without_pending_step() {
        assert_eq!(
            next_state(MatchState::CheckedIn, MatchEvent::LoserConfirmed),
            Ok(MatchState::Completed)
        );
    }

    #[test]
    fn dispute_returns_to_checked_in() {
        assert_eq!(
            next_state(MatchState::PendingConfirmation, MatchEvent::ClaimDisputed),
            Ok(MatchState::CheckedIn)
        );
        // ...and reporting is possible again from there.
        assert_eq!(
            next_state(MatchState::CheckedIn, MatchEvent::WinClaimed),
            Ok(MatchState::PendingConfirmation)
        );
    }

    #[test]
    fn disqualify_reaches_every_non_terminal_state() {
        for from in DQ_SOURCE_STATES {
            assert_eq!(
                next_state(from, MatchEvent::Disqualify),
                Ok(MatchState::Disqualified)
            );
        }
    }

    #[test]
    fn terminal_states_reject_everything() {
        for from in [MatchState::Completed, MatchState::Disqualified] {
            for event in [
                MatchEvent::PlayersCalled,
                MatchEvent::BothCheckedIn,
                MatchEvent::WinClaimed,
                MatchEvent::LoserConfirmed,
                MatchEvent::ClaimConfirmed,
                MatchEvent::ClaimDisputed,
                MatchEvent::Disqualify,
            ] {
                let err = next_state(from, event).unwrap_err();
                assert_eq!(err.from, from);
                assert_eq!(err.event, event);
            }
        }
    }

    #[test]
    fn reporting_rejected_before_check_in() {
        let err = next_state(MatchState::Called, MatchEvent::WinClaimed).unwrap_err();
        assert_eq!(err.from, MatchState::Called);
    }
}
