use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use utoipa::ToSchema;
use uuid::Uuid;

/// One of the two sides of a match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// First participant row.
    One,
    /// Second participant row.
    Two,
}

impl Slot {
    /// Index of this slot inside the fixed two-player array.
    pub fn index(self) -> usize {
        match self {
            Slot::One => 0,
            Slot::Two => 1,
        }
    }

    /// The other side of the match.
    pub fn opponent(self) -> Slot {
        match self {
            Slot::One => Slot::Two,
            Slot::Two => Slot::One,
        }
    }

    /// Parse a slot from the short form used in button payloads ("1"/"2").
    pub fn parse(value: &str) -> Option<Slot> {
        match value {
            "1" | "one" => Some(Slot::One),
            "2" | "two" => Some(Slot::Two),
            _ => None,
        }
    }
}

/// Lifecycle state of a match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchState {
    /// Created by the scheduler; players not yet notified or ready.
    NotStarted,
    /// Players have been notified and asked to check in.
    Called,
    /// Both players checked in; the match can be played and reported.
    CheckedIn,
    /// Play is underway (set by the presentation layer when players start).
    InProgress,
    /// One player self-reported a win; the opponent must confirm or dispute.
    PendingConfirmation,
    /// Result accepted locally.
    Completed,
    /// Match terminated by disqualification.
    #[serde(rename = "DQ")]
    Disqualified,
}

impl MatchState {
    /// Terminal states freeze everything except the sync bookkeeping.
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchState::Completed | MatchState::Disqualified)
    }
}

/// Winner/loser marking of a single participant.
///
/// Marks are only ever written as a pair through [`MatchOutcome`], so a match
/// can never end up with one side reverted and the other not.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WinnerMark {
    /// No result claim touches this participant yet.
    Unset,
    /// Marked as the winner (provisionally while pending confirmation).
    Winner,
    /// Marked as the loser.
    Loser,
}

/// Propagation state of a locally finalized result towards the bracket of
/// record. Orthogonal to [`MatchState`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatus {
    /// No propagation attempted yet.
    NotSynced,
    /// An attempt is in flight.
    Pending,
    /// The bracket service acknowledged the result.
    Synced,
    /// Attempts exhausted; `sync_error` holds the last error text.
    Failed,
}

/// Status of a dispute annotation record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeStatus {
    /// Raised and awaiting moderator attention.
    Open,
    /// Settled by a moderator.
    Resolved,
    /// Withdrawn or superseded.
    Cancelled,
}

/// One of exactly two participants embedded in a match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchPlayerEntity {
    /// Linked chat/platform account, if the participant linked one.
    pub account_id: Option<String>,
    /// Display name shown by the presentation layer.
    pub display_name: String,
    /// Whether this participant confirmed readiness.
    pub checked_in: bool,
    /// When the participant checked in.
    pub checked_in_at: Option<SystemTime>,
    /// Winner/loser marking.
    pub mark: WinnerMark,
}

impl MatchPlayerEntity {
    /// A fresh participant row with nothing recorded yet.
    pub fn new(account_id: Option<String>, display_name: impl Into<String>) -> Self {
        Self {
            account_id,
            display_name: display_name.into(),
            checked_in: false,
            checked_in_at: None,
            mark: WinnerMark::Unset,
        }
    }
}

/// Aggregate match entity persisted by the storage layer.
///
/// Both participants are embedded, so every multi-field effect (state plus
/// both marks) is a single-document write and "exactly two rows per match"
/// holds by construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchEntity {
    /// Fixed-length token identifying the match (see `dto::validation`).
    pub id: String,
    /// Human-readable round label ("Winners Round 2").
    pub round_label: String,
    /// Current lifecycle state.
    pub state: MatchState,
    /// Deadline for check-in, when the scheduler set one.
    pub checkin_deadline: Option<SystemTime>,
    /// Discussion thread created by the presentation layer, if any.
    pub thread_ref: Option<String>,
    /// Identifier of this match inside the external bracket service.
    pub external_set_ref: Option<String>,
    /// Propagation state towards the bracket of record.
    pub sync_status: SyncStatus,
    /// Last sync error text, kept for operator remediation.
    pub sync_error: Option<String>,
    /// Detailed score payload stored for audit/display, never for logic.
    pub reported_score: Option<String>,
    /// The two participants, indexed by [`Slot`].
    pub players: [MatchPlayerEntity; 2],
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
    /// Last time the entity was updated.
    pub updated_at: SystemTime,
}

impl MatchEntity {
    /// Borrow the participant occupying `slot`.
    pub fn player(&self, slot: Slot) -> &MatchPlayerEntity {
        &self.players[slot.index()]
    }

    /// Resolve a linked account to the slot it occupies.
    pub fn slot_of_identity(&self, account_id: &str) -> Option<Slot> {
        [Slot::One, Slot::Two].into_iter().find(|slot| {
            self.player(*slot)
                .account_id
                .as_deref()
                .is_some_and(|linked| linked == account_id)
        })
    }

    /// How many participants are currently checked in.
    pub fn checked_in_count(&self) -> usize {
        self.players.iter().filter(|p| p.checked_in).count()
    }

    /// Slot holding a provisional or final winner mark, if any.
    pub fn winner_slot(&self) -> Option<Slot> {
        [Slot::One, Slot::Two]
            .into_iter()
            .find(|slot| self.player(*slot).mark == WinnerMark::Winner)
    }
}

/// How a result write treats the stored detailed score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreUpdate {
    /// Leave the stored score untouched.
    Keep,
    /// Record a new detailed score payload.
    Record(String),
    /// Clear the stored score (dispute reset).
    Clear,
}

/// A complete result write: target state plus *both* marks, applied in one
/// conditional store operation. Constructors are the only way marks are
/// produced, so they always change as a pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    /// State the match moves to when the write lands.
    pub next_state: MatchState,
    /// Marks for both participants, indexed by [`Slot`].
    pub marks: [WinnerMark; 2],
    /// Stored-score handling for this write.
    pub score: ScoreUpdate,
}

impl MatchOutcome {
    /// Accepted result: winner/loser set together, match completed.
    pub fn finalized(winner: Slot, score: ScoreUpdate) -> Self {
        let mut marks = [WinnerMark::Unset; 2];
        marks[winner.index()] = WinnerMark::Winner;
        marks[winner.opponent().index()] = WinnerMark::Loser;
        Self {
            next_state: MatchState::Completed,
            marks,
            score,
        }
    }

    /// Unverified self-report: provisional winner only, opponent untouched.
    pub fn provisional(winner: Slot, score: ScoreUpdate) -> Self {
        let mut marks = [WinnerMark::Unset; 2];
        marks[winner.index()] = WinnerMark::Winner;
        Self {
            next_state: MatchState::PendingConfirmation,
            marks,
            score,
        }
    }

    /// Dispute reset: back to checked-in with every claim field reverted.
    pub fn reset() -> Self {
        Self {
            next_state: MatchState::CheckedIn,
            marks: [WinnerMark::Unset; 2],
            score: ScoreUpdate::Clear,
        }
    }

    /// Disqualification: the targeted side loses, the opponent wins.
    pub fn disqualified(dq_slot: Slot) -> Self {
        let mut marks = [WinnerMark::Unset; 2];
        marks[dq_slot.index()] = WinnerMark::Loser;
        marks[dq_slot.opponent().index()] = WinnerMark::Winner;
        Self {
            next_state: MatchState::Disqualified,
            marks,
            score: ScoreUpdate::Keep,
        }
    }
}

/// Dispute annotation raised when an opponent rejects a claimed result.
///
/// Carries no authority over the match state machine; the reset itself is a
/// conditional match write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisputeEntity {
    /// Primary key of the dispute record.
    pub id: Uuid,
    /// Match the dispute annotates.
    pub match_id: String,
    /// Slot of the participant who raised it.
    pub raised_by: Slot,
    /// Free-text reason supplied by the participant.
    pub reason: String,
    /// Moderation status.
    pub status: DisputeStatus,
    /// Moderator who settled the dispute, when resolved.
    pub resolver_ref: Option<String>,
    /// Moderator note recorded at resolution time.
    pub resolution_note: Option<String>,
    /// When the dispute was raised.
    pub created_at: SystemTime,
}

impl DisputeEntity {
    /// A freshly opened dispute for `match_id`.
    pub fn open(match_id: impl Into<String>, raised_by: Slot, reason: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            match_id: match_id.into(),
            raised_by,
            reason: reason.into(),
            status: DisputeStatus::Open,
            resolver_ref: None,
            resolution_note: None,
            created_at: SystemTime::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalized_outcome_marks_both_sides() {
        let outcome = MatchOutcome::finalized(Slot::Two, ScoreUpdate::Keep);
        assert_eq!(outcome.marks[Slot::Two.index()], WinnerMark::Winner);
        assert_eq!(outcome.marks[Slot::One.index()], WinnerMark::Loser);
        assert_eq!(outcome.next_state, MatchState::Completed);
    }

    #[test]
    fn provisional_outcome_leaves_opponent_unset() {
        let outcome = MatchOutcome::provisional(Slot::One, ScoreUpdate::Keep);
        assert_eq!(outcome.marks[Slot::One.index()], WinnerMark::Winner);
        assert_eq!(outcome.marks[Slot::Two.index()], WinnerMark::Unset);
        assert_eq!(outcome.next_state, MatchState::PendingConfirmation);
    }

    #[test]
    fn reset_outcome_reverts_every_claim_field() {
        let outcome = MatchOutcome::reset();
        assert_eq!(outcome.marks, [WinnerMark::Unset; 2]);
        assert_eq!(outcome.next_state, MatchState::CheckedIn);
        assert_eq!(outcome.score, ScoreUpdate::Clear);
    }

    #[test]
    fn disqualified_outcome_awards_the_opponent() {
        let outcome = MatchOutcome::disqualified(Slot::One);
        assert_eq!(outcome.marks[Slot::One.index()], WinnerMark::Loser);
        assert_eq!(outcome.marks[Slot::Two.index()], WinnerMark::Winner);
        assert_eq!(outcome.next_state, MatchState::Disqualified);
    }

    #[test]
    fn slot_parse_accepts_short_and_long_forms() {
        assert_eq!(Slot::parse("1"), Some(Slot::One));
        assert_eq!(Slot::parse("two"), Some(Slot::Two));
        assert_eq!(Slot::parse("3"), None);
    }
}
