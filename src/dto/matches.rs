//! DTO definitions for the match lifecycle operations exposed to the
//! presentation layer. None of these render UI; formatting is the caller's.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dao::models::{MatchEntity, MatchState, Slot, SyncStatus, WinnerMark},
    dto::format_system_time,
};

/// Request to record one participant's readiness.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckInRequest {
    /// Linked account of the caller.
    pub acting_identity: String,
    /// Which side the caller claims to occupy.
    pub slot: Slot,
}

/// Request to report the outcome of a match.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReportScoreRequest {
    /// Linked account of the reporting participant.
    pub acting_identity: String,
    /// Side the reporter claims won.
    pub winner_slot: Slot,
    /// Optional detailed score ("2-1"), stored for display/audit only.
    #[serde(default)]
    pub score: Option<String>,
}

/// Request to confirm or dispute a pending claim.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ConfirmationRequest {
    /// Linked account of the non-reporting participant.
    pub acting_identity: String,
    /// True to accept the claimed result, false to dispute it.
    pub accepted: bool,
    /// Free-text reason attached to the dispute record, when disputing.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Administrative request to terminate a match.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DisqualifyRequest {
    /// Side being disqualified (participants may lack a linked account,
    /// so the target is addressed by slot).
    pub player_slot: Slot,
    /// Reason recorded alongside the disqualification ("no-show").
    pub reason: String,
    /// Moderator identity, when a human issued the call.
    #[serde(default)]
    pub admin_identity: Option<String>,
}

/// Read-only view of one participant.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct PlayerSnapshot {
    /// Display name of the participant.
    pub display_name: String,
    /// Whether the participant checked in.
    pub checked_in: bool,
    /// Winner/loser marking.
    pub mark: WinnerMark,
}

/// Read-only snapshot of a match, returned so the caller can choose which UI
/// to render next.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct MatchStatusSnapshot {
    /// Match identifier.
    pub id: String,
    /// Human-readable round label.
    pub round_label: String,
    /// Current lifecycle state.
    pub state: MatchState,
    /// Propagation state towards the bracket of record.
    pub sync_status: SyncStatus,
    /// Both participants, slot one first.
    pub players: Vec<PlayerSnapshot>,
    /// Stored detailed score, if one was reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_score: Option<String>,
    /// True when the operation that produced this snapshot finalized the
    /// match immediately (loser confirmation), so the caller can skip the
    /// confirmation UI.
    pub auto_completed: bool,
    /// Last update time, RFC 3339.
    pub updated_at: String,
}

impl MatchStatusSnapshot {
    /// Build a snapshot from the persisted entity.
    pub fn from_entity(entity: &MatchEntity, auto_completed: bool) -> Self {
        Self {
            id: entity.id.clone(),
            round_label: entity.round_label.clone(),
            state: entity.state,
            sync_status: entity.sync_status,
            players: [Slot::One, Slot::Two]
                .into_iter()
                .map(|slot| {
                    let player = entity.player(slot);
                    PlayerSnapshot {
                        display_name: player.display_name.clone(),
                        checked_in: player.checked_in,
                        mark: player.mark,
                    }
                })
                .collect(),
            reported_score: entity.reported_score.clone(),
            auto_completed,
            updated_at: format_system_time(entity.updated_at),
        }
    }
}

/// Result object of every lifecycle operation:
/// `{ success, message, match_status? }`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionOutcome {
    /// Whether the operation changed (or benignly re-observed) match state.
    pub success: bool,
    /// Human-readable outcome line for the presentation layer.
    pub message: String,
    /// Fresh snapshot, when the match could be re-read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_status: Option<MatchStatusSnapshot>,
}

impl ActionOutcome {
    /// Successful outcome with a fresh snapshot.
    pub fn ok(message: impl Into<String>, status: MatchStatusSnapshot) -> Self {
        Self {
            success: true,
            message: message.into(),
            match_status: Some(status),
        }
    }
}
