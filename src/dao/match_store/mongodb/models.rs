use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{
    DisputeEntity, DisputeStatus, MatchEntity, MatchPlayerEntity, MatchState, Slot, SyncStatus,
    WinnerMark,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoPlayerDocument {
    account_id: Option<String>,
    display_name: String,
    checked_in: bool,
    checked_in_at: Option<DateTime>,
    mark: WinnerMark,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMatchDocument {
    #[serde(rename = "_id")]
    pub id: String,
    round_label: String,
    pub state: MatchState,
    checkin_deadline: Option<DateTime>,
    thread_ref: Option<String>,
    external_set_ref: Option<String>,
    sync_status: SyncStatus,
    sync_error: Option<String>,
    reported_score: Option<String>,
    pub players: [MongoPlayerDocument; 2],
    created_at: DateTime,
    updated_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoDisputeDocument {
    #[serde(rename = "_id")]
    pub id: Uuid,
    match_id: String,
    raised_by: Slot,
    reason: String,
    status: DisputeStatus,
    resolver_ref: Option<String>,
    resolution_note: Option<String>,
    created_at: DateTime,
}

impl From<MatchPlayerEntity> for MongoPlayerDocument {
    fn from(value: MatchPlayerEntity) -> Self {
        Self {
            account_id: value.account_id,
            display_name: value.display_name,
            checked_in: value.checked_in,
            checked_in_at: value.checked_in_at.map(DateTime::from_system_time),
            mark: value.mark,
        }
    }
}

impl From<MongoPlayerDocument> for MatchPlayerEntity {
    fn from(value: MongoPlayerDocument) -> Self {
        Self {
            account_id: value.account_id,
            display_name: value.display_name,
            checked_in: value.checked_in,
            checked_in_at: value.checked_in_at.map(DateTime::to_system_time),
            mark: value.mark,
        }
    }
}

impl From<MatchEntity> for MongoMatchDocument {
    fn from(value: MatchEntity) -> Self {
        Self {
            id: value.id,
            round_label: value.round_label,
            state: value.state,
            checkin_deadline: value.checkin_deadline.map(DateTime::from_system_time),
            thread_ref: value.thread_ref,
            external_set_ref: value.external_set_ref,
            sync_status: value.sync_status,
            sync_error: value.sync_error,
            reported_score: value.reported_score,
            players: value.players.map(Into::into),
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<MongoMatchDocument> for MatchEntity {
    fn from(value: MongoMatchDocument) -> Self {
        Self {
            id: value.id,
            round_label: value.round_label,
            state: value.state,
            checkin_deadline: value.checkin_deadline.map(DateTime::to_system_time),
            thread_ref: value.thread_ref,
            external_set_ref: value.external_set_ref,
            sync_status: value.sync_status,
            sync_error: value.sync_error,
            reported_score: value.reported_score,
            players: value.players.map(Into::into),
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

impl From<DisputeEntity> for MongoDisputeDocument {
    fn from(value: DisputeEntity) -> Self {
        Self {
            id: value.id,
            match_id: value.match_id,
            raised_by: value.raised_by,
            reason: value.reason,
            status: value.status,
            resolver_ref: value.resolver_ref,
            resolution_note: value.resolution_note,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

/// Wire name of a match state as stored in documents, for use in conditional
/// update filters. Must stay in lockstep with the serde renames on
/// [`MatchState`]; the test below pins that.
pub(super) fn state_name(state: MatchState) -> &'static str {
    match state {
        MatchState::NotStarted => "NOT_STARTED",
        MatchState::Called => "CALLED",
        MatchState::CheckedIn => "CHECKED_IN",
        MatchState::InProgress => "IN_PROGRESS",
        MatchState::PendingConfirmation => "PENDING_CONFIRMATION",
        MatchState::Completed => "COMPLETED",
        MatchState::Disqualified => "DQ",
    }
}

/// Wire name of a winner mark, for filters and positional `$set` updates.
pub(super) fn mark_name(mark: WinnerMark) -> &'static str {
    match mark {
        WinnerMark::Unset => "unset",
        WinnerMark::Winner => "winner",
        WinnerMark::Loser => "loser",
    }
}

/// Wire name of a sync status for `$set` updates.
pub(super) fn sync_status_name(status: SyncStatus) -> &'static str {
    match status {
        SyncStatus::NotSynced => "NOT_SYNCED",
        SyncStatus::Pending => "PENDING",
        SyncStatus::Synced => "SYNCED",
        SyncStatus::Failed => "FAILED",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filter_names_match_serde_renames() {
        for state in [
            MatchState::NotStarted,
            MatchState::Called,
            MatchState::CheckedIn,
            MatchState::InProgress,
            MatchState::PendingConfirmation,
            MatchState::Completed,
            MatchState::Disqualified,
        ] {
            assert_eq!(serde_json::to_value(state).unwrap(), json!(state_name(state)));
        }
        for mark in [WinnerMark::Unset, WinnerMark::Winner, WinnerMark::Loser] {
            assert_eq!(serde_json::to_value(mark).unwrap(), json!(mark_name(mark)));
        }
        for status in [
            SyncStatus::NotSynced,
            SyncStatus::Pending,
            SyncStatus::Synced,
            SyncStatus::Failed,
        ] {
            assert_eq!(
                serde_json::to_value(status).unwrap(),
                json!(sync_status_name(status))
            );
        }
    }
}
