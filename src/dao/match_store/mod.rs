pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::time::SystemTime;

use futures::future::BoxFuture;

use crate::dao::models::{DisputeEntity, MatchEntity, MatchOutcome, MatchState, Slot, SyncStatus};
use crate::dao::storage::StorageResult;

/// Abstraction over the persistence layer for matches and disputes.
///
/// Every state-mutating method is a conditional write: `Ok(false)` means the
/// precondition no longer held (zero documents matched) and the caller must
/// treat the write as a conflict, never as success.
pub trait MatchStore: Send + Sync {
    /// Create a match; the boundary used by the out-of-scope scheduler.
    fn insert_match(&self, entity: MatchEntity) -> BoxFuture<'static, StorageResult<()>>;

    /// Fetch a match with both embedded participants.
    fn find_match(&self, id: &str) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>>;

    /// Set the check-in flag and timestamp for one participant, guarded on
    /// "not already checked in". `Ok(false)` means a concurrent duplicate
    /// already landed, which check-in treats as benign.
    fn mark_checked_in(
        &self,
        id: &str,
        slot: Slot,
        at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<bool>>;

    /// Authoritative checked-in count, read *after* the caller's own write.
    /// `None` when the match does not exist.
    fn checked_in_count(&self, id: &str) -> BoxFuture<'static, StorageResult<Option<usize>>>;

    /// Compare-and-swap the match state without touching any mark.
    fn transition_state(
        &self,
        id: &str,
        from: Vec<MatchState>,
        to: MatchState,
    ) -> BoxFuture<'static, StorageResult<bool>>;

    /// Compare-and-swap a complete result write (state, both marks, stored
    /// score) in one atomic operation. `expected_winner`, when present, adds
    /// "that slot still holds the provisional winner mark" to the guard.
    fn apply_outcome(
        &self,
        id: &str,
        expected: Vec<MatchState>,
        expected_winner: Option<Slot>,
        outcome: MatchOutcome,
    ) -> BoxFuture<'static, StorageResult<bool>>;

    /// Record sync bookkeeping. Deliberately unguarded by match state: sync
    /// status keeps changing after local finalization.
    fn set_sync_status(
        &self,
        id: &str,
        status: SyncStatus,
        error: Option<String>,
    ) -> BoxFuture<'static, StorageResult<bool>>;

    /// Persist a dispute annotation record.
    fn insert_dispute(&self, dispute: DisputeEntity) -> BoxFuture<'static, StorageResult<()>>;

    /// Cheap connectivity probe used by the storage supervisor.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;

    /// Attempt to re-establish the backend connection.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
