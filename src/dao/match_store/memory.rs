//! In-memory [`MatchStore`] used by the test suite and for storage-less local
//! runs. Honors the same conditional-write contract as the MongoDB backend:
//! a failed precondition yields `Ok(false)`, never a silent overwrite.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::SystemTime,
};

use futures::future::BoxFuture;

use crate::dao::{
    match_store::MatchStore,
    models::{
        DisputeEntity, MatchEntity, MatchOutcome, MatchState, ScoreUpdate, Slot, SyncStatus,
        WinnerMark,
    },
    storage::StorageResult,
};

#[derive(Default)]
struct MemoryInner {
    matches: HashMap<String, MatchEntity>,
    disputes: Vec<DisputeEntity>,
}

/// Lock-per-table store; each trait call takes the lock once, so every
/// conditional write is compare-then-write under the same critical section.
#[derive(Clone, Default)]
pub struct MemoryMatchStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryMatchStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Disputes recorded so far, ordered by insertion.
    pub fn disputes(&self) -> Vec<DisputeEntity> {
        self.inner.lock().expect("memory store poisoned").disputes.clone()
    }

    fn with_inner<T>(&self, f: impl FnOnce(&mut MemoryInner) -> T) -> T {
        let mut guard = self.inner.lock().expect("memory store poisoned");
        f(&mut guard)
    }
}

impl MatchStore for MemoryMatchStore {
    fn insert_match(&self, entity: MatchEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.with_inner(|inner| {
                inner.matches.insert(entity.id.clone(), entity);
            });
            Ok(())
        })
    }

    fn find_match(&self, id: &str) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>> {
        let store = self.clone();
        let id = id.to_owned();
        Box::pin(async move { Ok(store.with_inner(|inner| inner.matches.get(&id).cloned())) })
    }

    fn mark_checked_in(
        &self,
        id: &str,
        slot: Slot,
        at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        let id = id.to_owned();
        Box::pin(async move {
            Ok(store.with_inner(|inner| {
                let Some(entity) = inner.matches.get_mut(&id) else {
                    return false;
                };
                let player = &mut entity.players[slot.index()];
                if player.checked_in {
                    return false;
                }
                player.checked_in = true;
                player.checked_in_at = Some(at);
                entity.updated_at = at;
                true
            }))
        })
    }

    fn checked_in_count(&self, id: &str) -> BoxFuture<'static, StorageResult<Option<usize>>> {
        let store = self.clone();
        let id = id.to_owned();
        Box::pin(async move {
            Ok(store.with_inner(|inner| {
                inner.matches.get(&id).map(MatchEntity::checked_in_count)
            }))
        })
    }

    fn transition_state(
        &self,
        id: &str,
        from: Vec<MatchState>,
        to: MatchState,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        let id = id.to_owned();
        Box::pin(async move {
            Ok(store.with_inner(|inner| {
                let Some(entity) = inner.matches.get_mut(&id) else {
                    return false;
                };
                if !from.contains(&entity.state) {
                    return false;
                }
                entity.state = to;
                entity.updated_at = SystemTime::now();
                true
            }))
        })
    }

    fn apply_outcome(
        &self,
        id: &str,
        expected: Vec<MatchState>,
        expected_winner: Option<Slot>,
        outcome: MatchOutcome,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        let id = id.to_owned();
        Box::pin(async move {
            Ok(store.with_inner(|inner| {
                let Some(entity) = inner.matches.get_mut(&id) else {
                    return false;
                };
                if !expected.contains(&entity.state) {
                    return false;
                }
                if let Some(winner) = expected_winner
                    && entity.players[winner.index()].mark != WinnerMark::Winner
                {
                    return false;
                }
                entity.state = outcome.next_state;
                for (player, mark) in entity.players.iter_mut().zip(outcome.marks) {
                    player.mark = mark;
                }
                match outcome.score {
                    ScoreUpdate::Keep => {}
                    ScoreUpdate::Record(score) => entity.reported_score = Some(score),
                    ScoreUpdate::Clear => entity.reported_score = None,
                }
                entity.updated_at = SystemTime::now();
                true
            }))
        })
    }

    fn set_sync_status(
        &self,
        id: &str,
        status: SyncStatus,
        error: Option<String>,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        let id = id.to_owned();
        Box::pin(async move {
            Ok(store.with_inner(|inner| {
                let Some(entity) = inner.matches.get_mut(&id) else {
                    return false;
                };
                entity.sync_status = status;
                entity.sync_error = error;
                entity.updated_at = SystemTime::now();
                true
            }))
        })
    }

    fn insert_dispute(&self, dispute: DisputeEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.with_inner(|inner| inner.disputes.push(dispute));
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
