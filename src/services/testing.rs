//! Shared fixtures for service tests: an app state wired to the in-memory
//! store plus a canned two-player match.

use std::{sync::Arc, time::SystemTime};

use tokio::sync::mpsc;

use crate::{
    config::AppConfig,
    dao::{
        match_store::{MatchStore, memory::MemoryMatchStore},
        models::{MatchEntity, MatchPlayerEntity, MatchState, SyncStatus},
    },
    services::sync_service::SyncJob,
    state::{AppState, SharedState},
};

/// A well-formed 16-character match identifier.
pub(crate) const MATCH_ID: &str = "aaaaaaaaaaaaaaaa";

/// App state backed by the in-memory store, plus the sync queue receiver so
/// tests can assert what was (or was not) enqueued.
pub(crate) async fn memory_state() -> (
    SharedState,
    MemoryMatchStore,
    mpsc::UnboundedReceiver<SyncJob>,
) {
    let (state, sync_rx) = AppState::new(AppConfig::default());
    let store = MemoryMatchStore::new();
    state.install_match_store(Arc::new(store.clone())).await;
    (state, store, sync_rx)
}

/// Match with players A (slot one, `acct-a`) and B (slot two, `acct-b`).
pub(crate) fn sample_match(id: &str, state: MatchState) -> MatchEntity {
    let now = SystemTime::now();
    MatchEntity {
        id: id.to_owned(),
        round_label: "Winners Round 2".into(),
        state,
        checkin_deadline: None,
        thread_ref: None,
        external_set_ref: Some("set-42".into()),
        sync_status: SyncStatus::NotSynced,
        sync_error: None,
        reported_score: None,
        players: [
            MatchPlayerEntity::new(Some("acct-a".into()), "Alva"),
            MatchPlayerEntity::new(Some("acct-b".into()), "Bren"),
        ],
        created_at: now,
        updated_at: now,
    }
}

/// Test-side conveniences over the trait methods.
pub(crate) trait StoreTestExt {
    async fn seed(&self, entity: MatchEntity);
    async fn entity(&self, id: &str) -> MatchEntity;
}

impl StoreTestExt for MemoryMatchStore {
    async fn seed(&self, entity: MatchEntity) {
        MatchStore::insert_match(self, entity).await.unwrap();
    }

    async fn entity(&self, id: &str) -> MatchEntity {
        MatchStore::find_match(self, id)
            .await
            .unwrap()
            .expect("seeded match present")
    }
}
