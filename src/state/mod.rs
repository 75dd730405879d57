/// Match lifecycle state machine.
pub mod match_machine;

use std::sync::Arc;

use tokio::sync::{RwLock, mpsc, watch};
use tracing::warn;

use crate::{
    config::AppConfig,
    dao::match_store::MatchStore,
    error::ServiceError,
    services::sync_service::SyncJob,
};

pub use self::match_machine::{InvalidTransition, MatchEvent};

/// Shared handle to the application state.
pub type SharedState = Arc<AppState>;

/// Central application state holding the storage handle, the sync queue and
/// the runtime configuration.
///
/// Match state itself lives in the store and is guarded by conditional
/// writes, so nothing here serializes request handling.
pub struct AppState {
    match_store: RwLock<Option<Arc<dyn MatchStore>>>,
    degraded: watch::Sender<bool>,
    sync_tx: mpsc::UnboundedSender<SyncJob>,
    config: AppConfig,
}

impl AppState {
    /// Construct the shared state plus the receiving end of the sync queue,
    /// which the caller hands to the sync worker.
    ///
    /// The application starts in degraded mode until a storage backend is
    /// installed.
    pub fn new(config: AppConfig) -> (SharedState, mpsc::UnboundedReceiver<SyncJob>) {
        let (degraded_tx, _rx) = watch::channel(true);
        let (sync_tx, sync_rx) = mpsc::unbounded_channel();
        let state = Arc::new(Self {
            match_store: RwLock::new(None),
            degraded: degraded_tx,
            sync_tx,
            config,
        });
        (state, sync_rx)
    }

    /// Runtime configuration loaded at startup.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current match store, if one is installed.
    pub async fn match_store(&self) -> Option<Arc<dyn MatchStore>> {
        let guard = self.match_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the match store or fail the request with the degraded error.
    pub async fn require_match_store(&self) -> Result<Arc<dyn MatchStore>, ServiceError> {
        self.match_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a storage backend and leave degraded mode. The slot is filled
    /// before the flag flips, so a watcher waking on "not degraded" always
    /// finds a store.
    pub async fn install_match_store(&self, store: Arc<dyn MatchStore>) {
        {
            let mut guard = self.match_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current storage backend and enter degraded mode.
    pub async fn clear_match_store(&self) {
        {
            let mut guard = self.match_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update the degraded flag, broadcasting to watchers only when the
    /// value actually changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    /// Hand a finalized result to the sync worker. Fire-and-forget: the
    /// caller's reply never waits on propagation.
    pub fn enqueue_sync(&self, job: SyncJob) {
        if self.sync_tx.send(job).is_err() {
            warn!("sync worker is gone; job dropped, match stays NOT_SYNCED");
        }
    }
}
