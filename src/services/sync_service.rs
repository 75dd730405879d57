//! Asynchronous propagation of finalized results to the external bracket.
//!
//! Finalization enqueues a [`SyncJob`] and returns immediately; the worker
//! owns all retries and records the terminal SYNCED or FAILED status on the
//! match. Local completion is never blocked or rolled back by sync failures.

use std::{sync::Arc, time::Duration};

use rand::Rng;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::{
    dao::{
        match_store::MatchStore,
        models::{Slot, SyncStatus},
    },
    services::bracket_client::BracketClient,
    state::SharedState,
};

/// One result to propagate, captured at finalization time.
#[derive(Debug)]
pub struct SyncJob {
    /// Match the result belongs to.
    pub match_id: String,
    /// Winning side as finalized locally.
    pub winner: Slot,
    /// External set reference, when the match carries one.
    pub set_ref: Option<String>,
}

/// Consume the sync queue until every sender is dropped.
pub async fn run(
    state: SharedState,
    mut jobs: mpsc::UnboundedReceiver<SyncJob>,
    client: Arc<dyn BracketClient>,
) {
    info!("sync worker started");
    while let Some(job) = jobs.recv().await {
        process_job(&state, client.as_ref(), job).await;
    }
    info!("sync queue closed; sync worker exiting");
}

/// Handle a single job end to end: mark PENDING, attempt with backoff, then
/// record the terminal status.
pub(crate) async fn process_job(state: &SharedState, client: &dyn BracketClient, job: SyncJob) {
    let Some(store) = acquire_store(state).await else {
        warn!(
            match_id = %job.match_id,
            "degraded channel closed; sync job dropped, match stays NOT_SYNCED"
        );
        return;
    };

    let Some(set_ref) = job.set_ref else {
        warn!(match_id = %job.match_id, "match has no external set reference");
        record_status(
            store.as_ref(),
            &job.match_id,
            SyncStatus::Failed,
            Some("match has no external set reference".to_owned()),
        )
        .await;
        return;
    };

    record_status(store.as_ref(), &job.match_id, SyncStatus::Pending, None).await;

    let retry = &state.config().sync;
    let mut delay = retry.initial_delay;
    let mut last_error = String::new();
    for attempt in 1..=retry.max_attempts {
        match client.report_result(&set_ref, job.winner).await {
            Ok(()) => {
                info!(match_id = %job.match_id, set_ref = %set_ref, attempt, "result synced");
                record_status(store.as_ref(), &job.match_id, SyncStatus::Synced, None).await;
                return;
            }
            Err(err) => {
                warn!(
                    match_id = %job.match_id,
                    set_ref = %set_ref,
                    attempt,
                    error = %err,
                    "result sync attempt failed"
                );
                last_error = err.to_string();
            }
        }

        if attempt < retry.max_attempts {
            tokio::time::sleep(with_jitter(delay)).await;
            delay = (delay * 2).min(retry.max_delay);
        }
    }

    warn!(
        match_id = %job.match_id,
        set_ref = %set_ref,
        attempts = retry.max_attempts,
        "result sync exhausted retries"
    );
    record_status(
        store.as_ref(),
        &job.match_id,
        SyncStatus::Failed,
        Some(last_error),
    )
    .await;
}

/// Storage handle for the job at hand. During a degraded window the worker
/// parks on the degraded watch channel rather than dropping results on the
/// floor; the queue holds the backlog.
async fn acquire_store(state: &SharedState) -> Option<Arc<dyn MatchStore>> {
    loop {
        if let Some(store) = state.match_store().await {
            return Some(store);
        }
        info!("match storage degraded; sync job parked until reconnection");
        let mut watcher = state.degraded_watcher();
        watcher.wait_for(|degraded| !degraded).await.ok()?;
    }
}

/// Spread retries out so simultaneous finalizations do not hammer the
/// bracket service in lockstep.
fn with_jitter(delay: Duration) -> Duration {
    let base = delay.as_millis() as u64;
    let jitter = rand::rng().random_range(0..=base / 2);
    Duration::from_millis(base + jitter)
}

async fn record_status(
    store: &dyn MatchStore,
    match_id: &str,
    status: SyncStatus,
    error: Option<String>,
) {
    match store.set_sync_status(match_id, status, error).await {
        Ok(true) => {}
        Ok(false) => warn!(match_id, "match vanished while recording sync status"),
        Err(err) => warn!(match_id, error = %err, "failed to record sync status"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    use futures::future::BoxFuture;

    use super::*;
    use crate::{
        config::{AppConfig, SyncRetryConfig},
        dao::{match_store::memory::MemoryMatchStore, models::MatchState},
        services::{
            bracket_client::{BracketError, BracketClient},
            testing::{MATCH_ID, StoreTestExt, sample_match},
        },
        state::AppState,
    };

    /// Succeeds once `failures` attempts have been burned through.
    struct FlakyClient {
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakyClient {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl BracketClient for FlakyClient {
        fn report_result(
            &self,
            _set_ref: &str,
            _winner: Slot,
        ) -> BoxFuture<'static, Result<(), BracketError>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let outcome = if call < self.failures {
                Err(BracketError::Rejected {
                    status: reqwest::StatusCode::BAD_GATEWAY,
                })
            } else {
                Ok(())
            };
            Box::pin(async move { outcome })
        }
    }

    async fn fast_state() -> (crate::state::SharedState, MemoryMatchStore) {
        let config = AppConfig {
            sync: SyncRetryConfig {
                max_attempts: 3,
                initial_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(5),
            },
            ..AppConfig::default()
        };
        let (state, _sync_rx) = AppState::new(config);
        let store = MemoryMatchStore::new();
        state.install_match_store(Arc::new(store.clone())).await;
        (state, store)
    }

    fn job(set_ref: Option<&str>) -> SyncJob {
        SyncJob {
            match_id: MATCH_ID.to_owned(),
            winner: Slot::One,
            set_ref: set_ref.map(str::to_owned),
        }
    }

    #[tokio::test]
    async fn first_attempt_success_records_synced() {
        let (state, store) = fast_state().await;
        store.seed(sample_match(MATCH_ID, MatchState::Completed)).await;
        let client = FlakyClient::new(0);

        process_job(&state, &client, job(Some("set-42"))).await;

        let entity = store.entity(MATCH_ID).await;
        assert_eq!(entity.sync_status, SyncStatus::Synced);
        assert_eq!(entity.sync_error, None);
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn transient_failures_are_retried_until_success() {
        let (state, store) = fast_state().await;
        store.seed(sample_match(MATCH_ID, MatchState::Completed)).await;
        let client = FlakyClient::new(2);

        process_job(&state, &client, job(Some("set-42"))).await;

        let entity = store.entity(MATCH_ID).await;
        assert_eq!(entity.sync_status, SyncStatus::Synced);
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_record_failed_with_last_error() {
        let (state, store) = fast_state().await;
        store.seed(sample_match(MATCH_ID, MatchState::Completed)).await;
        let client = FlakyClient::new(u32::MAX);

        process_job(&state, &client, job(Some("set-42"))).await;

        let entity = store.entity(MATCH_ID).await;
        assert_eq!(entity.sync_status, SyncStatus::Failed);
        assert!(entity.sync_error.is_some_and(|e| e.contains("502")));
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn job_parks_during_degraded_window_and_resumes() {
        let (state, store) = fast_state().await;
        store.seed(sample_match(MATCH_ID, MatchState::Completed)).await;
        state.clear_match_store().await;
        let client = Arc::new(FlakyClient::new(0));

        let worker = {
            let state = state.clone();
            let client = client.clone();
            tokio::spawn(async move {
                process_job(&state, client.as_ref(), job(Some("set-42"))).await;
            })
        };

        // Give the job time to park on the degraded watcher.
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(!worker.is_finished());

        state.install_match_store(Arc::new(store.clone())).await;
        worker.await.unwrap();

        let entity = store.entity(MATCH_ID).await;
        assert_eq!(entity.sync_status, SyncStatus::Synced);
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn missing_set_ref_fails_without_calling_the_bracket() {
        let (state, store) = fast_state().await;
        store.seed(sample_match(MATCH_ID, MatchState::Completed)).await;
        let client = FlakyClient::new(0);

        process_job(&state, &client, job(None)).await;

        let entity = store.entity(MATCH_ID).await;
        assert_eq!(entity.sync_status, SyncStatus::Failed);
        assert!(
            entity
                .sync_error
                .is_some_and(|e| e.contains("no external set reference"))
        );
        assert_eq!(client.call_count(), 0);
    }
}
