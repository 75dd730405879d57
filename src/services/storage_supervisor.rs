//! Keeps the match store connected.
//!
//! Check-ins and reports must fail fast with a 503 rather than hang while
//! the database is away, so the supervisor installs the store as soon as it
//! can, polls its health, and pulls it back out of the shared state once
//! in-place reconnect attempts are spent.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{match_store::MatchStore, storage::StorageError},
    state::SharedState,
};

/// Pause between health pings while the store is behaving.
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
/// First delay of every backoff sequence, connect and reconnect alike.
const INITIAL_DELAY: Duration = Duration::from_secs(1);
/// Backoff ceiling.
const MAX_DELAY: Duration = Duration::from_secs(15);
/// In-place reconnect attempts before the store is dropped and the
/// supervisor goes back to connecting from scratch.
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Supervise the match store: connect, watch, reconnect, repeat.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn MatchStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                info!("match storage connected; leaving degraded mode");
                state.install_match_store(store.clone()).await;
                delay = INITIAL_DELAY;

                watch_health(&state, store.as_ref()).await;
                state.clear_match_store().await;
            }
            Err(err) => {
                warn!(error = %err, "match storage connection attempt failed");
            }
        }

        sleep(delay).await;
        delay = (delay * 2).min(MAX_DELAY);
    }
}

/// Poll the installed store until it is lost for good.
async fn watch_health(state: &SharedState, store: &dyn MatchStore) {
    loop {
        match store.health_check().await {
            Ok(()) => {
                // Covers the window where a reconnect landed between polls.
                state.update_degraded(false);
                sleep(HEALTH_POLL_INTERVAL).await;
            }
            Err(err) => {
                warn!(error = %err, "match storage health check failed");
                if !try_restore(state, store).await {
                    warn!("match storage reconnect attempts spent; dropping the store");
                    return;
                }
                sleep(HEALTH_POLL_INTERVAL).await;
            }
        }
    }
}

/// In-place reconnect with backoff. Enters degraded mode on the first
/// failure and leaves it again when a later attempt lands.
async fn try_restore(state: &SharedState, store: &dyn MatchStore) -> bool {
    let mut delay = INITIAL_DELAY;

    for attempt in 1..=MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(attempt, "match storage reconnected");
                state.update_degraded(false);
                return true;
            }
            Err(err) => {
                if attempt == 1 {
                    state.update_degraded(true);
                }
                warn!(attempt, error = %err, "match storage reconnect failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }

    false
}
