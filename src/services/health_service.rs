//! Health verdict for the coordinator: overall status plus where a degraded
//! verdict comes from.

use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Ping match storage and classify the result.
///
/// "Installed but not answering" and "no backend at all" are reported
/// separately; the first means the supervisor is mid-reconnect, the second
/// that the service came up without its database.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.match_store().await {
        Some(store) => match store.health_check().await {
            Ok(()) => HealthResponse::ok(),
            Err(err) => {
                warn!(error = %err, "match storage health check failed");
                HealthResponse::storage_unreachable()
            }
        },
        None => {
            warn!("no match storage installed (degraded mode)");
            HealthResponse::degraded()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::memory_state;

    #[tokio::test]
    async fn reports_ok_with_storage_installed() {
        let (state, _store, _sync) = memory_state().await;

        let response = health_status(&state).await;

        assert_eq!(response, HealthResponse::ok());
    }

    #[tokio::test]
    async fn reports_disconnected_without_storage() {
        let (state, _store, _sync) = memory_state().await;
        state.clear_match_store().await;

        let response = health_status(&state).await;

        assert_eq!(response, HealthResponse::degraded());
        assert_eq!(response.storage, "disconnected");
    }
}
