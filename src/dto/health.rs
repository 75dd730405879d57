use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/healthcheck` route.
///
/// `status` is the overall verdict; `storage` narrows down where a degraded
/// verdict comes from, since the coordinator keeps serving conflict-safe
/// errors while the match database is away.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct HealthResponse {
    /// Overall verdict ("ok" or "degraded").
    pub status: String,
    /// Match storage detail ("connected", "unreachable" or "disconnected").
    pub storage: String,
}

impl HealthResponse {
    /// Storage installed and answering pings.
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            storage: "connected".to_string(),
        }
    }

    /// Storage installed but the latest ping failed; the supervisor is
    /// already reconnecting.
    pub fn storage_unreachable() -> Self {
        Self {
            status: "degraded".to_string(),
            storage: "unreachable".to_string(),
        }
    }

    /// No storage backend installed at all.
    pub fn degraded() -> Self {
        Self {
            status: "degraded".to_string(),
            storage: "disconnected".to_string(),
        }
    }
}
