//! Client for the external bracket-of-record service.
//!
//! A single call matters to this core: report the winning side of a set. The
//! trait seam keeps the sync worker testable with a mock.

use futures::future::BoxFuture;
use serde_json::json;
use thiserror::Error;

use crate::{config::BracketConfig, dao::models::Slot};

/// Errors from a result-report attempt against the bracket service.
#[derive(Debug, Error)]
pub enum BracketError {
    /// Transport-level failure (connection refused, timeout, ...).
    #[error("bracket service request failed")]
    Request(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("bracket service rejected the report with status {status}")]
    Rejected {
        /// HTTP status returned by the service.
        status: reqwest::StatusCode,
    },
}

/// The one call the core consumes from the bracket of record.
pub trait BracketClient: Send + Sync {
    /// Report `winner` as the winning side of the set identified by
    /// `set_ref`.
    fn report_result(
        &self,
        set_ref: &str,
        winner: Slot,
    ) -> BoxFuture<'static, Result<(), BracketError>>;
}

/// HTTP implementation talking to the configured bracket endpoint.
pub struct HttpBracketClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBracketClient {
    /// Build a client from the loaded configuration.
    pub fn new(config: &BracketConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            token: config.token.clone(),
        }
    }
}

impl BracketClient for HttpBracketClient {
    fn report_result(
        &self,
        set_ref: &str,
        winner: Slot,
    ) -> BoxFuture<'static, Result<(), BracketError>> {
        let url = format!("{}/sets/{}/result", self.base_url, set_ref);
        let body = json!({
            "winner_slot": match winner {
                Slot::One => 1,
                Slot::Two => 2,
            }
        });
        let mut request = self.http.post(url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        Box::pin(async move {
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(BracketError::Rejected { status });
            }
            Ok(())
        })
    }
}
