/// Client seam towards the external bracket-of-record service.
pub mod bracket_client;
/// Check-in recording and readiness detection.
pub mod checkin_service;
/// Dispatch of decoded chat-button payloads.
pub mod command_service;
/// Confirmation and dispute resolution for pending claims.
pub mod confirmation_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Administrative disqualification.
pub mod dq_service;
/// Health check service.
pub mod health_service;
/// Shared match lookup and identifier validation.
pub mod match_access;
/// Score reporting (self-report and loser confirmation).
pub mod report_service;
/// Asynchronous result propagation towards the bracket of record.
pub mod sync_service;
/// Storage connection supervisor with degraded-mode handling.
pub mod storage_supervisor;

#[cfg(test)]
pub(crate) mod testing;
