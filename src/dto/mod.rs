use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Chat button payload and the closed command set.
pub mod command;
/// Health check payload.
pub mod health;
/// Match lifecycle requests, snapshots and operation outcomes.
pub mod matches;
/// Identifier validation helpers.
pub mod validation;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
