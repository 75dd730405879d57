//! Abstract button payload consumed from the chat front end.
//!
//! The front end parses its own interactive-component encoding down to
//! `(prefix, match_id, extra_parts)`; this module resolves the prefix into a
//! closed set of operation kinds so dispatch is an exhaustive `match` instead
//! of a string-keyed registry.

use serde::Deserialize;
use utoipa::ToSchema;

/// Payload of a pressed chat button, already decoded by the front end.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ButtonPayload {
    /// Operation prefix ("checkin", "report", ...).
    pub prefix: String,
    /// Match the button belongs to; validated before any lookup.
    pub match_id: String,
    /// Remaining payload parts (slot, claimed winner, ...).
    #[serde(default)]
    pub extra: Vec<String>,
    /// Linked account of the user who pressed the button.
    pub acting_identity: String,
}

/// The closed set of operations a button can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Record the caller's readiness.
    CheckIn,
    /// Report an outcome (self-report or loser confirmation).
    Report,
    /// Accept the pending claim.
    Confirm,
    /// Reject the pending claim.
    Dispute,
    /// Administrative disqualification.
    Disqualify,
}

impl CommandKind {
    /// Resolve a payload prefix. `None` for prefixes this core does not own
    /// (the front end routes those elsewhere).
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "checkin" => Some(Self::CheckIn),
            "report" => Some(Self::Report),
            "confirm" => Some(Self::Confirm),
            "dispute" => Some(Self::Dispute),
            "dq" => Some(Self::Disqualify),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_prefixes_resolve() {
        assert_eq!(CommandKind::from_prefix("checkin"), Some(CommandKind::CheckIn));
        assert_eq!(CommandKind::from_prefix("report"), Some(CommandKind::Report));
        assert_eq!(CommandKind::from_prefix("confirm"), Some(CommandKind::Confirm));
        assert_eq!(CommandKind::from_prefix("dispute"), Some(CommandKind::Dispute));
        assert_eq!(CommandKind::from_prefix("dq"), Some(CommandKind::Disqualify));
    }

    #[test]
    fn unknown_prefix_is_rejected() {
        assert_eq!(CommandKind::from_prefix("registration"), None);
        assert_eq!(CommandKind::from_prefix(""), None);
    }
}
