//! Library crate for match-desk-back, exposing modules for binaries and integration tests.

/// Runtime configuration loading.
pub mod config;
/// Persistence layer: entities, storage trait and backends.
pub mod dao;
/// Request/response types exchanged with the presentation layer.
pub mod dto;
/// Error taxonomy and HTTP mapping.
pub mod error;
/// HTTP route trees.
pub mod routes;
/// Lifecycle operations and background workers.
pub mod services;
/// Shared application state and the match state machine.
pub mod state;
