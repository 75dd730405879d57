/// Match and dispute persistence backends behind the [`match_store::MatchStore`] trait.
pub mod match_store;
/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
