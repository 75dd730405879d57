use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

/// Result alias for MongoDB backend operations.
pub type MongoResult<T> = Result<T, MongoDaoError>;

/// Failures of the MongoDB backend, each keeping the driver error as source.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// The connection URI could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// The rejected URI.
        uri: String,
        /// Driver-level parse error.
        #[source]
        source: MongoError,
    },
    /// The client could not be built from parsed options.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        /// Driver-level construction error.
        #[source]
        source: MongoError,
    },
    /// The bootstrap ping budget was spent without an answer.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// Attempts made before giving up.
        attempts: u32,
        /// Last ping error.
        #[source]
        source: MongoError,
    },
    /// A routine health ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        /// Driver-level ping error.
        #[source]
        source: MongoError,
    },
    /// An index could not be created at connect time.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        /// Collection the index belongs to.
        collection: &'static str,
        /// Indexed field.
        index: &'static str,
        /// Driver-level error.
        #[source]
        source: MongoError,
    },
    /// A match document could not be inserted.
    #[error("failed to save match `{id}`")]
    SaveMatch {
        /// Match identifier.
        id: String,
        /// Driver-level write error.
        #[source]
        source: MongoError,
    },
    /// A match document could not be read.
    #[error("failed to load match `{id}`")]
    LoadMatch {
        /// Match identifier.
        id: String,
        /// Driver-level read error.
        #[source]
        source: MongoError,
    },
    /// A conditional match update could not be executed.
    #[error("failed to update match `{id}`")]
    UpdateMatch {
        /// Match identifier.
        id: String,
        /// Driver-level write error.
        #[source]
        source: MongoError,
    },
    /// A dispute record could not be inserted.
    #[error("failed to save dispute `{id}`")]
    SaveDispute {
        /// Dispute identifier.
        id: Uuid,
        /// Driver-level write error.
        #[source]
        source: MongoError,
    },
}
