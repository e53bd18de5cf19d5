//! Error types for gaiaval-state

use thiserror::Error;

/// Errors raised while connecting to or preparing the database
#[derive(Error, Debug)]
pub enum StateError {
    /// Database connection error
    #[error("Database connection failed: {0}")]
    Connection(String),

    /// Database query error
    #[error("Database query failed: {0}")]
    Query(String),

    /// Schema setup error
    #[error("Schema setup failed: {0}")]
    SchemaSetup(String),
}

impl From<surrealdb::Error> for StateError {
    fn from(err: surrealdb::Error) -> Self {
        StateError::Query(err.to_string())
    }
}

/// Errors returned by the storage traits
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backing store rejected or failed the operation
    #[error("storage backend error: {0}")]
    Backend(String),

    /// The item source is unreachable or malformed
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    /// A record or blob that was asked for does not exist
    #[error("not found: {what}")]
    NotFound { what: String },

    /// A result with the same key was already appended
    #[error("duplicate result for {task_id} attempt {attempt_number} in session {session_id}")]
    DuplicateRecord {
        session_id: String,
        task_id: String,
        attempt_number: u32,
    },

    /// An item with this task id is already in the catalog, or twice in one batch
    #[error("duplicate benchmark item {task_id}")]
    DuplicateItem { task_id: String },

    /// Digest string is not 64 lowercase hex chars
    #[error("invalid content digest: {digest}")]
    InvalidDigest { digest: String },

    /// Key cannot be used as a storage path segment
    #[error("invalid storage key: {key}")]
    InvalidKey { key: String },

    /// Filesystem error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<surrealdb::Error> for StorageError {
    fn from(err: surrealdb::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

impl From<StateError> for StorageError {
    fn from(err: StateError) -> Self {
        StorageError::Backend(err.to_string())
    }
}
