//! Store error types

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Document does not exist
    #[error("document not found: {namespace}/{id}")]
    NotFound {
        /// Namespace searched
        namespace: String,
        /// Document key
        id: String,
    },

    /// Document exists already, or its revision moved since it was read
    #[error("revision conflict on {namespace}/{id}")]
    Conflict {
        /// Namespace written
        namespace: String,
        /// Document key
        id: String,
    },

    /// The request deadline elapsed before the store answered
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Body could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Blocking worker failed
    #[error("store task failed: {0}")]
    Task(String),
}

impl StoreError {
    pub(crate) fn not_found(namespace: impl ToString, id: impl ToString) -> Self {
        StoreError::NotFound {
            namespace: namespace.to_string(),
            id: id.to_string(),
        }
    }

    pub(crate) fn conflict(namespace: impl ToString, id: impl ToString) -> Self {
        StoreError::Conflict {
            namespace: namespace.to_string(),
            id: id.to_string(),
        }
    }

    /// Whether the error is a compare-and-swap conflict worth retrying
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }

    /// Whether the error reports a missing document
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
