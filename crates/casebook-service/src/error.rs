//! Error types for service operations

use casebook_gatekeeper::GateError;
use casebook_store::StoreError;
use thiserror::Error;

/// Errors surfaced to callers of the case services
///
/// Messages carry a stable classification prefix so clients can match on
/// them: a lookup of a deleted link renders as `"not found: link ..."`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The authorization gate rejected the caller
    #[error("not allowed: {0}")]
    NotAllowed(String),

    /// A case, owner, target, link or keyword is missing
    #[error("not found: {0}")]
    NotFound(String),

    /// The store failed; the underlying error text is preserved
    #[error("cannot perform operation: {0}")]
    CannotPerformOperation(String),
}

impl ServiceError {
    /// Whether this is a `NotAllowed` error
    pub fn is_not_allowed(&self) -> bool {
        matches!(self, ServiceError::NotAllowed(_))
    }

    /// Whether this is a `NotFound` error
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound(_))
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { namespace, id } => {
                ServiceError::NotFound(format!("{namespace}/{id}"))
            }
            other => ServiceError::CannotPerformOperation(other.to_string()),
        }
    }
}

impl From<GateError> for ServiceError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::CaseNotFound(_) => ServiceError::NotFound(err.to_string()),
            GateError::Store(_) => ServiceError::CannotPerformOperation(err.to_string()),
        }
    }
}

/// Result alias for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;
