//! Gatekeeper error types

use casebook_domain::CaseId;
use thiserror::Error;

/// Errors that can occur while checking access
#[derive(Error, Debug)]
pub enum GateError {
    /// The case being accessed does not exist
    #[error("case {0}")]
    CaseNotFound(CaseId),

    /// Store error while loading the case
    #[error("store error: {0}")]
    Store(String),
}
