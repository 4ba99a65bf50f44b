//! Case membership authorization

use crate::{AccessConfig, GateError};
use async_trait::async_trait;
use casebook_domain::{CaseId, RequestContext};
use casebook_store::{CaseStore, DocumentStore};
use std::sync::Arc;
use tracing::{debug, warn};

/// Authorization gate consulted before every case-scoped operation
#[async_trait]
pub trait AccessGate: Send + Sync {
    /// Whether `email` may read and modify records of `case_id`
    async fn is_allowed(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        email: &str,
    ) -> Result<bool, GateError>;
}

/// Outcome of a membership check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Caller is listed on the case
    Investigator,

    /// Caller is a configured administrator
    Administrator,

    /// Checks are disabled by configuration
    OpenAccess,

    /// Caller has no business with this case
    Denied,
}

impl AccessDecision {
    /// Whether the decision lets the caller through
    pub fn is_allowed(&self) -> bool {
        !matches!(self, AccessDecision::Denied)
    }
}

/// Gate backed by the investigator list stored on each case
pub struct CaseMembershipGate {
    cases: CaseStore,
    config: AccessConfig,
}

impl CaseMembershipGate {
    /// Create a gate reading cases from `store`
    pub fn new(store: Arc<dyn DocumentStore>, config: AccessConfig) -> Self {
        Self {
            cases: CaseStore::new(store),
            config,
        }
    }

    /// Decide access for `email` on `case_id`
    ///
    /// Fails with [`GateError::CaseNotFound`] when the case does not exist,
    /// even for administrators.
    pub async fn decide(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        email: &str,
    ) -> Result<AccessDecision, GateError> {
        let case = self
            .cases
            .get(ctx, case_id)
            .await
            .map_err(|e| GateError::Store(e.to_string()))?
            .ok_or(GateError::CaseNotFound(case_id))?;

        let decision = if self.config.open_access {
            AccessDecision::OpenAccess
        } else if case.has_investigator(email) {
            AccessDecision::Investigator
        } else if self.config.is_administrator(email) {
            AccessDecision::Administrator
        } else {
            AccessDecision::Denied
        };

        if decision.is_allowed() {
            debug!(%case_id, email, ?decision, "access granted");
        } else {
            warn!(%case_id, email, "access denied");
        }
        Ok(decision)
    }
}

#[async_trait]
impl AccessGate for CaseMembershipGate {
    async fn is_allowed(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        email: &str,
    ) -> Result<bool, GateError> {
        Ok(self.decide(ctx, case_id, email).await?.is_allowed())
    }
}
