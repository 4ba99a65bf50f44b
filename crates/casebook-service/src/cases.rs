//! Case creation and case-wide keyword listing

use crate::access::authorize;
use crate::{Result, ServiceError};
use casebook_domain::{Case, CaseId, RequestContext};
use casebook_gatekeeper::AccessGate;
use casebook_store::{CaseStore, DocumentStore, KeywordStore};
use std::sync::Arc;
use tracing::info;

/// Case-level operations
#[derive(Clone)]
pub struct CaseService {
    gate: Arc<dyn AccessGate>,
    cases: CaseStore,
    keywords: KeywordStore,
}

impl CaseService {
    /// Create a case service over `store`
    pub fn new(store: Arc<dyn DocumentStore>, gate: Arc<dyn AccessGate>) -> Self {
        Self {
            gate,
            cases: CaseStore::new(Arc::clone(&store)),
            keywords: KeywordStore::new(store),
        }
    }

    /// Open a new case; the caller is always among its investigators
    pub async fn create_case(
        &self,
        ctx: &RequestContext,
        name: &str,
        investigators: Vec<String>,
    ) -> Result<Case> {
        let mut investigators: Vec<String> = investigators
            .into_iter()
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty())
            .collect();
        investigators.push(ctx.email().to_string());

        let mut case = Case::new(name.trim(), Vec::new());
        for email in investigators {
            if !case.has_investigator(&email) {
                case.investigators.push(email);
            }
        }

        self.cases.create(ctx, &case).await?;
        info!(case_id = %case.id, investigators = case.investigators.len(), "case created");
        Ok(case)
    }

    /// Fetch a case the caller may access
    pub async fn get_case(&self, ctx: &RequestContext, case_id: CaseId) -> Result<Case> {
        authorize(self.gate.as_ref(), ctx, case_id).await?;
        self.cases
            .get(ctx, case_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("case {case_id}")))
    }

    /// Keyword names in use in a case, most recently modified first
    pub async fn case_keywords(&self, ctx: &RequestContext, case_id: CaseId) -> Result<Vec<String>> {
        authorize(self.gate.as_ref(), ctx, case_id).await?;
        let keywords = self.keywords.list(ctx, case_id).await?;
        Ok(keywords.into_iter().map(|k| k.name).collect())
    }
}
