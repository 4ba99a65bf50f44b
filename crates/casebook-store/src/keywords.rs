//! Keyword persistence
//!
//! Keyword documents are keyed by the keyword name.

use crate::{with_deadline, DocumentStore, StoreError, Versioned};
use casebook_domain::{CaseId, Collection, Keyword, Namespace, RequestContext};
use std::sync::Arc;
use tracing::debug;

/// Thin create/read/update/delete over keyword documents of a case
#[derive(Clone)]
pub struct KeywordStore {
    store: Arc<dyn DocumentStore>,
}

impl KeywordStore {
    /// Wrap a document store
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn namespace(case_id: CaseId) -> Namespace {
        Namespace::scoped(case_id, Collection::Keywords)
    }

    /// Fetch one keyword by name
    pub async fn get(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        name: &str,
    ) -> Result<Option<Versioned<Keyword>>, StoreError> {
        let ns = Self::namespace(case_id);
        with_deadline(ctx, self.store.get(&ns, name))
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    /// Fetch every keyword that exists among `names`
    pub async fn get_many(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        names: &[String],
    ) -> Result<Vec<Versioned<Keyword>>, StoreError> {
        let ns = Self::namespace(case_id);
        with_deadline(ctx, self.store.get_many(&ns, names))
            .await?
            .into_iter()
            .map(|doc| doc.decode())
            .collect()
    }

    /// Persist a keyword that does not exist yet
    pub async fn create(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        keyword: &Keyword,
    ) -> Result<u64, StoreError> {
        let ns = Self::namespace(case_id);
        let body = serde_json::to_value(keyword)?;
        debug!(%case_id, keyword = %keyword.name, "inserting keyword");
        with_deadline(ctx, self.store.insert(&ns, &keyword.name, body)).await
    }

    /// Overwrite a keyword read at `revision`
    pub async fn replace(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        keyword: &Keyword,
        revision: u64,
    ) -> Result<u64, StoreError> {
        let ns = Self::namespace(case_id);
        let body = serde_json::to_value(keyword)?;
        debug!(%case_id, keyword = %keyword.name, revision, "replacing keyword");
        with_deadline(ctx, self.store.replace(&ns, &keyword.name, body, revision)).await
    }

    /// Delete a keyword read at `revision`
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        name: &str,
        revision: u64,
    ) -> Result<(), StoreError> {
        let ns = Self::namespace(case_id);
        debug!(%case_id, keyword = %name, revision, "deleting keyword");
        with_deadline(ctx, self.store.delete(&ns, name, Some(revision))).await
    }

    /// Every keyword of a case, most recently modified first
    pub async fn list(&self, ctx: &RequestContext, case_id: CaseId) -> Result<Vec<Keyword>, StoreError> {
        let ns = Self::namespace(case_id);
        with_deadline(ctx, self.store.list(&ns))
            .await?
            .into_iter()
            .map(|doc| doc.decode().map(|v| v.value))
            .collect()
    }
}
