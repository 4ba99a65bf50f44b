//! Link persistence

use crate::{with_deadline, DocumentStore, StoreError, Versioned};
use casebook_domain::{CaseId, Collection, Link, Namespace, ObjectId, RequestContext};
use std::sync::Arc;
use tracing::debug;

/// Thin create/read/update/delete over link documents of a case
#[derive(Clone)]
pub struct LinkStore {
    store: Arc<dyn DocumentStore>,
}

impl LinkStore {
    /// Wrap a document store
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn namespace(case_id: CaseId) -> Namespace {
        Namespace::scoped(case_id, Collection::Links)
    }

    /// Persist a new link
    pub async fn create(&self, ctx: &RequestContext, link: &Link) -> Result<u64, StoreError> {
        let ns = Self::namespace(link.case_id);
        let body = serde_json::to_value(link)?;
        debug!(case_id = %link.case_id, link_id = %link.id, "inserting link");
        with_deadline(ctx, self.store.insert(&ns, &link.id.to_string(), body)).await
    }

    /// Fetch a link with its revision
    pub async fn get(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        id: ObjectId,
    ) -> Result<Option<Versioned<Link>>, StoreError> {
        let ns = Self::namespace(case_id);
        with_deadline(ctx, self.store.get(&ns, &id.to_string()))
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    /// Overwrite a link read at `revision`
    pub async fn replace(
        &self,
        ctx: &RequestContext,
        link: &Link,
        revision: u64,
    ) -> Result<u64, StoreError> {
        let ns = Self::namespace(link.case_id);
        let body = serde_json::to_value(link)?;
        debug!(case_id = %link.case_id, link_id = %link.id, revision, "replacing link");
        with_deadline(ctx, self.store.replace(&ns, &link.id.to_string(), body, revision)).await
    }

    /// Hard-delete a link
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        id: ObjectId,
    ) -> Result<(), StoreError> {
        let ns = Self::namespace(case_id);
        debug!(%case_id, link_id = %id, "deleting link");
        with_deadline(ctx, self.store.delete(&ns, &id.to_string(), None)).await
    }
}
