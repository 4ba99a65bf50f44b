//! Persistence for linkable records and cases

use crate::{with_deadline, DocumentStore, StoreError, Versioned};
use casebook_domain::{Case, CaseId, Namespace, ObjectId, Record, RequestContext};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Typed access to the records of one kind
///
/// One implementation serves events, persons, entities and files; the
/// namespace follows from [`Record::KIND`].
pub struct ObjectStore<T> {
    store: Arc<dyn DocumentStore>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for ObjectStore<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _record: PhantomData,
        }
    }
}

impl<T: Record> ObjectStore<T> {
    /// Wrap a document store
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    fn namespace(case_id: CaseId) -> Namespace {
        Namespace::objects(case_id, T::KIND)
    }

    /// Fetch one record with its revision
    pub async fn get(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        id: ObjectId,
    ) -> Result<Option<Versioned<T>>, StoreError> {
        let ns = Self::namespace(case_id);
        with_deadline(ctx, self.store.get(&ns, &id.to_string()))
            .await?
            .map(|doc| doc.decode())
            .transpose()
    }

    /// Persist a new record
    pub async fn create(&self, ctx: &RequestContext, record: &T) -> Result<u64, StoreError> {
        let ns = Self::namespace(record.case_id());
        let body = serde_json::to_value(record)?;
        debug!(case_id = %record.case_id(), kind = %T::KIND, id = %record.id(), "inserting record");
        with_deadline(ctx, self.store.insert(&ns, &record.id().to_string(), body)).await
    }

    /// Overwrite a record read at `revision`
    pub async fn replace(
        &self,
        ctx: &RequestContext,
        record: &T,
        revision: u64,
    ) -> Result<u64, StoreError> {
        let ns = Self::namespace(record.case_id());
        let body = serde_json::to_value(record)?;
        debug!(case_id = %record.case_id(), kind = %T::KIND, id = %record.id(), revision, "replacing record");
        with_deadline(
            ctx,
            self.store.replace(&ns, &record.id().to_string(), body, revision),
        )
        .await
    }

    /// Hard-delete a record read at `revision`
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        id: ObjectId,
        revision: u64,
    ) -> Result<(), StoreError> {
        let ns = Self::namespace(case_id);
        debug!(%case_id, kind = %T::KIND, %id, revision, "deleting record");
        with_deadline(ctx, self.store.delete(&ns, &id.to_string(), Some(revision))).await
    }
}

/// Typed access to case records
#[derive(Clone)]
pub struct CaseStore {
    store: Arc<dyn DocumentStore>,
}

impl CaseStore {
    /// Wrap a document store
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Fetch a case
    pub async fn get(&self, ctx: &RequestContext, id: CaseId) -> Result<Option<Case>, StoreError> {
        with_deadline(ctx, self.store.get(&Namespace::cases(), &id.to_string()))
            .await?
            .map(|doc| doc.decode().map(|v| v.value))
            .transpose()
    }

    /// Persist a new case
    pub async fn create(&self, ctx: &RequestContext, case: &Case) -> Result<u64, StoreError> {
        let body = serde_json::to_value(case)?;
        debug!(case_id = %case.id, "inserting case");
        with_deadline(ctx, self.store.insert(&Namespace::cases(), &case.id.to_string(), body)).await
    }
}
