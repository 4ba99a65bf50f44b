//! Resolution of (case, kind, id) references to full records

use crate::{Result, ServiceError};
use casebook_domain::{
    CaseId, Entity, Event, File, Kind, LinkableObject, ObjectId, Person, Record, RequestContext,
    TargetSet,
};
use casebook_store::{DocumentStore, ObjectStore};
use std::sync::Arc;

/// Looks up linkable records by kind; never mutates anything
#[derive(Clone)]
pub struct EntityResolver {
    events: ObjectStore<Event>,
    persons: ObjectStore<Person>,
    entities: ObjectStore<Entity>,
    files: ObjectStore<File>,
}

impl EntityResolver {
    /// Create a resolver over `store`
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            events: ObjectStore::new(Arc::clone(&store)),
            persons: ObjectStore::new(Arc::clone(&store)),
            entities: ObjectStore::new(Arc::clone(&store)),
            files: ObjectStore::new(store),
        }
    }

    /// Resolve one record, failing `NotFound` if it is not in the case
    pub async fn resolve(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        kind: Kind,
        id: ObjectId,
    ) -> Result<LinkableObject> {
        match kind {
            Kind::Event => fetch(&self.events, ctx, case_id, id).await.map(Record::into_linkable),
            Kind::Person => fetch(&self.persons, ctx, case_id, id).await.map(Record::into_linkable),
            Kind::Entity => fetch(&self.entities, ctx, case_id, id).await.map(Record::into_linkable),
            Kind::File => fetch(&self.files, ctx, case_id, id).await.map(Record::into_linkable),
        }
    }

    /// Resolve every target, kind by kind, keeping request order within a kind
    ///
    /// The first missing record aborts the whole resolution.
    pub async fn resolve_all(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        targets: &TargetSet,
    ) -> Result<Vec<LinkableObject>> {
        let mut resolved = Vec::with_capacity(targets.len());
        for (kind, id) in targets.iter() {
            resolved.push(self.resolve(ctx, case_id, kind, id).await?);
        }
        Ok(resolved)
    }
}

/// Fetch a typed record or fail `NotFound`
pub(crate) async fn fetch<T: Record>(
    store: &ObjectStore<T>,
    ctx: &RequestContext,
    case_id: CaseId,
    id: ObjectId,
) -> Result<T> {
    store
        .get(ctx, case_id, id)
        .await?
        .map(|v| v.value)
        .ok_or_else(|| missing::<T>(case_id, id))
}

pub(crate) fn missing<T: Record>(case_id: CaseId, id: ObjectId) -> ServiceError {
    ServiceError::NotFound(format!("{} {id} in case {case_id}", T::KIND))
}
