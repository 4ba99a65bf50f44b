//! Create, fetch and delete linkable records

use crate::access::authorize;
use crate::resolver::{fetch, missing};
use crate::retry::{with_retry, Attempt};
use crate::{EntityResolver, KeywordService, Result, RetryConfig};
use casebook_domain::{
    CaseId, Entity, Event, File, Kind, LinkableObject, ObjectId, Person, Record, RequestContext,
};
use casebook_gatekeeper::AccessGate;
use casebook_store::{DocumentStore, ObjectStore};
use std::sync::Arc;
use tracing::info;

/// Owner CRUD for events, persons, entities and files
///
/// Deleting a record first releases its keyword references, so no keyword
/// is left pointing at a record that no longer exists. The delete itself is
/// conditional on the revision left by the release; a tag added in between
/// forces another release.
#[derive(Clone)]
pub struct ObjectService {
    gate: Arc<dyn AccessGate>,
    store: Arc<dyn DocumentStore>,
    resolver: EntityResolver,
    keywords: KeywordService,
    retry: RetryConfig,
}

impl ObjectService {
    /// Create an object service sharing `keywords` for the delete cascade
    pub fn new(
        store: Arc<dyn DocumentStore>,
        gate: Arc<dyn AccessGate>,
        keywords: KeywordService,
        retry: RetryConfig,
    ) -> Self {
        Self {
            gate,
            resolver: EntityResolver::new(Arc::clone(&store)),
            store,
            keywords,
            retry,
        }
    }

    /// Persist a new record
    ///
    /// Keywords go through [`KeywordService::add_keywords`]; any tags set on
    /// `record` are dropped so reference counts stay exact.
    pub async fn create<T: Record>(&self, ctx: &RequestContext, mut record: T) -> Result<T> {
        authorize(self.gate.as_ref(), ctx, record.case_id()).await?;
        record.keywords_mut().clear();
        ObjectStore::<T>::new(Arc::clone(&self.store))
            .create(ctx, &record)
            .await?;
        info!(case_id = %record.case_id(), owner_id = %record.id(), kind = %T::KIND, "record created");
        Ok(record)
    }

    /// Fetch a record of a statically known kind
    pub async fn get<T: Record>(&self, ctx: &RequestContext, case_id: CaseId, id: ObjectId) -> Result<T> {
        authorize(self.gate.as_ref(), ctx, case_id).await?;
        fetch(&ObjectStore::<T>::new(Arc::clone(&self.store)), ctx, case_id, id).await
    }

    /// Fetch a record of any kind
    pub async fn get_linkable(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        kind: Kind,
        id: ObjectId,
    ) -> Result<LinkableObject> {
        authorize(self.gate.as_ref(), ctx, case_id).await?;
        self.resolver.resolve(ctx, case_id, kind, id).await
    }

    /// Delete a record of a statically known kind, releasing its keywords
    pub async fn delete<T: Record>(&self, ctx: &RequestContext, case_id: CaseId, id: ObjectId) -> Result<()> {
        authorize(self.gate.as_ref(), ctx, case_id).await?;
        let records = ObjectStore::<T>::new(Arc::clone(&self.store));
        let records = &records;
        let keywords = &self.keywords;

        let released = with_retry(&self.retry, &format!("{} {id}", T::KIND), || async move {
            let record = fetch(records, ctx, case_id, id).await?;
            keywords.release(ctx, &record).await?;

            let current = records
                .get(ctx, case_id, id)
                .await?
                .ok_or_else(|| missing::<T>(case_id, id))?;
            if !current.value.keywords().is_empty() {
                return Err(Attempt::Retry(format!("{} {id} was tagged during delete", T::KIND)));
            }
            records.delete(ctx, case_id, id, current.revision).await?;
            Ok::<_, Attempt>(record.keywords().len())
        })
        .await?;

        info!(%case_id, owner_id = %id, kind = %T::KIND, released, "record deleted");
        Ok(())
    }

    /// Delete a record of any kind, releasing its keywords
    pub async fn delete_kind(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        kind: Kind,
        id: ObjectId,
    ) -> Result<()> {
        match kind {
            Kind::Event => self.delete::<Event>(ctx, case_id, id).await,
            Kind::Person => self.delete::<Person>(ctx, case_id, id).await,
            Kind::Entity => self.delete::<Entity>(ctx, case_id, id).await,
            Kind::File => self.delete::<File>(ctx, case_id, id).await,
        }
    }
}
