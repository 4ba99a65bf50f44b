//! Link orchestration: create (with mirrors), get, add, remove, delete

use crate::access::authorize;
use crate::retry::{with_retry, Attempt};
use crate::{EntityResolver, Result, RetryConfig, ServiceError};
use casebook_domain::{
    now_millis, CaseId, Kind, Link, LinkableObject, ObjectId, RequestContext, TargetSet,
};
use casebook_gatekeeper::AccessGate;
use casebook_store::{DocumentStore, LinkStore};
use std::sync::Arc;
use tracing::info;

/// Result of [`LinkService::create`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Linked {
    /// The requested link
    pub link: Link,
    /// One reverse link per target, empty unless bidirectional
    pub mirrors: Vec<Link>,
}

/// Manages links between records of a case
#[derive(Clone)]
pub struct LinkService {
    gate: Arc<dyn AccessGate>,
    resolver: EntityResolver,
    links: LinkStore,
    retry: RetryConfig,
}

impl LinkService {
    /// Create a link service over `store`
    pub fn new(
        store: Arc<dyn DocumentStore>,
        gate: Arc<dyn AccessGate>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            gate,
            resolver: EntityResolver::new(Arc::clone(&store)),
            links: LinkStore::new(store),
            retry,
        }
    }

    /// Link `from` to every record in `targets`
    ///
    /// The owner and all targets are resolved before anything is written, so
    /// a missing record leaves no partial link behind. With `bidirectional`
    /// set, every target also gets a fresh reverse link pointing back at
    /// `from`; existing reverse links are never reused.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        from_kind: Kind,
        from_id: ObjectId,
        targets: &TargetSet,
        bidirectional: bool,
    ) -> Result<Linked> {
        authorize(self.gate.as_ref(), ctx, case_id).await?;

        let from = self.resolver.resolve(ctx, case_id, from_kind, from_id).await?;
        let resolved = self.resolver.resolve_all(ctx, case_id, targets).await?;

        let mut link = Link::new(case_id, from.clone());
        for target in &resolved {
            link.push(target.clone());
        }
        self.links.create(ctx, &link).await?;
        info!(%case_id, link_id = %link.id, kind = %from_kind, owner_id = %from_id, targets = resolved.len(), "link created");

        let mut mirrors = Vec::new();
        if bidirectional {
            for target in resolved {
                let mirror = self.mirror(ctx, case_id, target, &from).await?;
                mirrors.push(mirror);
            }
        }

        Ok(Linked { link, mirrors })
    }

    async fn mirror(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        target: LinkableObject,
        from: &LinkableObject,
    ) -> Result<Link> {
        let mut mirror = Link::new(case_id, target);
        mirror.push(from.clone());
        self.links.create(ctx, &mirror).await?;
        info!(%case_id, link_id = %mirror.id, owner_id = %mirror.from.id(), "mirror link created");
        Ok(mirror)
    }

    /// Fetch a link; a missing or tombstoned link is `NotFound`
    pub async fn get(&self, ctx: &RequestContext, case_id: CaseId, link_id: ObjectId) -> Result<Link> {
        authorize(self.gate.as_ref(), ctx, case_id).await?;
        Ok(self.load(ctx, case_id, link_id).await?.0)
    }

    /// Append the resolved `targets` to a link
    ///
    /// No de-duplication: adding a record that is already linked yields a
    /// second entry.
    pub async fn add(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        link_id: ObjectId,
        targets: &TargetSet,
    ) -> Result<Link> {
        authorize(self.gate.as_ref(), ctx, case_id).await?;
        let resolved = self.resolver.resolve_all(ctx, case_id, targets).await?;
        let resolved = &resolved;

        let link = with_retry(&self.retry, &format!("link {link_id}"), move || async move {
            let (mut link, revision) = self.load(ctx, case_id, link_id).await?;
            for target in resolved {
                link.push(target.clone());
            }
            link.updated_at = now_millis();
            self.links.replace(ctx, &link, revision).await?;
            Ok::<_, Attempt>(link)
        })
        .await?;

        info!(%case_id, link_id = %link_id, added = resolved.len(), "link targets added");
        Ok(link)
    }

    /// Drop every target whose id is listed under its kind in `ids`
    ///
    /// Survivors keep their order; ids that are not linked are ignored.
    pub async fn remove(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        link_id: ObjectId,
        ids: &TargetSet,
    ) -> Result<Link> {
        authorize(self.gate.as_ref(), ctx, case_id).await?;

        let (link, removed) = with_retry(&self.retry, &format!("link {link_id}"), move || async move {
            let (mut link, revision) = self.load(ctx, case_id, link_id).await?;
            let removed = link.remove_ids(ids);
            link.updated_at = now_millis();
            self.links.replace(ctx, &link, revision).await?;
            Ok::<_, Attempt>((link, removed))
        })
        .await?;

        info!(%case_id, link_id = %link_id, removed, "link targets removed");
        Ok(link)
    }

    /// Hard-delete a link; deleting an absent link is `NotFound`
    pub async fn delete(&self, ctx: &RequestContext, case_id: CaseId, link_id: ObjectId) -> Result<()> {
        authorize(self.gate.as_ref(), ctx, case_id).await?;
        self.links
            .delete(ctx, case_id, link_id)
            .await
            .map_err(|err| {
                if err.is_not_found() {
                    missing_link(link_id)
                } else {
                    err.into()
                }
            })?;
        info!(%case_id, link_id = %link_id, "link deleted");
        Ok(())
    }

    async fn load(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        link_id: ObjectId,
    ) -> Result<(Link, u64)> {
        match self.links.get(ctx, case_id, link_id).await? {
            Some(v) if !v.value.is_deleted() => Ok((v.value, v.revision)),
            _ => Err(missing_link(link_id)),
        }
    }
}

fn missing_link(link_id: ObjectId) -> ServiceError {
    ServiceError::NotFound(format!("link {link_id}"))
}
