//! Reference-counted keyword tagging for any linkable record
//!
//! Each keyword document lists, per kind, the records that carry it. Adding
//! a tag appends the owner to that list (creating the keyword on first use);
//! removing strips every occurrence and deletes the keyword once nothing
//! references it. Keyword and owner writes are separate documents and are
//! not applied atomically: the first failure aborts the remaining steps.

use crate::access::authorize;
use crate::resolver::missing;
use crate::retry::{with_retry, Attempt};
use crate::{Result, RetryConfig};
use casebook_domain::{
    now_millis, CaseId, Entity, Event, File, Keyword, Kind, ObjectId, Person, Record,
    RequestContext,
};
use casebook_gatekeeper::AccessGate;
use casebook_store::{DocumentStore, KeywordStore, ObjectStore, StoreError, Versioned};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Adds and removes keywords on events, persons, entities and files
#[derive(Clone)]
pub struct KeywordService {
    gate: Arc<dyn AccessGate>,
    store: Arc<dyn DocumentStore>,
    keywords: KeywordStore,
    retry: RetryConfig,
}

impl KeywordService {
    /// Create a keyword service over `store`
    pub fn new(
        store: Arc<dyn DocumentStore>,
        gate: Arc<dyn AccessGate>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            gate,
            keywords: KeywordStore::new(Arc::clone(&store)),
            store,
            retry,
        }
    }

    /// Tag the `kind` record `owner_id` with every name in `names`
    ///
    /// Names are appended to the owner in request order, duplicates
    /// included, and each occurrence adds one reference to the keyword.
    pub async fn add_keywords(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        kind: Kind,
        owner_id: ObjectId,
        names: &[String],
    ) -> Result<bool> {
        authorize(self.gate.as_ref(), ctx, case_id).await?;
        match kind {
            Kind::Event => self.add_to::<Event>(ctx, case_id, owner_id, names).await?,
            Kind::Person => self.add_to::<Person>(ctx, case_id, owner_id, names).await?,
            Kind::Entity => self.add_to::<Entity>(ctx, case_id, owner_id, names).await?,
            Kind::File => self.add_to::<File>(ctx, case_id, owner_id, names).await?,
        }
        Ok(true)
    }

    /// Remove every occurrence of `names` from the `kind` record `owner_id`
    pub async fn remove_keywords(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        kind: Kind,
        owner_id: ObjectId,
        names: &[String],
    ) -> Result<()> {
        authorize(self.gate.as_ref(), ctx, case_id).await?;
        match kind {
            Kind::Event => self.remove_from::<Event>(ctx, case_id, owner_id, names).await,
            Kind::Person => self.remove_from::<Person>(ctx, case_id, owner_id, names).await,
            Kind::Entity => self.remove_from::<Entity>(ctx, case_id, owner_id, names).await,
            Kind::File => self.remove_from::<File>(ctx, case_id, owner_id, names).await,
        }
    }

    /// Release every keyword reference held by `owner` ahead of its deletion
    ///
    /// Callers are expected to have authorized the request already.
    pub(crate) async fn release<T: Record>(&self, ctx: &RequestContext, owner: &T) -> Result<()> {
        if owner.keywords().is_empty() {
            return Ok(());
        }
        self.remove_from::<T>(ctx, owner.case_id(), owner.id(), owner.keywords())
            .await
    }

    async fn add_to<T: Record>(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        owner_id: ObjectId,
        names: &[String],
    ) -> Result<()> {
        let owners = ObjectStore::<T>::new(Arc::clone(&self.store));
        let owner = owners
            .get(ctx, case_id, owner_id)
            .await?
            .ok_or_else(|| missing::<T>(case_id, owner_id))?;

        let names = normalize(names);
        if names.is_empty() {
            return Ok(());
        }

        let tally = tally(&names);
        let distinct: Vec<String> = tally.iter().map(|(name, _)| name.clone()).collect();
        let mut found: HashMap<String, Versioned<Keyword>> = self
            .keywords
            .get_many(ctx, case_id, &distinct)
            .await?
            .into_iter()
            .map(|v| (v.value.name.clone(), v))
            .collect();

        debug!(%case_id, owner_id = %owner_id, kind = %T::KIND, found = found.len(), requested = distinct.len(), "keyword lookup");

        for (name, count) in &tally {
            let seed = found.remove(name);
            self.reference(ctx, case_id, T::KIND, owner_id, name, *count, seed)
                .await?;
        }

        let names = &names;
        let owners = &owners;
        let mut seed = Some(owner);
        with_retry(&self.retry, &format!("{} {owner_id}", T::KIND), || {
            let current = seed.take();
            async move {
                let Versioned { mut value, revision } = match current {
                    Some(owner) => owner,
                    None => owners
                        .get(ctx, case_id, owner_id)
                        .await?
                        .ok_or_else(|| missing::<T>(case_id, owner_id))?,
                };
                value.keywords_mut().extend(names.iter().cloned());
                value.touch(now_millis());
                owners.replace(ctx, &value, revision).await?;
                Ok::<_, Attempt>(())
            }
        })
        .await?;

        info!(%case_id, owner_id = %owner_id, kind = %T::KIND, added = names.len(), "keywords added");
        Ok(())
    }

    /// Add `count` references from `owner_id` to keyword `name`
    ///
    /// `seed` is the batch-fetched state for the first attempt; later
    /// attempts re-read the keyword.
    #[allow(clippy::too_many_arguments)]
    async fn reference(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        kind: Kind,
        owner_id: ObjectId,
        name: &str,
        count: usize,
        seed: Option<Versioned<Keyword>>,
    ) -> Result<()> {
        let mut seed = Some(seed);
        with_retry(&self.retry, &format!("keyword {name}"), || {
            let known = seed.take();
            async move {
                let current = match known {
                    Some(current) => current,
                    None => self.keywords.get(ctx, case_id, name).await?,
                };
                match current {
                    Some(Versioned { mut value, revision }) => {
                        for _ in 0..count {
                            value.add_reference(kind, owner_id);
                        }
                        self.keywords
                            .replace(ctx, case_id, &value, revision)
                            .await
                            .map_err(retry_if_vanished)?;
                    }
                    None => {
                        let mut keyword = Keyword::for_owner(name, kind, owner_id);
                        for _ in 1..count {
                            keyword.add_reference(kind, owner_id);
                        }
                        self.keywords.create(ctx, case_id, &keyword).await?;
                    }
                }
                Ok::<_, Attempt>(())
            }
        })
        .await
    }

    async fn remove_from<T: Record>(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        owner_id: ObjectId,
        names: &[String],
    ) -> Result<()> {
        let owners = ObjectStore::<T>::new(Arc::clone(&self.store));
        let owner = owners
            .get(ctx, case_id, owner_id)
            .await?
            .ok_or_else(|| missing::<T>(case_id, owner_id))?;

        let removal: Vec<String> = tally(&normalize(names))
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        if removal.is_empty() {
            return Ok(());
        }

        let found = self.keywords.get_many(ctx, case_id, &removal).await?;
        let mut deleted = 0;
        for keyword in found {
            if self.unreference(ctx, case_id, T::KIND, owner_id, keyword).await? {
                deleted += 1;
            }
        }

        let removal_set: HashSet<&str> = removal.iter().map(String::as_str).collect();
        let removal_set = &removal_set;
        let owners = &owners;
        let mut seed = Some(owner);
        with_retry(&self.retry, &format!("{} {owner_id}", T::KIND), || {
            let current = seed.take();
            async move {
                let Versioned { mut value, revision } = match current {
                    Some(owner) => owner,
                    None => owners
                        .get(ctx, case_id, owner_id)
                        .await?
                        .ok_or_else(|| missing::<T>(case_id, owner_id))?,
                };
                value
                    .keywords_mut()
                    .retain(|name| !removal_set.contains(name.as_str()));
                value.touch(now_millis());
                owners.replace(ctx, &value, revision).await?;
                Ok::<_, Attempt>(())
            }
        })
        .await?;

        info!(%case_id, owner_id = %owner_id, kind = %T::KIND, removed = removal.len(), deleted, "keywords removed");
        Ok(())
    }

    /// Strip `owner_id` from a keyword, deleting it once unreferenced
    ///
    /// Returns whether the keyword was deleted.
    async fn unreference(
        &self,
        ctx: &RequestContext,
        case_id: CaseId,
        kind: Kind,
        owner_id: ObjectId,
        keyword: Versioned<Keyword>,
    ) -> Result<bool> {
        let name = keyword.value.name.clone();
        let name = name.as_str();
        let mut seed = Some(Some(keyword));
        with_retry(&self.retry, &format!("keyword {name}"), || {
            let known = seed.take();
            async move {
                let current = match known {
                    Some(current) => current,
                    None => self.keywords.get(ctx, case_id, name).await?,
                };
                let Some(Versioned { mut value, revision }) = current else {
                    return Ok::<_, Attempt>(false);
                };
                value.strip_references(kind, owner_id);
                let written = if value.is_orphaned() {
                    self.keywords.delete(ctx, case_id, name, revision).await
                } else {
                    self.keywords
                        .replace(ctx, case_id, &value, revision)
                        .await
                        .map(|_| ())
                };
                match written {
                    Ok(()) => Ok(value.is_orphaned()),
                    Err(err) if err.is_not_found() => Ok(false),
                    Err(err) => Err(Attempt::from(err)),
                }
            }
        })
        .await
    }
}

/// Trim names and drop empty ones
fn normalize(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Distinct names in first-seen order, with how often each occurs
fn tally(names: &[String]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for name in names {
        match counts.iter_mut().find(|(seen, _)| seen == name) {
            Some((_, count)) => *count += 1,
            None => counts.push((name.clone(), 1)),
        }
    }
    counts
}

/// A keyword deleted between read and write is re-read and recreated
fn retry_if_vanished(err: StoreError) -> Attempt {
    if err.is_not_found() {
        Attempt::Retry(err.to_string())
    } else {
        Attempt::from(err)
    }
}
