//! Shared fixtures for service integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use casebook_domain::{
    Case, Collection, Entity, EntityType, Event, File, Keyword, Kind, Namespace, ObjectId, Person,
    Principal, Record, RequestContext,
};
use casebook_gatekeeper::{AccessConfig, AccessGate, CaseMembershipGate};
use casebook_service::{RetryConfig, Services};
use casebook_store::{Document, DocumentStore, MemoryStore, StoreError};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

pub const INVESTIGATOR: &str = "ada@example.com";
pub const STRANGER: &str = "mallory@example.com";

pub fn ctx() -> RequestContext {
    RequestContext::new(Principal::new(INVESTIGATOR))
}

pub fn stranger() -> RequestContext {
    RequestContext::new(Principal::new(STRANGER))
}

/// Services over a fresh in-memory store, plus one open case
pub struct Harness {
    pub memory: Arc<MemoryStore>,
    pub services: Services,
    pub case: Case,
}

impl Harness {
    pub async fn new() -> Self {
        let memory = Arc::new(MemoryStore::new());
        let store: Arc<dyn DocumentStore> = memory.clone();
        Self::with_store(memory, store, RetryConfig::eager()).await
    }

    pub async fn with_store(
        memory: Arc<MemoryStore>,
        store: Arc<dyn DocumentStore>,
        retry: RetryConfig,
    ) -> Self {
        let gate: Arc<dyn AccessGate> = Arc::new(CaseMembershipGate::new(
            Arc::clone(&store),
            AccessConfig::default(),
        ));
        let services = Services::new(store, gate, retry);
        let case = services
            .cases
            .create_case(&ctx(), "Harbour fire", Vec::new())
            .await
            .unwrap();
        Self {
            memory,
            services,
            case,
        }
    }

    pub async fn create<T: Record>(&self, record: T) -> T {
        self.services.objects.create(&ctx(), record).await.unwrap()
    }

    pub async fn event(&self, title: &str) -> Event {
        self.create(Event::new(self.case.id, title)).await
    }

    pub async fn person(&self, name: &str) -> Person {
        self.create(Person::new(self.case.id, name)).await
    }

    pub async fn entity(&self, name: &str) -> Entity {
        self.create(Entity::new(self.case.id, name, EntityType::Organization))
            .await
    }

    pub async fn file(&self, name: &str) -> File {
        self.create(File::new(self.case.id, name, "image/png", 2048))
            .await
    }

    pub async fn link_count(&self) -> usize {
        self.memory
            .count(&Namespace::scoped(self.case.id, Collection::Links))
            .await
    }

    pub async fn keywords(&self) -> Vec<String> {
        self.services
            .cases
            .case_keywords(&ctx(), self.case.id)
            .await
            .unwrap()
    }
}

pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Which writes a [`FaultyStore`] tampers with
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Fail every replace in namespaces ending with the given collection
    FailReplace(&'static str),
    /// Report a revision conflict on the first `n` replaces
    ConflictReplaces(u32),
    /// Report a revision conflict on the first `n` replaces in the collection
    ConflictReplacesIn(&'static str, u32),
    /// Report a revision conflict on the first `n` deletes in the collection
    ConflictDeletesIn(&'static str, u32),
    /// Delete the document just before the first replace in the collection
    VanishBeforeReplace(&'static str),
    /// Tag the event with the given keyword just before its first delete
    TagEventBeforeDelete(&'static str),
}

/// Delegates to a [`MemoryStore`], injecting failures and racing writes
pub struct FaultyStore {
    inner: Arc<MemoryStore>,
    fault: Fault,
    replaces: AtomicU32,
    hits: AtomicU32,
}

impl FaultyStore {
    pub fn new(inner: Arc<MemoryStore>, fault: Fault) -> Self {
        Self {
            inner,
            fault,
            replaces: AtomicU32::new(0),
            hits: AtomicU32::new(0),
        }
    }

    pub fn replace_calls(&self) -> u32 {
        self.replaces.load(Ordering::SeqCst)
    }

    /// How many times the fault fired
    pub fn hits(&self) -> u32 {
        self.hits.load(Ordering::SeqCst)
    }

    /// Count a hit on `collection` while fewer than `limit` have fired
    fn strike(&self, ns: &Namespace, collection: &str, limit: u32) -> bool {
        if !ns.as_str().ends_with(collection) {
            return false;
        }
        self.hits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |hits| {
                (hits < limit).then_some(hits + 1)
            })
            .is_ok()
    }

    /// Write `tag` onto the event owner and its keyword document
    async fn tag_event(&self, ns: &Namespace, id: &str, tag: &str) {
        let doc = self.inner.get(ns, id).await.unwrap().unwrap();
        let mut body = doc.body;
        body["keywords"].as_array_mut().unwrap().push(json!(tag));
        self.inner.replace(ns, id, body, doc.revision).await.unwrap();

        let case_id = ObjectId::from_string(ns.as_str().split('/').nth(1).unwrap()).unwrap();
        let owner = ObjectId::from_string(id).unwrap();
        let keyword = Keyword::for_owner(tag, Kind::Event, owner);
        self.inner
            .insert(
                &Namespace::scoped(case_id, Collection::Keywords),
                tag,
                serde_json::to_value(keyword).unwrap(),
            )
            .await
            .unwrap();
    }
}

fn conflict(ns: &Namespace, id: &str) -> StoreError {
    StoreError::Conflict {
        namespace: ns.to_string(),
        id: id.to_string(),
    }
}

#[async_trait]
impl DocumentStore for FaultyStore {
    async fn get(&self, ns: &Namespace, id: &str) -> Result<Option<Document>, StoreError> {
        self.inner.get(ns, id).await
    }

    async fn get_many(&self, ns: &Namespace, ids: &[String]) -> Result<Vec<Document>, StoreError> {
        self.inner.get_many(ns, ids).await
    }

    async fn insert(&self, ns: &Namespace, id: &str, body: Value) -> Result<u64, StoreError> {
        self.inner.insert(ns, id, body).await
    }

    async fn replace(
        &self,
        ns: &Namespace,
        id: &str,
        body: Value,
        expected_revision: u64,
    ) -> Result<u64, StoreError> {
        let call = self.replaces.fetch_add(1, Ordering::SeqCst);
        match self.fault {
            Fault::FailReplace(collection) if ns.as_str().ends_with(collection) => {
                Err(StoreError::Task("disk unplugged".to_string()))
            }
            Fault::ConflictReplaces(n) if call < n => Err(conflict(ns, id)),
            Fault::ConflictReplacesIn(collection, n) if self.strike(ns, collection, n) => {
                Err(conflict(ns, id))
            }
            Fault::VanishBeforeReplace(collection) if self.strike(ns, collection, 1) => {
                self.inner.delete(ns, id, None).await?;
                self.inner.replace(ns, id, body, expected_revision).await
            }
            _ => self.inner.replace(ns, id, body, expected_revision).await,
        }
    }

    async fn delete(
        &self,
        ns: &Namespace,
        id: &str,
        expected_revision: Option<u64>,
    ) -> Result<(), StoreError> {
        match self.fault {
            Fault::ConflictDeletesIn(collection, n) if self.strike(ns, collection, n) => {
                Err(conflict(ns, id))
            }
            Fault::TagEventBeforeDelete(tag) if self.strike(ns, "/events", 1) => {
                self.tag_event(ns, id, tag).await;
                self.inner.delete(ns, id, expected_revision).await
            }
            _ => self.inner.delete(ns, id, expected_revision).await,
        }
    }

    async fn list(&self, ns: &Namespace) -> Result<Vec<Document>, StoreError> {
        self.inner.list(ns).await
    }
}
