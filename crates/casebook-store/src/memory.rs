//! In-memory document store
//!
//! Backs tests and ephemeral deployments. All collections sit behind one
//! `tokio::sync::RwLock` so each call observes and bumps the revision
//! counter atomically.

use crate::{Document, DocumentStore, StoreError};
use async_trait::async_trait;
use casebook_domain::Namespace;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct MemoryInner {
    collections: HashMap<Namespace, HashMap<String, Document>>,
    revision: u64,
}

impl MemoryInner {
    fn next_revision(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }
}

/// In-memory implementation of [`DocumentStore`]
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a namespace
    pub async fn count(&self, ns: &Namespace) -> usize {
        self.inner
            .read()
            .await
            .collections
            .get(ns)
            .map_or(0, HashMap::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, ns: &Namespace, id: &str) -> Result<Option<Document>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.collections.get(ns).and_then(|c| c.get(id)).cloned())
    }

    async fn get_many(&self, ns: &Namespace, ids: &[String]) -> Result<Vec<Document>, StoreError> {
        let inner = self.inner.read().await;
        let Some(collection) = inner.collections.get(ns) else {
            return Ok(Vec::new());
        };
        Ok(ids.iter().filter_map(|id| collection.get(id).cloned()).collect())
    }

    async fn insert(&self, ns: &Namespace, id: &str, body: Value) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let exists = inner
            .collections
            .get(ns)
            .is_some_and(|c| c.contains_key(id));
        if exists {
            return Err(StoreError::conflict(ns, id));
        }

        let revision = inner.next_revision();
        inner.collections.entry(ns.clone()).or_default().insert(
            id.to_string(),
            Document {
                id: id.to_string(),
                revision,
                body,
            },
        );
        Ok(revision)
    }

    async fn replace(
        &self,
        ns: &Namespace,
        id: &str,
        body: Value,
        expected_revision: u64,
    ) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let current = inner
            .collections
            .get(ns)
            .and_then(|c| c.get(id))
            .map(|d| d.revision)
            .ok_or_else(|| StoreError::not_found(ns, id))?;
        if current != expected_revision {
            return Err(StoreError::conflict(ns, id));
        }

        let revision = inner.next_revision();
        if let Some(doc) = inner.collections.get_mut(ns).and_then(|c| c.get_mut(id)) {
            doc.revision = revision;
            doc.body = body;
        }
        Ok(revision)
    }

    async fn delete(
        &self,
        ns: &Namespace,
        id: &str,
        expected_revision: Option<u64>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let collection = inner
            .collections
            .get_mut(ns)
            .ok_or_else(|| StoreError::not_found(ns, id))?;
        let current = collection
            .get(id)
            .map(|d| d.revision)
            .ok_or_else(|| StoreError::not_found(ns, id))?;
        if expected_revision.is_some_and(|r| r != current) {
            return Err(StoreError::conflict(ns, id));
        }
        collection.remove(id);
        Ok(())
    }

    async fn list(&self, ns: &Namespace) -> Result<Vec<Document>, StoreError> {
        let inner = self.inner.read().await;
        let mut docs: Vec<Document> = inner
            .collections
            .get(ns)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default();
        docs.sort_by(|a, b| b.revision.cmp(&a.revision));
        Ok(docs)
    }
}
