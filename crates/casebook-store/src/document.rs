//! Versioned document storage contract

use crate::StoreError;
use async_trait::async_trait;
use casebook_domain::Namespace;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A stored JSON document with its revision
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Key within the namespace
    pub id: String,
    /// Store-wide write sequence number of the last write
    pub revision: u64,
    /// Document body
    pub body: Value,
}

impl Document {
    /// Decode the body into a typed value
    pub fn decode<T: DeserializeOwned>(self) -> Result<Versioned<T>, StoreError> {
        Ok(Versioned {
            value: serde_json::from_value(self.body)?,
            revision: self.revision,
        })
    }
}

/// A decoded value plus the revision it was read at
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    /// The decoded value
    pub value: T,
    /// Revision to pass back for a conditional write
    pub revision: u64,
}

/// Trait for namespaced document persistence
///
/// Every successful write stamps the document with a revision drawn from a
/// single, strictly increasing store-wide counter. Revisions serve as the
/// compare-and-swap token for [`DocumentStore::replace`] and
/// [`DocumentStore::delete`], and as the recency order of
/// [`DocumentStore::list`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document
    async fn get(&self, ns: &Namespace, id: &str) -> Result<Option<Document>, StoreError>;

    /// Fetch the documents that exist among `ids`, in `ids` order
    async fn get_many(&self, ns: &Namespace, ids: &[String]) -> Result<Vec<Document>, StoreError>;

    /// Create a document; fails with `Conflict` if the key is taken
    async fn insert(&self, ns: &Namespace, id: &str, body: Value) -> Result<u64, StoreError>;

    /// Overwrite a document read at `expected_revision`
    ///
    /// Fails with `NotFound` if the document is gone and `Conflict` if it was
    /// written since.
    async fn replace(
        &self,
        ns: &Namespace,
        id: &str,
        body: Value,
        expected_revision: u64,
    ) -> Result<u64, StoreError>;

    /// Remove a document, optionally only if still at `expected_revision`
    async fn delete(
        &self,
        ns: &Namespace,
        id: &str,
        expected_revision: Option<u64>,
    ) -> Result<(), StoreError>;

    /// All documents in a namespace, most recently written first
    async fn list(&self, ns: &Namespace) -> Result<Vec<Document>, StoreError>;
}
