//! Casebook Storage Layer
//!
//! Persists cases, linkable records, links and keywords as versioned JSON
//! documents, one namespace per case and collection.
//!
//! # Architecture
//!
//! - [`DocumentStore`]: the namespaced document contract, with a store-wide
//!   revision used both for compare-and-swap writes and recency ordering
//! - [`MemoryStore`] and [`SqliteStore`]: the two backends
//! - [`LinkStore`], [`KeywordStore`], [`ObjectStore`], [`CaseStore`]: typed
//!   wrappers that run every call under the request deadline
//!
//! # Examples
//!
//! ```no_run
//! use casebook_store::{DocumentStore, SqliteStore};
//! use std::sync::Arc;
//!
//! let store: Arc<dyn DocumentStore> = Arc::new(SqliteStore::new(":memory:").unwrap());
//! // Store is now ready for document operations
//! ```

#![warn(missing_docs)]

mod deadline;
mod document;
mod error;
mod keywords;
mod links;
mod memory;
mod objects;
mod sqlite;

pub use deadline::with_deadline;
pub use document::{Document, DocumentStore, Versioned};
pub use error::StoreError;
pub use keywords::KeywordStore;
pub use links::LinkStore;
pub use memory::MemoryStore;
pub use objects::{CaseStore, ObjectStore};
pub use sqlite::SqliteStore;
