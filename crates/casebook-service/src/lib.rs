//! Casebook Services
//!
//! Link graph and keyword reference counting on top of a non-transactional
//! document store.
//!
//! # Overview
//!
//! - [`EntityResolver`]: turns (case, kind, id) references into full records
//! - [`LinkService`]: create (optionally with reverse links), get, add,
//!   remove and delete links
//! - [`KeywordService`]: tag and untag any record, deleting keywords nobody
//!   references any more
//! - [`ObjectService`]: record CRUD; deletion releases keyword references
//! - [`CaseService`]: case creation and the case-wide keyword listing
//!
//! Every entry point consults the [`casebook_gatekeeper::AccessGate`] first.
//!
//! # Concurrency
//!
//! Read-modify-write sequences use the store revision as a compare-and-swap
//! token and retry on conflict according to [`RetryConfig`]. Sequences that
//! touch several documents are not atomic: the first failure is returned and
//! the remaining writes are abandoned.
//!
//! # Usage
//!
//! ```no_run
//! use casebook_gatekeeper::{AccessConfig, AccessGate, CaseMembershipGate};
//! use casebook_service::{RetryConfig, Services};
//! use casebook_store::{DocumentStore, MemoryStore};
//! use std::sync::Arc;
//!
//! let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
//! let gate: Arc<dyn AccessGate> =
//!     Arc::new(CaseMembershipGate::new(Arc::clone(&store), AccessConfig::default()));
//! let services = Services::new(store, gate, RetryConfig::default());
//! ```

#![warn(missing_docs)]

mod access;
mod cases;
mod config;
mod error;
mod keywords;
mod links;
mod objects;
mod resolver;
mod retry;

pub use cases::CaseService;
pub use config::RetryConfig;
pub use error::{Result, ServiceError};
pub use keywords::KeywordService;
pub use links::{LinkService, Linked};
pub use objects::ObjectService;
pub use resolver::EntityResolver;

use casebook_gatekeeper::AccessGate;
use casebook_store::DocumentStore;
use std::sync::Arc;

/// Every service wired to one store and one gate
#[derive(Clone)]
pub struct Services {
    /// Case operations
    pub cases: CaseService,
    /// Link operations
    pub links: LinkService,
    /// Keyword operations
    pub keywords: KeywordService,
    /// Record operations
    pub objects: ObjectService,
}

impl Services {
    /// Wire all services
    pub fn new(store: Arc<dyn DocumentStore>, gate: Arc<dyn AccessGate>, retry: RetryConfig) -> Self {
        let keywords = KeywordService::new(Arc::clone(&store), Arc::clone(&gate), retry.clone());
        Self {
            cases: CaseService::new(Arc::clone(&store), Arc::clone(&gate)),
            links: LinkService::new(Arc::clone(&store), Arc::clone(&gate), retry.clone()),
            objects: ObjectService::new(store, gate, keywords.clone(), retry),
            keywords,
        }
    }
}
