//! Casebook Gatekeeper
//!
//! Decides whether a caller may work on a case.
//!
//! The Gatekeeper provides:
//! - The [`AccessGate`] contract every service consults first
//! - [`CaseMembershipGate`], backed by the investigator list on each case
//! - Administrator and open-access overrides via [`AccessConfig`]
//!
//! # Examples
//!
//! ```no_run
//! use casebook_gatekeeper::{AccessConfig, CaseMembershipGate};
//! use casebook_store::{DocumentStore, MemoryStore};
//! use std::sync::Arc;
//!
//! let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
//! let gate = CaseMembershipGate::new(store, AccessConfig::default());
//!
//! // Check membership before touching a case
//! // let allowed = gate.is_allowed(&ctx, case_id, "ada@example.com").await?;
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod gate;

pub use config::AccessConfig;
pub use error::GateError;
pub use gate::{AccessDecision, AccessGate, CaseMembershipGate};
