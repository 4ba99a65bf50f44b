//! Casebook Domain Layer
//!
//! Core data model for case investigations. Every record lives inside a
//! [`Case`]; investigators relate records to one another with [`Link`]s and
//! tag them with shared, reference-counted [`Keyword`]s.
//!
//! ## Key Concepts
//!
//! - **Case**: top-level investigation container, owns an investigator list
//! - **Linkable objects**: events, persons, entities and files
//! - **Link**: a `from` owner grouped with per-kind target lists
//! - **Keyword**: a tag that survives only while something references it
//!
//! ## Architecture
//!
//! This crate performs no I/O. Storage, authorization and orchestration live
//! in the `casebook-store`, `casebook-gatekeeper` and `casebook-service`
//! crates respectively.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod case;
pub mod context;
pub mod id;
pub mod keyword;
pub mod kind;
pub mod link;
pub mod namespace;
pub mod objects;
pub mod traits;

// Re-exports for convenience
pub use case::Case;
pub use context::{Principal, RequestContext};
pub use id::{CaseId, ObjectId};
pub use keyword::Keyword;
pub use kind::Kind;
pub use link::{Link, TargetSet};
pub use namespace::{Collection, Namespace};
pub use objects::{Entity, EntityType, Event, File, LinkableObject, Person};
pub use traits::Record;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
