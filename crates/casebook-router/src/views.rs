//! Wire representations of links and records.
//!
//! The owner of a link goes over the wire as an untyped JSON payload next to
//! its kind; clients decode it against the record type they expect.

use casebook_domain::{Entity, Event, File, Kind, Link, LinkableObject, ObjectId, Person, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Decoding error for [`LinkView::decode_from`]
#[derive(Debug, Error)]
pub enum ViewError {
    /// The payload holds a different kind of record
    #[error("link owner is a {actual}, not a {expected}")]
    KindMismatch {
        /// Kind asked for
        expected: Kind,
        /// Kind on the wire
        actual: Kind,
    },

    /// The payload does not match the record shape
    #[error("malformed link owner: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Untyped payload of a linkable record
pub fn payload(object: &LinkableObject) -> Result<Value, serde_json::Error> {
    match object {
        LinkableObject::Event(e) => serde_json::to_value(e),
        LinkableObject::Person(p) => serde_json::to_value(p),
        LinkableObject::Entity(e) => serde_json::to_value(e),
        LinkableObject::File(f) => serde_json::to_value(f),
    }
}

/// A link as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkView {
    /// Link identifier
    pub id: ObjectId,
    /// Owning case
    pub case_id: ObjectId,
    /// Creation time (ms)
    pub created_at: u64,
    /// Last modification time (ms)
    pub updated_at: u64,
    /// Deletion time (ms), if tombstoned
    #[serde(default)]
    pub deleted_at: Option<u64>,
    /// Kind of the owner record
    pub from_kind: Kind,
    /// Owner record, undecoded
    pub from: Value,
    /// Linked events
    #[serde(default)]
    pub events: Vec<Event>,
    /// Linked persons
    #[serde(default)]
    pub persons: Vec<Person>,
    /// Linked entities
    #[serde(default)]
    pub entities: Vec<Entity>,
    /// Linked files
    #[serde(default)]
    pub files: Vec<File>,
}

impl LinkView {
    /// Convert a stored link
    pub fn from_link(link: Link) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: link.id,
            case_id: link.case_id,
            created_at: link.created_at,
            updated_at: link.updated_at,
            deleted_at: link.deleted_at,
            from_kind: link.from.kind(),
            from: payload(&link.from)?,
            events: link.events,
            persons: link.persons,
            entities: link.entities,
            files: link.files,
        })
    }

    /// Decode the owner as `T`, failing if it is another kind
    pub fn decode_from<T: Record>(&self) -> Result<T, ViewError> {
        if self.from_kind != T::KIND {
            return Err(ViewError::KindMismatch {
                expected: T::KIND,
                actual: self.from_kind,
            });
        }
        Ok(serde_json::from_value(self.from.clone())?)
    }
}
