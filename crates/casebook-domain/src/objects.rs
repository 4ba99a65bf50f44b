//! Linkable records: events, persons, entities and files

use crate::{now_millis, CaseId, Kind, ObjectId, Record};
use serde::{Deserialize, Serialize};

/// Something that happened during the investigated timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier
    pub id: ObjectId,
    /// Owning case
    pub case_id: CaseId,
    /// Short title
    pub title: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// When the event occurred (ms since epoch), if known
    #[serde(default)]
    pub occurred_at: Option<u64>,
    /// Tag names in insertion order
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Creation time
    pub created_at: u64,
    /// Last modification time
    pub updated_at: u64,
}

impl Event {
    /// Create a new event in a case
    pub fn new(case_id: CaseId, title: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id: ObjectId::new(),
            case_id,
            title: title.into(),
            description: String::new(),
            occurred_at: None,
            keywords: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// An individual involved in a case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Unique identifier
    pub id: ObjectId,
    /// Owning case
    pub case_id: CaseId,
    /// Full name
    pub name: String,
    /// Role in the case (witness, suspect, ...)
    #[serde(default)]
    pub role: String,
    /// Investigator notes
    #[serde(default)]
    pub notes: String,
    /// Tag names in insertion order
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Creation time
    pub created_at: u64,
    /// Last modification time
    pub updated_at: u64,
}

impl Person {
    /// Create a new person in a case
    pub fn new(case_id: CaseId, name: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id: ObjectId::new(),
            case_id,
            name: name.into(),
            role: String::new(),
            notes: String::new(),
            keywords: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// What an [`Entity`] represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// Company, agency, group
    Organization,
    /// Address or place
    Location,
    /// Anything else
    #[default]
    Other,
}

/// An organization, location or other named thing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier
    pub id: ObjectId,
    /// Owning case
    pub case_id: CaseId,
    /// Display name
    pub name: String,
    /// Organization, location, ...
    #[serde(default)]
    pub entity_type: EntityType,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Tag names in insertion order
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Creation time
    pub created_at: u64,
    /// Last modification time
    pub updated_at: u64,
}

impl Entity {
    /// Create a new entity in a case
    pub fn new(case_id: CaseId, name: impl Into<String>, entity_type: EntityType) -> Self {
        let now = now_millis();
        Self {
            id: ObjectId::new(),
            case_id,
            name: name.into(),
            entity_type,
            description: String::new(),
            keywords: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Metadata for a piece of uploaded evidence
///
/// File contents live in external blob storage; only the descriptor is kept
/// here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    /// Unique identifier
    pub id: ObjectId,
    /// Owning case
    pub case_id: CaseId,
    /// Original file name
    pub name: String,
    /// MIME type
    #[serde(default)]
    pub content_type: String,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
    /// Tag names in insertion order
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Creation time
    pub created_at: u64,
    /// Last modification time
    pub updated_at: u64,
}

impl File {
    /// Create a new file descriptor in a case
    pub fn new(case_id: CaseId, name: impl Into<String>, content_type: impl Into<String>, size: u64) -> Self {
        let now = now_millis();
        Self {
            id: ObjectId::new(),
            case_id,
            name: name.into(),
            content_type: content_type.into(),
            size,
            keywords: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

macro_rules! impl_record {
    ($ty:ident, $kind:expr) => {
        impl Record for $ty {
            const KIND: Kind = $kind;

            fn id(&self) -> ObjectId {
                self.id
            }

            fn case_id(&self) -> CaseId {
                self.case_id
            }

            fn keywords(&self) -> &[String] {
                &self.keywords
            }

            fn keywords_mut(&mut self) -> &mut Vec<String> {
                &mut self.keywords
            }

            fn touch(&mut self, now: u64) {
                self.updated_at = now;
            }

            fn into_linkable(self) -> LinkableObject {
                LinkableObject::$ty(self)
            }
        }
    };
}

impl_record!(Event, Kind::Event);
impl_record!(Person, Kind::Person);
impl_record!(Entity, Kind::Entity);
impl_record!(File, Kind::File);

/// Any record that can take part in a link, fully resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "object", rename_all = "snake_case")]
pub enum LinkableObject {
    /// An event
    Event(Event),
    /// A person
    Person(Person),
    /// An entity
    Entity(Entity),
    /// A file
    File(File),
}

impl LinkableObject {
    /// Which kind of record is wrapped
    pub fn kind(&self) -> Kind {
        match self {
            LinkableObject::Event(_) => Kind::Event,
            LinkableObject::Person(_) => Kind::Person,
            LinkableObject::Entity(_) => Kind::Entity,
            LinkableObject::File(_) => Kind::File,
        }
    }

    /// Identifier of the wrapped record
    pub fn id(&self) -> ObjectId {
        match self {
            LinkableObject::Event(e) => e.id,
            LinkableObject::Person(p) => p.id,
            LinkableObject::Entity(e) => e.id,
            LinkableObject::File(f) => f.id,
        }
    }

    /// Tag names of the wrapped record
    pub fn keywords(&self) -> &[String] {
        match self {
            LinkableObject::Event(e) => &e.keywords,
            LinkableObject::Person(p) => &p.keywords,
            LinkableObject::Entity(e) => &e.keywords,
            LinkableObject::File(f) => &f.keywords,
        }
    }
}
