//! Kind module - the four linkable object kinds

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant for the records that can be linked and tagged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// Something that happened
    Event,

    /// An individual
    Person,

    /// An organization, location or other named thing
    Entity,

    /// Uploaded evidence
    File,
}

impl Kind {
    /// All kinds, in the order link target lists are laid out
    pub const ALL: [Kind; 4] = [Kind::Event, Kind::Person, Kind::Entity, Kind::File];

    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Event => "event",
            Kind::Person => "person",
            Kind::Entity => "entity",
            Kind::File => "file",
        }
    }

    /// Plural collection name used for storage namespaces
    pub fn collection_name(&self) -> &'static str {
        match self {
            Kind::Event => "events",
            Kind::Person => "persons",
            Kind::Entity => "entities",
            Kind::File => "files",
        }
    }

    /// Parse a kind from either its singular or plural name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "event" | "events" => Some(Kind::Event),
            "person" | "persons" => Some(Kind::Person),
            "entity" | "entities" => Some(Kind::Entity),
            "file" | "files" => Some(Kind::File),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
