//! Keyword module - shared, reference-counted tags

use crate::{Kind, ObjectId};
use serde::{Deserialize, Serialize};

/// A named tag shared across records of a case
///
/// Holds one reference list per [`Kind`]. A keyword whose lists are all
/// empty is orphaned and must not be persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    /// Tag name, also the storage key
    pub name: String,
    /// Persons carrying this tag
    #[serde(default)]
    pub person_ids: Vec<ObjectId>,
    /// Events carrying this tag
    #[serde(default)]
    pub event_ids: Vec<ObjectId>,
    /// Entities carrying this tag
    #[serde(default)]
    pub entity_ids: Vec<ObjectId>,
    /// Files carrying this tag
    #[serde(default)]
    pub file_ids: Vec<ObjectId>,
}

impl Keyword {
    /// Create a keyword referenced by a single owner
    pub fn for_owner(name: impl Into<String>, kind: Kind, owner: ObjectId) -> Self {
        let mut keyword = Self {
            name: name.into(),
            ..Self::default()
        };
        keyword.add_reference(kind, owner);
        keyword
    }

    /// References held for `kind`
    pub fn references(&self, kind: Kind) -> &[ObjectId] {
        match kind {
            Kind::Person => &self.person_ids,
            Kind::Event => &self.event_ids,
            Kind::Entity => &self.entity_ids,
            Kind::File => &self.file_ids,
        }
    }

    fn references_mut(&mut self, kind: Kind) -> &mut Vec<ObjectId> {
        match kind {
            Kind::Person => &mut self.person_ids,
            Kind::Event => &mut self.event_ids,
            Kind::Entity => &mut self.entity_ids,
            Kind::File => &mut self.file_ids,
        }
    }

    /// Append a reference; no duplicate check
    pub fn add_reference(&mut self, kind: Kind, owner: ObjectId) {
        self.references_mut(kind).push(owner);
    }

    /// Remove every reference to `owner` under `kind`, returning how many went
    pub fn strip_references(&mut self, kind: Kind, owner: ObjectId) -> usize {
        let refs = self.references_mut(kind);
        let before = refs.len();
        refs.retain(|id| *id != owner);
        before - refs.len()
    }

    /// Total references across all kinds
    pub fn reference_count(&self) -> usize {
        Kind::ALL.iter().map(|k| self.references(*k).len()).sum()
    }

    /// True once nothing references the keyword
    pub fn is_orphaned(&self) -> bool {
        self.reference_count() == 0
    }
}
