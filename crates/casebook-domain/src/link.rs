//! Link module - directed many-to-many relationships between records

use crate::{now_millis, CaseId, Entity, Event, File, Kind, LinkableObject, ObjectId, Person};
use serde::{Deserialize, Serialize};

/// Per-kind lists of record identifiers, as carried by link requests
///
/// Order within each list is request order and duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSet {
    /// Event identifiers
    #[serde(default)]
    pub events: Vec<ObjectId>,
    /// Person identifiers
    #[serde(default)]
    pub persons: Vec<ObjectId>,
    /// Entity identifiers
    #[serde(default)]
    pub entities: Vec<ObjectId>,
    /// File identifiers
    #[serde(default)]
    pub files: Vec<ObjectId>,
}

impl TargetSet {
    /// Create an empty target set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append
    pub fn with(mut self, kind: Kind, id: ObjectId) -> Self {
        self.push(kind, id);
        self
    }

    /// Append an identifier to the list for `kind`
    pub fn push(&mut self, kind: Kind, id: ObjectId) {
        self.ids_mut(kind).push(id);
    }

    /// Identifiers requested for `kind`
    pub fn ids(&self, kind: Kind) -> &[ObjectId] {
        match kind {
            Kind::Event => &self.events,
            Kind::Person => &self.persons,
            Kind::Entity => &self.entities,
            Kind::File => &self.files,
        }
    }

    fn ids_mut(&mut self, kind: Kind) -> &mut Vec<ObjectId> {
        match kind {
            Kind::Event => &mut self.events,
            Kind::Person => &mut self.persons,
            Kind::Entity => &mut self.entities,
            Kind::File => &mut self.files,
        }
    }

    /// Total number of identifiers across all kinds
    pub fn len(&self) -> usize {
        Kind::ALL.iter().map(|k| self.ids(*k).len()).sum()
    }

    /// True when no identifiers were requested
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every `(kind, id)` pair, kinds in [`Kind::ALL`] order, ids in request order
    pub fn iter(&self) -> impl Iterator<Item = (Kind, ObjectId)> + '_ {
        Kind::ALL
            .into_iter()
            .flat_map(move |kind| self.ids(kind).iter().map(move |id| (kind, *id)))
    }
}

/// A directed record grouping a `from` owner with the records it links to
///
/// Targets are stored fully resolved. Lists are multisets: adding the same
/// record twice yields two entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Unique identifier
    pub id: ObjectId,
    /// Owning case
    pub case_id: CaseId,
    /// Creation time
    pub created_at: u64,
    /// Last modification time
    pub updated_at: u64,
    /// Deletion time, if the record was tombstoned
    #[serde(default)]
    pub deleted_at: Option<u64>,
    /// The single owner of this link
    pub from: LinkableObject,
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

impl Link {
    /// Create an empty link owned by `from`
    pub fn new(case_id: CaseId, from: LinkableObject) -> Self {
        let now = now_millis();
        Self {
            id: ObjectId::new(),
            case_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            from,
            events: Vec::new(),
            persons: Vec::new(),
            entities: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Append a resolved record to the list matching its kind
    pub fn push(&mut self, target: LinkableObject) {
        match target {
            LinkableObject::Event(e) => self.events.push(e),
            LinkableObject::Person(p) => self.persons.push(p),
            LinkableObject::Entity(e) => self.entities.push(e),
            LinkableObject::File(f) => self.files.push(f),
        }
    }

    /// Drop every target whose id appears in `ids` under the same kind
    ///
    /// Survivors keep their relative order. Returns how many entries were
    /// removed.
    pub fn remove_ids(&mut self, ids: &TargetSet) -> usize {
        let before = self.target_count();
        self.events.retain(|e| !ids.events.contains(&e.id));
        self.persons.retain(|p| !ids.persons.contains(&p.id));
        self.entities.retain(|e| !ids.entities.contains(&e.id));
        self.files.retain(|f| !ids.files.contains(&f.id));
        before - self.target_count()
    }

    /// Total number of linked records
    pub fn target_count(&self) -> usize {
        self.events.len() + self.persons.len() + self.entities.len() + self.files.len()
    }

    /// Whether the record carries a deletion tombstone
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Record;

    fn case() -> CaseId {
        ObjectId::from_value(42)
    }

    #[test]
    fn test_target_set_iter_order() {
        let e1 = ObjectId::from_value(1);
        let p1 = ObjectId::from_value(2);
        let e2 = ObjectId::from_value(3);

        let set = TargetSet::new()
            .with(Kind::Person, p1)
            .with(Kind::Event, e1)
            .with(Kind::Event, e2);

        let pairs: Vec<_> = set.iter().collect();
        assert_eq!(pairs, vec![(Kind::Event, e1), (Kind::Event, e2), (Kind::Person, p1)]);
        assert_eq!(set.len(), 3);
        assert!(!set.is_empty());
    }

    #[test]
    fn test_push_keeps_duplicates() {
        let from = Person::new(case(), "Ada").into_linkable();
        let event = Event::new(case(), "meeting");

        let mut link = Link::new(case(), from);
        link.push(event.clone().into_linkable());
        link.push(event.clone().into_linkable());

        assert_eq!(link.events, vec![event.clone(), event]);
        assert_eq!(link.target_count(), 2);
    }

    #[test]
    fn test_remove_ids_preserves_survivor_order() {
        let from = Person::new(case(), "Ada").into_linkable();
        let a = Event::new(case(), "a");
        let b = Event::new(case(), "b");
        let c = Event::new(case(), "c");

        let mut link = Link::new(case(), from);
        for e in [&a, &b, &a, &c] {
            link.push(e.clone().into_linkable());
        }

        let removed = link.remove_ids(&TargetSet::new().with(Kind::Event, a.id));
        assert_eq!(removed, 2);
        assert_eq!(link.events, vec![b, c]);
    }

    #[test]
    fn test_remove_ids_is_kind_scoped() {
        let from = Event::new(case(), "origin").into_linkable();
        let person = Person::new(case(), "Ada");

        let mut link = Link::new(case(), from);
        link.push(person.clone().into_linkable());

        // Same id, wrong kind: nothing removed
        let removed = link.remove_ids(&TargetSet::new().with(Kind::File, person.id));
        assert_eq!(removed, 0);
        assert_eq!(link.persons, vec![person]);
    }

    #[test]
    fn test_target_count_and_tombstone() {
        let from = Event::new(case(), "origin").into_linkable();
        let file = File::new(case(), "photo.jpg", "image/jpeg", 10);

        let mut link = Link::new(case(), from);
        link.push(file.clone().into_linkable());

        assert_eq!(link.target_count(), 1);
        assert_eq!(link.files, vec![file]);
        assert!(!link.is_deleted());
        link.deleted_at = Some(now_millis());
        assert!(link.is_deleted());
    }
}
