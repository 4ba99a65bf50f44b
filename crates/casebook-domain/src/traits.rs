//! Trait definitions shared by every linkable record
//!
//! Storage and keyword bookkeeping are written once against [`Record`]
//! instead of once per kind.

use crate::{CaseId, Kind, LinkableObject, ObjectId};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A case-scoped record that can be linked and tagged
///
/// Implemented by [`crate::Event`], [`crate::Person`], [`crate::Entity`] and
/// [`crate::File`].
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Which kind of record this is
    const KIND: Kind;

    /// Record identifier, unique within the case and kind
    fn id(&self) -> ObjectId;

    /// Case this record belongs to
    fn case_id(&self) -> CaseId;

    /// Tag names in insertion order (duplicates allowed)
    fn keywords(&self) -> &[String];

    /// Mutable access to the tag list
    fn keywords_mut(&mut self) -> &mut Vec<String>;

    /// Stamp the last-modified time
    fn touch(&mut self, now: u64);

    /// Wrap the record in the polymorphic link payload
    fn into_linkable(self) -> LinkableObject;
}
