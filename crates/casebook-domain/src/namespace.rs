//! Namespace module - case-scoped storage partitions

use crate::{CaseId, Kind};
use std::fmt;

/// A document collection inside a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Link records
    Links,
    /// Keyword records, keyed by name
    Keywords,
    /// Records of one linkable kind
    Objects(Kind),
}

impl Collection {
    /// Collection name as it appears in a namespace path
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Links => "links",
            Collection::Keywords => "keywords",
            Collection::Objects(kind) => kind.collection_name(),
        }
    }
}

/// Storage namespace
///
/// Uses a slash-delimited path: `cases` holds the case records themselves,
/// `cases/<case_id>/<collection>` holds everything that belongs to a case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace(String);

impl Namespace {
    /// Namespace holding case records
    pub fn cases() -> Self {
        Self("cases".to_string())
    }

    /// Namespace for one collection of a case
    pub fn scoped(case_id: CaseId, collection: Collection) -> Self {
        Self(format!("cases/{}/{}", case_id, collection.as_str()))
    }

    /// Namespace holding records of the given kind
    pub fn objects(case_id: CaseId, kind: Kind) -> Self {
        Self::scoped(case_id, Collection::Objects(kind))
    }

    /// Get namespace as string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get depth (number of slash-separated components)
    pub fn depth(&self) -> usize {
        self.0.split('/').count()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
