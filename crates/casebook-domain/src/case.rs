//! Case module - the investigation container

use crate::{now_millis, CaseId, ObjectId};
use serde::{Deserialize, Serialize};

/// Top-level investigation scoping every other record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    /// Unique identifier
    pub id: CaseId,
    /// Display name
    pub name: String,
    /// Emails of the investigators allowed to work on this case
    #[serde(default)]
    pub investigators: Vec<String>,
    /// Creation time
    pub created_at: u64,
    /// Last modification time
    pub updated_at: u64,
}

impl Case {
    /// Create a new case
    pub fn new(name: impl Into<String>, investigators: Vec<String>) -> Self {
        let now = now_millis();
        Self {
            id: ObjectId::new(),
            name: name.into(),
            investigators,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `email` is listed as an investigator (case-insensitive)
    pub fn has_investigator(&self, email: &str) -> bool {
        self.investigators
            .iter()
            .any(|i| i.eq_ignore_ascii_case(email.trim()))
    }
}
