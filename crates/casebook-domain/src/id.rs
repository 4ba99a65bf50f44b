//! Object identifiers

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for any stored record, based on UUIDv7
///
/// Rendered as 32 lowercase hex characters with the UUID separators
/// stripped. UUIDv7 keeps identifiers roughly creation-ordered and needs no
/// coordination between writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u128);

/// Cases are identified the same way as every other record
pub type CaseId = ObjectId;

impl ObjectId {
    /// Generate a new UUIDv7-based ObjectId
    ///
    /// # Examples
    ///
    /// ```
    /// use casebook_domain::ObjectId;
    ///
    /// let id = ObjectId::new();
    /// assert_eq!(id.to_string().len(), 32);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create an ObjectId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse an ObjectId from its 32-character hex form
    ///
    /// The hyphenated UUID form is accepted as well.
    ///
    /// # Examples
    ///
    /// ```
    /// use casebook_domain::ObjectId;
    ///
    /// let id = ObjectId::new();
    /// let parsed = ObjectId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("invalid object id '{}': {}", s, e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0).simple())
    }
}

impl FromStr for ObjectId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_string(&s).map_err(de::Error::custom)
    }
}
