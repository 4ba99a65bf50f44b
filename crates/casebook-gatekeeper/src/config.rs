//! Gatekeeper configuration

use serde::Deserialize;

/// Configuration for case access checks
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessConfig {
    /// Emails allowed into every case regardless of membership
    #[serde(default)]
    pub administrators: Vec<String>,

    /// Skip membership checks entirely (development only)
    #[serde(default)]
    pub open_access: bool,
}

impl AccessConfig {
    /// Create a permissive configuration (every authenticated caller allowed)
    pub fn permissive() -> Self {
        Self {
            administrators: Vec::new(),
            open_access: true,
        }
    }

    /// Add an administrator
    pub fn with_administrator(mut self, email: impl Into<String>) -> Self {
        self.administrators.push(email.into());
        self
    }

    /// Whether `email` is a configured administrator (case-insensitive)
    pub fn is_administrator(&self, email: &str) -> bool {
        self.administrators
            .iter()
            .any(|a| a.eq_ignore_ascii_case(email.trim()))
    }
}
