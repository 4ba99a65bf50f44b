//! Per-request context threaded through every service call
//!
//! Carries the authenticated principal and the request deadline explicitly
//! instead of looking them up from ambient state.

use std::time::{Duration, Instant};

/// The authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Principal {
    email: String,
}

impl Principal {
    /// Create a principal from a verified email address
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }

    /// The principal's email
    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Principal plus optional deadline for a single request
#[derive(Debug, Clone)]
pub struct RequestContext {
    principal: Principal,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// Context with no deadline
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            deadline: None,
        }
    }

    /// Set an absolute deadline
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set a deadline relative to now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// The caller
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// The caller's email
    pub fn email(&self) -> &str {
        self.principal.email()
    }

    /// The deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the deadline has already passed
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}
