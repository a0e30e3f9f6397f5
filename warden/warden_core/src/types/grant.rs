//! Permission grants.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::id::ObjectId;
use crate::types::reference::Reference;

/// The privilege wildcard. A grant with this privilege covers every
/// privilege on its object.
pub const WILDCARD: &str = "*";

/// Default start of a grant's validity window.
pub fn default_starts() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Default end of a grant's validity window.
pub fn default_ends() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(3000, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// A privilege token, such as `read` or `edit`, or the wildcard `*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Privilege(String);

impl Privilege {
    /// Create a privilege, trimming surrounding whitespace.
    pub fn new(token: impl AsRef<str>) -> Self {
        Self(token.as_ref().trim().to_string())
    }

    /// The wildcard privilege.
    pub fn wildcard() -> Self {
        Self(WILDCARD.to_string())
    }

    /// Get the token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the wildcard privilege.
    pub fn is_wildcard(&self) -> bool {
        self.0 == WILDCARD
    }

    /// Whether the token is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Privilege {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

/// A stored grant: `subject` holds `privilege` on `object` between
/// `starts` (inclusive) and `ends` (exclusive).
///
/// Two grants are the same grant when their triples match; the window is
/// an attribute of the stored grant, not part of its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// The principal holding the grant.
    pub subject: ObjectId,

    /// The granted privilege.
    pub privilege: Privilege,

    /// The entity (or universal marker) the grant applies to.
    pub object: ObjectId,

    /// Start of the validity window.
    pub starts: DateTime<Utc>,

    /// End of the validity window.
    pub ends: DateTime<Utc>,
}

impl Grant {
    /// Create a grant with the default validity window.
    pub fn new(subject: ObjectId, privilege: impl Into<Privilege>, object: ObjectId) -> Self {
        Self {
            subject,
            privilege: privilege.into(),
            object,
            starts: default_starts(),
            ends: default_ends(),
        }
    }

    /// Replace the validity window.
    pub fn with_window(mut self, starts: DateTime<Utc>, ends: DateTime<Utc>) -> Self {
        self.starts = starts;
        self.ends = ends;
        self
    }

    /// Whether the grant is in force at `when`.
    pub fn is_active_at(&self, when: DateTime<Utc>) -> bool {
        self.starts <= when && when < self.ends
    }

    /// Whether this grant has the given triple.
    pub fn is_triple(&self, subject: &ObjectId, privilege: &Privilege, object: &ObjectId) -> bool {
        self.subject == *subject && self.privilege == *privilege && self.object == *object
    }
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.subject, self.privilege, self.object)
    }
}

/// A request to store a grant, before its references are resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRequest {
    /// Who receives the grant.
    pub subject: Reference,

    /// The privilege token.
    pub privilege: String,

    /// What the grant applies to.
    pub object: Reference,

    /// Start of the validity window; the configured default when absent.
    #[serde(default)]
    pub starts: Option<DateTime<Utc>>,

    /// End of the validity window; the configured default when absent.
    #[serde(default)]
    pub ends: Option<DateTime<Utc>>,
}

impl GrantRequest {
    /// Create a request with the default window.
    pub fn new(
        subject: impl Into<Reference>,
        privilege: impl Into<String>,
        object: impl Into<Reference>,
    ) -> Self {
        Self {
            subject: subject.into(),
            privilege: privilege.into(),
            object: object.into(),
            starts: None,
            ends: None,
        }
    }

    /// Set the start of the validity window.
    pub fn starting(mut self, starts: DateTime<Utc>) -> Self {
        self.starts = Some(starts);
        self
    }

    /// Set the end of the validity window.
    pub fn ending(mut self, ends: DateTime<Utc>) -> Self {
        self.ends = Some(ends);
        self
    }
}
