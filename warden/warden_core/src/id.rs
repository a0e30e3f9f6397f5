//! Identifiers for the Warden RBAC system.
//!
//! Identities, groups and items all live in one identifier space so that any
//! entity can appear as the subject or the object of a grant. An [`ObjectId`]
//! is a thin wrapper around a UUID; the entity kind is carried separately by
//! the entity record, never encoded in the identifier.
//!
//! # Examples
//!
//! ```
//! use warden_core::id::ObjectId;
//! use std::str::FromStr;
//!
//! let id = ObjectId::new();
//! assert!(!id.is_universal());
//!
//! let id_str = "550e8400-e29b-41d4-a716-446655440000";
//! let parsed = ObjectId::from_str(id_str).unwrap();
//! assert_eq!(parsed.to_string(), id_str);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A globally unique identifier for an identity, group or item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Create a new random identifier (UUID v4).
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an identifier from a specific UUID.
    ///
    /// This is how stored or caller-supplied identifiers enter the system.
    ///
    /// # Examples
    ///
    /// ```
    /// use warden_core::id::ObjectId;
    /// use uuid::Uuid;
    ///
    /// let uuid = Uuid::new_v4();
    /// assert_eq!(ObjectId::from_uuid(uuid).uuid(), uuid);
    /// ```
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// The reserved universal object.
    ///
    /// The nil UUID is never assigned to an entity. It can only be used as
    /// the object of a grant, for privileges that are not tied to any single
    /// entity.
    ///
    /// # Examples
    ///
    /// ```
    /// use warden_core::id::ObjectId;
    ///
    /// let universal = ObjectId::universal();
    /// assert_eq!(universal.to_string(), "00000000-0000-0000-0000-000000000000");
    /// assert!(universal.is_universal());
    /// ```
    pub const fn universal() -> Self {
        Self(Uuid::nil())
    }

    /// Check if this is the universal object.
    pub fn is_universal(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ObjectId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

impl From<Uuid> for ObjectId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}
