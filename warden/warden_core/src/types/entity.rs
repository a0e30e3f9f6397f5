//! Entity records.
//!
//! Identities, groups and items are stored as one record type tagged with
//! an explicit [`EntityKind`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::id::ObjectId;

/// The kind of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A user or service account.
    Identity,

    /// A named collection of principals.
    Group,

    /// A protected object that is not a principal.
    Item,
}

impl EntityKind {
    /// Get the name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Group => "group",
            Self::Item => "item",
        }
    }

    /// Whether entities of this kind can hold grants and memberships.
    pub fn is_principal(&self) -> bool {
        matches!(self, Self::Identity | Self::Group)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "identity" | "user" => Ok(Self::Identity),
            "group" => Ok(Self::Group),
            "item" => Ok(Self::Item),
            other => Err(format!("unknown entity kind '{}'", other)),
        }
    }
}

/// Normalize a natural key (email or name) for storage and lookup.
///
/// Keys are compared case-insensitively and without surrounding whitespace.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// An opaque, already-encoded credential.
///
/// Hashing and verification happen outside this crate; the value is stored
/// as given and never printed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Wrap an encoded credential.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Get the encoded credential.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(<redacted>)")
    }
}

/// A stored identity, group or item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// The unique, immutable identifier.
    pub id: ObjectId,

    /// What this entity is.
    pub kind: EntityKind,

    /// Normalized natural key: an email for identities, a name otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Given name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,

    /// Family name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,

    /// Full display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,

    /// Encoded credential. Only identities carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<Credential>,

    /// When the entity was created.
    pub created: DateTime<Utc>,
}

impl Entity {
    /// Create a bare entity of the given kind.
    pub fn new(id: ObjectId, kind: EntityKind) -> Self {
        Self {
            id,
            kind,
            key: None,
            firstname: None,
            lastname: None,
            fullname: None,
            credential: None,
            created: Utc::now(),
        }
    }

    /// Set the natural key, normalizing it.
    pub fn with_key(mut self, key: impl AsRef<str>) -> Self {
        self.key = Some(normalize_key(key.as_ref()));
        self
    }

    /// Whether this entity is an identity or a group.
    pub fn is_principal(&self) -> bool {
        self.kind.is_principal()
    }

    /// The best human-readable name for this entity.
    ///
    /// Full name, then first name, then natural key, then the identifier.
    pub fn display_name(&self) -> String {
        self.fullname
            .as_deref()
            .or(self.firstname.as_deref())
            .or(self.key.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| self.id.to_string())
    }
}
