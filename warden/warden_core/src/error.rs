//! Error types for the Warden RBAC system.
//!
//! Errors raised by mutating operations are data-integrity errors: they are
//! detected before anything is written and are never retried internally.
//! Read-side operations degrade to "not found" or `false` instead of
//! raising, so the error kinds here only surface from writes, malformed
//! input, configuration, or the storage collaborator itself.

use crate::id::ObjectId;
use std::fmt;
use thiserror::Error;

/// Root error type for the Warden system.
#[derive(Debug, Error)]
pub enum Error {
    /// A membership endpoint does not name an existing identity or group
    #[error("Unknown principal: {0}")]
    UnknownPrincipal(ObjectId),

    /// A reference does not name an existing item
    #[error("Unknown item: {0}")]
    UnknownItem(ObjectId),

    /// A caller-supplied identifier is already in use
    #[error("Duplicate identifier: {0}")]
    DuplicateIdentifier(ObjectId),

    /// A permission grant failed validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A reference has an unsupported shape
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// The storage collaborator failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration could not be loaded or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// A rejected grant request.
///
/// `index` is the position of the offending request inside its batch
/// (always `0` for single grants).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("grant #{index}: {reason}")]
pub struct ValidationError {
    /// Position of the rejected request in the batch
    pub index: usize,

    /// Why the request was rejected
    pub reason: ValidationReason,
}

impl ValidationError {
    /// Create a validation error for the request at `index`.
    pub fn new(index: usize, reason: ValidationReason) -> Self {
        Self { index, reason }
    }
}

/// The reason a grant request was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReason {
    /// The subject does not resolve to an identity or group
    UnknownSubject(String),

    /// The object does not resolve to an entity or the universal marker
    UnknownObject(String),

    /// The object is the wildcard `*`
    WildcardObject,

    /// The privilege is empty
    EmptyPrivilege,

    /// The validity window does not end after it starts
    InvalidWindow,
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSubject(subject) => write!(f, "unknown subject '{}'", subject),
            Self::UnknownObject(object) => write!(f, "unknown object '{}'", object),
            Self::WildcardObject => write!(f, "wildcard is not allowed as object"),
            Self::EmptyPrivilege => write!(f, "privilege must not be empty"),
            Self::InvalidWindow => write!(f, "grant must end after it starts"),
        }
    }
}

/// Errors reported by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A row was rejected by the backend
    #[error("Row rejected: {0}")]
    Rejected(String),

    /// Stored data could not be decoded
    #[error("Corrupt data: {0}")]
    Corrupt(String),
}

/// Result type used throughout the Warden system.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let err: Error = ValidationError::new(1, ValidationReason::WildcardObject).into();
        assert!(matches!(
            err,
            Error::Validation(ValidationError {
                index: 1,
                reason: ValidationReason::WildcardObject
            })
        ));

        let err: Error = StorageError::Corrupt("truncated".into()).into();
        assert!(matches!(err, Error::Storage(StorageError::Corrupt(_))));
        assert_eq!(err.to_string(), "Storage error: Corrupt data: truncated");
    }

    #[test]
    fn test_error_display() {
        let id = ObjectId::new();
        let display = Error::UnknownPrincipal(id).to_string();
        assert!(display.contains(&format!("Unknown principal: {}", id)));

        let err: Error =
            ValidationError::new(2, ValidationReason::UnknownObject("ghost".into())).into();
        assert_eq!(
            err.to_string(),
            "Validation error: grant #2: unknown object 'ghost'"
        );
    }
}
