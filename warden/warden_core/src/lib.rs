//! # Warden Core
//!
//! `warden_core` provides the building blocks shared by every Warden crate:
//! identifiers, entity and grant types, the error hierarchy, and the
//! storage interface the policy layer is written against.
//!
//! ## Model
//!
//! Identities, groups and items share one identifier space, so any entity
//! can be named as the subject or the object of a grant. Every entity
//! carries an explicit [`EntityKind`] tag. Groups may contain other groups
//! to any depth, and membership cycles are ordinary data.
//!
//! A grant is a `(subject, privilege, object)` triple. The privilege `*`
//! covers every privilege on its object; there is no object wildcard.
//!
//! ## Crate Structure
//!
//! - **error**: Error types
//! - **id**: The shared identifier type
//! - **traits**: The storage collaborator interface
//! - **types**: Entities, references and grants
//! - **utils**: Logging levels and configuration
//! - **macros**: Logging convenience macros

pub mod error;
pub mod id;
pub mod macros;
pub mod traits;
pub mod types;
pub mod utils;

pub use error::{Error, Result, StorageError, ValidationError, ValidationReason};
pub use id::ObjectId;
pub use traits::{EdgeKind, Storage};
pub use types::{Credential, Entity, EntityKind, Grant, GrantRequest, Privilege, Reference};
pub use utils::{LogLevel, WardenConfig};
