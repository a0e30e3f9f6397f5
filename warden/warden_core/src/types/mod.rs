//! Data structures used throughout the system.
//!
//! - **entity**: identities, groups and items
//! - **reference**: the ways callers name an entity
//! - **grant**: privileges and stored grants

pub mod entity;
pub mod grant;
pub mod reference;

pub use entity::{normalize_key, Credential, Entity, EntityKind};
pub use grant::{default_ends, default_starts, Grant, GrantRequest, Privilege, WILDCARD};
pub use reference::Reference;
