//! # Warden Policy
//!
//! `warden_policy` implements role-based access control over any
//! [`warden_core::Storage`] collaborator: principals (identities and
//! groups) join groups, hold grants of privilege tokens on objects, and
//! are checked against the grants of every group they transitively reach.
//!
//! Key concepts:
//!
//! 1. **Resolution**: references (identifier, natural key or structured
//!    lookup) are normalized to identifiers by [`IdentifierResolver`].
//!
//! 2. **Closure**: [`MembershipGraph`] expands a principal into itself and
//!    every group reachable through membership edges, terminating on cyclic
//!    graphs.
//!
//! 3. **Grants**: [`PermissionStore`] validates and stores
//!    `(subject, privilege, object)` triples with validity windows.
//!
//! 4. **Checks**: [`PermissionMatcher`] allows access when any principal in
//!    the subject's closure holds a matching grant.
//!
//! [`Rbac`] combines all four over a shared store.

pub mod engine;
pub mod graph;
pub mod integration;
pub mod rbac;
pub mod registry;
pub mod store;

pub use engine::{CheckAudit, Decision, Match, PermissionMatcher};
pub use graph::{Level, MembershipGraph, TreeRow};
pub use integration::IdentifierResolver;
pub use rbac::Rbac;
pub use registry::{EntityRegistry, NewGroup, NewIdentity, NewItem};
pub use store::PermissionStore;
