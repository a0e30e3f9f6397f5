//! Storage interface.
//!
//! This module defines the persistence collaborator. Everything above it
//! (registry, membership graph, permission store) reads and writes through
//! this trait and never assumes a particular backend, schema or transport.
//!
//! Implementations must not commit or roll back on their own when used by
//! the core; transaction boundaries belong to the caller.

use crate::error::Result;
use crate::id::ObjectId;
use crate::types::{Entity, EntityKind, Grant, Privilege};

/// The kind of a directed edge between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// `from` is a member of the group `to`.
    Membership,
}

/// Trait for the persistence collaborator.
///
/// A storage backend offers keyed reads, row and edge inserts, and simple
/// queries. It is shared between callers, so it must be `Send + Sync`.
pub trait Storage: Send + Sync {
    /// Look up an entity by identifier.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Entity))` - The entity.
    /// * `Ok(None)` - If no entity has this identifier.
    /// * `Err` - If the backend failed.
    fn lookup_by_id(&self, id: &ObjectId) -> Result<Option<Entity>>;

    /// Look up an entity by normalized natural key.
    ///
    /// # Arguments
    ///
    /// * `kind` - Restrict the lookup to one kind, or `None` for any kind.
    /// * `key` - The normalized key.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Entity))` - The earliest stored entity with this key.
    /// * `Ok(None)` - If no entity has this key.
    /// * `Err` - If the backend failed.
    fn lookup_by_natural_key(&self, kind: Option<EntityKind>, key: &str)
        -> Result<Option<Entity>>;

    /// Insert a new entity row.
    ///
    /// Callers check identifier uniqueness first; a backend may still
    /// reject a duplicate with `StorageError::Rejected`.
    fn insert_row(&self, entity: Entity) -> Result<ObjectId>;

    /// List every entity of a kind, in insertion order.
    fn list_rows(&self, kind: EntityKind) -> Result<Vec<Entity>>;

    /// Insert an edge.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the edge was stored.
    /// * `Ok(false)` - If the edge already existed.
    fn insert_edge(&self, kind: EdgeKind, from: ObjectId, to: ObjectId) -> Result<bool>;

    /// Remove an edge, returning whether it existed.
    fn remove_edge(&self, kind: EdgeKind, from: &ObjectId, to: &ObjectId) -> Result<bool>;

    /// Targets of the edges leaving `from`.
    fn query_edges(&self, kind: EdgeKind, from: &ObjectId) -> Result<Vec<ObjectId>>;

    /// Sources of the edges arriving at `to`.
    fn query_edges_to(&self, kind: EdgeKind, to: &ObjectId) -> Result<Vec<ObjectId>>;

    /// Insert a grant.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the grant was stored.
    /// * `Ok(false)` - If a grant with the same triple already existed.
    fn insert_triple(&self, grant: Grant) -> Result<bool>;

    /// Remove the grant with the given triple, returning whether it existed.
    fn remove_triple(
        &self,
        subject: &ObjectId,
        privilege: &Privilege,
        object: &ObjectId,
    ) -> Result<bool>;

    /// Grants held directly by `subject`, in insertion order.
    fn query_triples(&self, subject: &ObjectId) -> Result<Vec<Grant>>;
}
