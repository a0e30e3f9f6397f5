//! # Warden Store
//!
//! `warden_store` provides [`InMemoryStorage`], a thread-safe
//! implementation of the [`warden_core::Storage`] collaborator, together
//! with [`Snapshot`]s for rollback and JSON persistence.
//!
//! ```
//! use warden_core::{EdgeKind, Entity, EntityKind, ObjectId, Storage};
//! use warden_store::InMemoryStorage;
//!
//! let store = InMemoryStorage::new();
//! let group = store
//!     .insert_row(Entity::new(ObjectId::new(), EntityKind::Group).with_key("admins"))
//!     .unwrap();
//!
//! let checkpoint = store.snapshot();
//! store.insert_edge(EdgeKind::Membership, ObjectId::new(), group).unwrap();
//! store.restore(&checkpoint).unwrap();
//!
//! assert!(store.query_edges_to(EdgeKind::Membership, &group).unwrap().is_empty());
//! ```

mod memory;
mod snapshot;

pub use memory::InMemoryStorage;
pub use snapshot::Snapshot;
