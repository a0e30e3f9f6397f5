//! Snapshots of an in-memory store.
//!
//! A snapshot is a plain, serializable copy of every row, membership edge
//! and grant. Callers use it as a rollback point around a unit of work, and
//! the command-line tool uses it as its on-disk state file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use warden_core::error::{Error, Result, StorageError};
use warden_core::id::ObjectId;
use warden_core::traits::{EdgeKind, Storage};
use warden_core::types::{Entity, Grant};

use crate::memory::InMemoryStorage;

/// A point-in-time copy of a store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Entities, in insertion order.
    #[serde(default)]
    pub entities: Vec<Entity>,

    /// Membership edges as `(member, group)` pairs.
    #[serde(default)]
    pub memberships: Vec<(ObjectId, ObjectId)>,

    /// Grants.
    #[serde(default)]
    pub grants: Vec<Grant>,
}

impl Snapshot {
    /// Read a snapshot from a JSON file.
    ///
    /// A file that exists but does not hold a snapshot is reported as
    /// `StorageError::Corrupt`.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| {
            Error::from(StorageError::Corrupt(format!("{}: {}", path.display(), e)))
        })
    }

    /// Write this snapshot to a JSON file.
    ///
    /// The file is written next to its destination and renamed into place,
    /// so a failed write leaves the previous state intact.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text =
            serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))?;
        let staging = path.with_extension("tmp");
        fs::write(&staging, text)?;
        fs::rename(&staging, path)?;
        Ok(())
    }
}

impl InMemoryStorage {
    /// Take a snapshot of the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            entities: self.all_rows(),
            memberships: self.all_edges(EdgeKind::Membership),
            grants: self.all_triples(),
        }
    }

    /// Replace the current state with a snapshot.
    ///
    /// This is the rollback half of [`InMemoryStorage::snapshot`].
    pub fn restore(&self, snapshot: &Snapshot) -> Result<()> {
        self.clear();
        for entity in &snapshot.entities {
            self.insert_row(entity.clone())?;
        }
        for (member, group) in &snapshot.memberships {
            self.insert_edge(EdgeKind::Membership, *member, *group)?;
        }
        for grant in &snapshot.grants {
            self.insert_triple(grant.clone())?;
        }
        log::debug!(
            "Restored snapshot: {} entities, {} memberships, {} grants",
            snapshot.entities.len(),
            snapshot.memberships.len(),
            snapshot.grants.len()
        );
        Ok(())
    }

    /// Build a store from a snapshot.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self> {
        let store = Self::new();
        store.restore(snapshot)?;
        Ok(store)
    }
}
