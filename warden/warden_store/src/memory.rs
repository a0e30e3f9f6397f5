//! In-memory storage.
//!
//! This module provides an in-memory implementation of the storage trait.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use warden_core::error::{Result, StorageError};
use warden_core::id::ObjectId;
use warden_core::traits::{EdgeKind, Storage};
use warden_core::types::{Entity, EntityKind, Grant, Privilege};

/// An entity together with its insertion sequence number.
#[derive(Clone)]
struct Row {
    seq: u64,
    entity: Entity,
}

/// An in-memory storage backend.
///
/// All maps are `DashMap`s behind `Arc`s, so clones share state and the
/// store can be read concurrently from many threads. Rows, edges and grants
/// keep their insertion order.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    /// Entity rows, indexed by ID.
    rows: Arc<DashMap<ObjectId, Row>>,

    /// IDs of entities by normalized natural key, in insertion order.
    keys: Arc<DashMap<String, Vec<ObjectId>>>,

    /// Outgoing edges by kind and source.
    edges: Arc<DashMap<(EdgeKind, ObjectId), Vec<ObjectId>>>,

    /// Incoming edges by kind and target.
    reverse_edges: Arc<DashMap<(EdgeKind, ObjectId), Vec<ObjectId>>>,

    /// Grants by subject.
    triples: Arc<DashMap<ObjectId, Vec<Grant>>>,

    /// Next row sequence number.
    next_seq: Arc<AtomicU64>,
}

impl InMemoryStorage {
    /// Create a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entities.
    pub fn entity_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of stored grants.
    pub fn grant_count(&self) -> usize {
        self.triples.iter().map(|entry| entry.value().len()).sum()
    }

    /// Number of stored edges of a kind.
    pub fn edge_count(&self, kind: EdgeKind) -> usize {
        self.edges
            .iter()
            .filter(|entry| entry.key().0 == kind)
            .map(|entry| entry.value().len())
            .sum()
    }

    /// Remove everything.
    pub fn clear(&self) {
        self.rows.clear();
        self.keys.clear();
        self.edges.clear();
        self.reverse_edges.clear();
        self.triples.clear();
        self.next_seq.store(0, Ordering::SeqCst);
    }

    /// All entities in insertion order.
    pub(crate) fn all_rows(&self) -> Vec<Entity> {
        let mut rows: Vec<Row> = self.rows.iter().map(|r| r.value().clone()).collect();
        rows.sort_by_key(|row| row.seq);
        rows.into_iter().map(|row| row.entity).collect()
    }

    /// All edges of a kind, ordered by the insertion order of their source.
    pub(crate) fn all_edges(&self, kind: EdgeKind) -> Vec<(ObjectId, ObjectId)> {
        let mut edges = Vec::new();
        for entity in self.all_rows() {
            if let Some(targets) = self.edges.get(&(kind, entity.id)) {
                edges.extend(targets.iter().map(|to| (entity.id, *to)));
            }
        }
        edges
    }

    /// All grants, ordered by the insertion order of their subject.
    pub(crate) fn all_triples(&self) -> Vec<Grant> {
        let mut grants = Vec::new();
        for entity in self.all_rows() {
            if let Some(held) = self.triples.get(&entity.id) {
                grants.extend(held.iter().cloned());
            }
        }
        grants
    }

    fn push_unique(targets: &mut Vec<ObjectId>, value: ObjectId) -> bool {
        if targets.contains(&value) {
            false
        } else {
            targets.push(value);
            true
        }
    }

    fn remove_value(targets: &mut Vec<ObjectId>, value: &ObjectId) -> bool {
        let before = targets.len();
        targets.retain(|t| t != value);
        targets.len() != before
    }
}

impl Storage for InMemoryStorage {
    fn lookup_by_id(&self, id: &ObjectId) -> Result<Option<Entity>> {
        Ok(self.rows.get(id).map(|row| row.entity.clone()))
    }

    fn lookup_by_natural_key(
        &self,
        kind: Option<EntityKind>,
        key: &str,
    ) -> Result<Option<Entity>> {
        let ids = match self.keys.get(key) {
            Some(ids) => ids.clone(),
            None => return Ok(None),
        };

        Ok(ids
            .iter()
            .filter_map(|id| self.rows.get(id).map(|row| row.entity.clone()))
            .find(|entity| kind.map_or(true, |k| entity.kind == k)))
    }

    fn insert_row(&self, entity: Entity) -> Result<ObjectId> {
        let id = entity.id;
        let key = entity.key.clone();

        match self.rows.entry(id) {
            Entry::Occupied(_) => {
                return Err(StorageError::Rejected(format!("row {} already exists", id)).into())
            }
            Entry::Vacant(slot) => {
                let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
                slot.insert(Row { seq, entity });
            }
        }

        if let Some(key) = key {
            self.keys.entry(key).or_default().push(id);
        }

        Ok(id)
    }

    fn list_rows(&self, kind: EntityKind) -> Result<Vec<Entity>> {
        Ok(self
            .all_rows()
            .into_iter()
            .filter(|entity| entity.kind == kind)
            .collect())
    }

    fn insert_edge(&self, kind: EdgeKind, from: ObjectId, to: ObjectId) -> Result<bool> {
        // The forward entry stays locked until the reverse index agrees.
        // Every edge write locks `edges` before `reverse_edges`.
        let mut targets = self.edges.entry((kind, from)).or_default();
        let inserted = Self::push_unique(&mut targets, to);
        if inserted {
            let mut sources = self.reverse_edges.entry((kind, to)).or_default();
            Self::push_unique(&mut sources, from);
        }
        drop(targets);
        Ok(inserted)
    }

    fn remove_edge(&self, kind: EdgeKind, from: &ObjectId, to: &ObjectId) -> Result<bool> {
        let forward = (kind, *from);
        let reverse = (kind, *to);

        let removed = match self.edges.get_mut(&forward) {
            Some(mut targets) => {
                let removed = Self::remove_value(&mut targets, to);
                if removed {
                    if let Some(mut sources) = self.reverse_edges.get_mut(&reverse) {
                        Self::remove_value(&mut sources, from);
                    }
                }
                removed
            }
            None => false,
        };

        self.edges.remove_if(&forward, |_, targets| targets.is_empty());
        self.reverse_edges
            .remove_if(&reverse, |_, sources| sources.is_empty());
        Ok(removed)
    }

    fn query_edges(&self, kind: EdgeKind, from: &ObjectId) -> Result<Vec<ObjectId>> {
        Ok(self
            .edges
            .get(&(kind, *from))
            .map(|targets| targets.clone())
            .unwrap_or_default())
    }

    fn query_edges_to(&self, kind: EdgeKind, to: &ObjectId) -> Result<Vec<ObjectId>> {
        Ok(self
            .reverse_edges
            .get(&(kind, *to))
            .map(|sources| sources.clone())
            .unwrap_or_default())
    }

    fn insert_triple(&self, grant: Grant) -> Result<bool> {
        let mut held = self.triples.entry(grant.subject).or_default();
        if held
            .iter()
            .any(|g| g.is_triple(&grant.subject, &grant.privilege, &grant.object))
        {
            return Ok(false);
        }
        held.push(grant);
        Ok(true)
    }

    fn remove_triple(
        &self,
        subject: &ObjectId,
        privilege: &Privilege,
        object: &ObjectId,
    ) -> Result<bool> {
        let removed = match self.triples.get_mut(subject) {
            Some(mut held) => {
                let before = held.len();
                held.retain(|g| !g.is_triple(subject, privilege, object));
                held.len() != before
            }
            None => false,
        };
        self.triples.remove_if(subject, |_, held| held.is_empty());
        Ok(removed)
    }

    fn query_triples(&self, subject: &ObjectId) -> Result<Vec<Grant>> {
        Ok(self
            .triples
            .get(subject)
            .map(|held| held.clone())
            .unwrap_or_default())
    }
}
