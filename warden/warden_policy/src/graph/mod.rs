//! Membership graph.
//!
//! Principals join groups through directed `member -> group` edges. The
//! edges may form cycles, including self loops; every traversal here keeps
//! a visited set, so each node is expanded at most once and traversal
//! terminates on any graph.

pub mod tree;

use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use warden_core::error::{Error, Result};
use warden_core::id::ObjectId;
use warden_core::log_event;
use warden_core::traits::{EdgeKind, Storage};
use warden_core::utils::LogLevel;

pub use tree::TreeRow;

/// A node reached by a traversal, with its shortest hop distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Level {
    /// The node.
    pub id: ObjectId,

    /// Hops from the start node. The start node itself is level 0.
    pub level: u32,
}

/// Which way a traversal follows membership edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// From a member to the groups it belongs to.
    Up,

    /// From a group to its members.
    Down,
}

/// Membership edges and their transitive closure.
pub struct MembershipGraph<S: ?Sized> {
    storage: Arc<S>,
}

impl<S: ?Sized> Clone for MembershipGraph<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<S> MembershipGraph<S>
where
    S: Storage + ?Sized,
{
    /// Create a new membership graph.
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// Make `member` a direct member of `group`.
    ///
    /// Both endpoints must be existing principals. Self loops and cycles are
    /// accepted.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the edge was added.
    /// * `Ok(false)` - If the edge was already present.
    /// * `Err(Error::UnknownPrincipal)` - If either endpoint is missing or
    ///   is not a principal. Nothing is written in that case.
    pub fn add_membership(&self, member: ObjectId, group: ObjectId) -> Result<bool> {
        self.require_principal(&member)?;
        self.require_principal(&group)?;

        let added = self
            .storage
            .insert_edge(EdgeKind::Membership, member, group)?;
        if added {
            log_event!(LogLevel::Info, "Membership added",
                member => member,
                group => group,
            );
        } else {
            log::debug!("{} is already a member of {}", member, group);
        }
        Ok(added)
    }

    /// Remove a direct membership edge.
    ///
    /// Returns whether an edge was removed.
    pub fn remove_membership(&self, member: &ObjectId, group: &ObjectId) -> Result<bool> {
        let removed = self
            .storage
            .remove_edge(EdgeKind::Membership, member, group)?;
        if removed {
            log_event!(LogLevel::Info, "Membership removed",
                member => member,
                group => group,
            );
        }
        Ok(removed)
    }

    /// The groups `member` belongs to directly.
    pub fn direct_groups(&self, member: &ObjectId) -> Result<Vec<ObjectId>> {
        self.storage.query_edges(EdgeKind::Membership, member)
    }

    /// The direct members of `group`.
    pub fn direct_members(&self, group: &ObjectId) -> Result<Vec<ObjectId>> {
        self.storage.query_edges_to(EdgeKind::Membership, group)
    }

    /// Every node reachable from `start` along membership edges, including
    /// `start` itself.
    ///
    /// `start` need not be a stored entity; an unknown node has the closure
    /// `{start}`.
    pub fn closure(&self, start: &ObjectId) -> Result<HashSet<ObjectId>> {
        Ok(self
            .traverse(start, Direction::Up)?
            .into_iter()
            .map(|level| level.id)
            .collect())
    }

    /// The closure of `start` with shortest hop distances, ordered by
    /// level and then identifier.
    pub fn memberships(&self, start: &ObjectId) -> Result<Vec<Level>> {
        let mut levels = self.traverse(start, Direction::Up)?;
        levels.sort_by(|a, b| a.level.cmp(&b.level).then_with(|| a.id.cmp(&b.id)));
        Ok(levels)
    }

    /// Every principal that reaches `group`, including `group` itself.
    pub fn members(&self, group: &ObjectId) -> Result<HashSet<ObjectId>> {
        Ok(self
            .traverse(group, Direction::Down)?
            .into_iter()
            .map(|level| level.id)
            .collect())
    }

    /// Whether `member` reaches `group` through zero or more edges.
    pub fn is_member(&self, member: &ObjectId, group: &ObjectId) -> Result<bool> {
        Ok(member == group || self.closure(member)?.contains(group))
    }

    /// Breadth-first traversal. Nodes come out in order of discovery, so
    /// each carries its shortest distance from `start`.
    fn traverse(&self, start: &ObjectId, direction: Direction) -> Result<Vec<Level>> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        let mut reached = Vec::new();

        visited.insert(*start);
        queue.push_back(Level {
            id: *start,
            level: 0,
        });

        while let Some(current) = queue.pop_front() {
            reached.push(current);

            let next = match direction {
                Direction::Up => self.storage.query_edges(EdgeKind::Membership, &current.id)?,
                Direction::Down => self
                    .storage
                    .query_edges_to(EdgeKind::Membership, &current.id)?,
            };

            for id in next {
                if visited.insert(id) {
                    queue.push_back(Level {
                        id,
                        level: current.level + 1,
                    });
                }
            }
        }

        log::debug!(
            "Traversed {:?} from {}: {} nodes",
            direction,
            start,
            reached.len()
        );
        Ok(reached)
    }

    fn require_principal(&self, id: &ObjectId) -> Result<()> {
        match self.storage.lookup_by_id(id)? {
            Some(entity) if entity.is_principal() => Ok(()),
            _ => Err(Error::UnknownPrincipal(*id)),
        }
    }
}
