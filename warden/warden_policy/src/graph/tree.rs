//! Membership tree rendering.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use warden_core::error::Result;
use warden_core::id::ObjectId;
use warden_core::traits::{EdgeKind, Storage};
use warden_core::types::{Entity, EntityKind};

use super::MembershipGraph;

/// One line of a membership tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeRow {
    /// Distance from the root of this branch.
    pub depth: usize,

    /// The entity on this line.
    pub id: ObjectId,

    /// Its kind.
    pub kind: EntityKind,

    /// Its natural key.
    pub key: Option<String>,

    /// Its display name.
    pub display_name: String,
}

impl TreeRow {
    fn from_entity(entity: &Entity, depth: usize) -> Self {
        Self {
            depth,
            id: entity.id,
            kind: entity.kind,
            key: entity.key.clone(),
            display_name: entity.display_name(),
        }
    }

    /// Render the row as `^^ name`, one caret per level.
    pub fn render(&self) -> String {
        format!("{} {}", "^".repeat(self.depth), self.display_name)
    }
}

fn kind_rank(kind: EntityKind) -> u8 {
    match kind {
        EntityKind::Group => 0,
        EntityKind::Identity => 1,
        EntityKind::Item => 2,
    }
}

fn sibling_order(a: &Entity, b: &Entity) -> Ordering {
    a.key
        .cmp(&b.key)
        .then_with(|| kind_rank(a.kind).cmp(&kind_rank(b.kind)))
        .then_with(|| a.display_name().cmp(&b.display_name()))
}

/// A pending node with the path that led to it.
struct Frame {
    entity: Entity,
    depth: usize,
    path: Vec<ObjectId>,
}

impl<S> MembershipGraph<S>
where
    S: Storage + ?Sized,
{
    /// Depth-first tree of members below `root`.
    ///
    /// With no root, every group that is not itself a member of anything is
    /// a root. A node that already appears on the path from its root is not
    /// expanded again, so cyclic memberships print once per branch. An
    /// unknown root yields an empty tree.
    pub fn member_tree(&self, root: Option<ObjectId>) -> Result<Vec<TreeRow>> {
        let mut roots: Vec<Entity> = match root {
            Some(id) => self.storage.lookup_by_id(&id)?.into_iter().collect(),
            None => {
                let mut roots = Vec::new();
                for group in self.storage.list_rows(EntityKind::Group)? {
                    if self
                        .storage
                        .query_edges(EdgeKind::Membership, &group.id)?
                        .is_empty()
                    {
                        roots.push(group);
                    }
                }
                roots
            }
        };
        roots.sort_by(sibling_order);

        // Explicit stack; children are pushed in reverse so they pop in order
        let mut stack: Vec<Frame> = roots
            .into_iter()
            .rev()
            .map(|entity| Frame {
                path: vec![entity.id],
                entity,
                depth: 0,
            })
            .collect();
        let mut rows = Vec::new();

        while let Some(frame) = stack.pop() {
            rows.push(TreeRow::from_entity(&frame.entity, frame.depth));

            let mut children = Vec::new();
            for id in self
                .storage
                .query_edges_to(EdgeKind::Membership, &frame.entity.id)?
            {
                if frame.path.contains(&id) {
                    continue;
                }
                if let Some(child) = self.storage.lookup_by_id(&id)? {
                    children.push(child);
                }
            }
            children.sort_by(sibling_order);

            for child in children.into_iter().rev() {
                let mut path = frame.path.clone();
                path.push(child.id);
                stack.push(Frame {
                    entity: child,
                    depth: frame.depth + 1,
                    path,
                });
            }
        }

        Ok(rows)
    }
}
