//! The combined access-control facade.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;

use warden_core::error::Result;
use warden_core::id::ObjectId;
use warden_core::traits::Storage;
use warden_core::types::{Entity, EntityKind, Grant, GrantRequest, Privilege, Reference};
use warden_core::utils::WardenConfig;

use crate::engine::{CheckAudit, Match, PermissionMatcher};
use crate::graph::{Level, MembershipGraph, TreeRow};
use crate::integration::IdentifierResolver;
use crate::registry::{EntityRegistry, NewGroup, NewIdentity, NewItem};
use crate::store::PermissionStore;

/// Entity registry, membership graph, permission store and matcher over
/// one storage collaborator.
///
/// Nothing here commits. Callers that need rollback wrap a unit of work in
/// their storage's transaction or snapshot mechanism.
pub struct Rbac<S: ?Sized> {
    storage: Arc<S>,
    resolver: IdentifierResolver<S>,
    registry: EntityRegistry<S>,
    graph: MembershipGraph<S>,
    permissions: PermissionStore<S>,
    matcher: PermissionMatcher<S>,
}

impl<S> Rbac<S>
where
    S: Storage + ?Sized,
{
    /// Create a facade with the default configuration.
    pub fn new(storage: Arc<S>) -> Self {
        Self::with_config(storage, &WardenConfig::default())
    }

    /// Create a facade with the given configuration.
    pub fn with_config(storage: Arc<S>, config: &WardenConfig) -> Self {
        let mut matcher = PermissionMatcher::new(Arc::clone(&storage));
        if config.audit.enabled {
            matcher = matcher.with_audit(CheckAudit::new(config.audit.max_entries_per_subject));
        }

        Self {
            resolver: IdentifierResolver::new(Arc::clone(&storage)),
            registry: EntityRegistry::new(Arc::clone(&storage)),
            graph: MembershipGraph::new(Arc::clone(&storage)),
            permissions: PermissionStore::with_defaults(
                Arc::clone(&storage),
                config.grants.clone(),
            ),
            matcher,
            storage,
        }
    }

    /// The storage collaborator.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    /// The identifier resolver.
    pub fn resolver(&self) -> &IdentifierResolver<S> {
        &self.resolver
    }

    /// The entity registry.
    pub fn registry(&self) -> &EntityRegistry<S> {
        &self.registry
    }

    /// The membership graph.
    pub fn graph(&self) -> &MembershipGraph<S> {
        &self.graph
    }

    /// The permission store.
    pub fn permissions(&self) -> &PermissionStore<S> {
        &self.permissions
    }

    /// The permission matcher.
    pub fn matcher(&self) -> &PermissionMatcher<S> {
        &self.matcher
    }

    /// The check audit, when auditing is enabled.
    pub fn audit(&self) -> Option<&CheckAudit> {
        self.matcher.audit()
    }

    /// Resolve a reference to an identifier.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(ObjectId))` - The identifier of the referenced entity.
    /// * `Ok(None)` - If nothing matches the reference.
    pub fn resolve(&self, reference: &Reference) -> Result<Option<ObjectId>> {
        self.resolver.resolve(reference)
    }

    /// Find the entity a reference names.
    pub fn find(&self, reference: &Reference) -> Result<Option<Entity>> {
        self.registry.find(reference)
    }

    /// Every entity of a kind, in creation order.
    pub fn list(&self, kind: EntityKind) -> Result<Vec<Entity>> {
        self.registry.list(kind)
    }

    /// Create an identity. See [`EntityRegistry::create_identity`].
    pub fn create_identity(&self, identity: NewIdentity) -> Result<ObjectId> {
        self.registry.create_identity(identity)
    }

    /// Create a group.
    pub fn create_group(&self, group: NewGroup) -> Result<ObjectId> {
        self.registry.create_group(group)
    }

    /// Create an item.
    pub fn create_item(&self, item: NewItem) -> Result<ObjectId> {
        self.registry.create_item(item)
    }

    /// Make `member` a direct member of `group`.
    ///
    /// # Arguments
    ///
    /// * `member` - An existing identity or group.
    /// * `group` - An existing identity or group.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the edge was added.
    /// * `Ok(false)` - If the edge was already present.
    /// * `Err(Error::UnknownPrincipal)` - If either endpoint is not a principal.
    pub fn add_membership(&self, member: ObjectId, group: ObjectId) -> Result<bool> {
        self.graph.add_membership(member, group)
    }

    /// Remove a direct membership edge, returning whether it existed.
    pub fn remove_membership(&self, member: &ObjectId, group: &ObjectId) -> Result<bool> {
        self.graph.remove_membership(member, group)
    }

    /// Every node `start` reaches through membership, itself included.
    pub fn closure(&self, start: &ObjectId) -> Result<HashSet<ObjectId>> {
        self.graph.closure(start)
    }

    /// The closure of `start` with hop distances.
    pub fn memberships(&self, start: &ObjectId) -> Result<Vec<Level>> {
        self.graph.memberships(start)
    }

    /// Every principal that reaches `group`.
    pub fn members(&self, group: &ObjectId) -> Result<HashSet<ObjectId>> {
        self.graph.members(group)
    }

    /// The membership tree, rooted at `root` or at every root group.
    ///
    /// Rows come out depth first, each with its depth below the root.
    pub fn member_tree(&self, root: Option<ObjectId>) -> Result<Vec<TreeRow>> {
        self.graph.member_tree(root)
    }

    /// Store one grant. See [`PermissionStore::add_permission`].
    pub fn add_permission(&self, request: GrantRequest) -> Result<bool> {
        self.permissions.add_permission(request)
    }

    /// Store a batch of grants.
    ///
    /// The batch is validated as a whole; one invalid request stores
    /// nothing.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - How many grants were new.
    /// * `Err(Error::Validation)` - If any request is invalid.
    pub fn add_permissions(&self, requests: &[GrantRequest]) -> Result<usize> {
        self.permissions.add_permissions(requests)
    }

    /// Remove the grant with this triple, returning whether it existed.
    ///
    /// Fails with `UnknownPrincipal` or `UnknownItem` when an endpoint is
    /// not stored.
    pub fn revoke_permission(
        &self,
        subject: &ObjectId,
        privilege: &str,
        object: &ObjectId,
    ) -> Result<bool> {
        self.permissions.revoke_permission(subject, privilege, object)
    }

    /// The `(privilege, object)` pairs `subject` holds directly.
    pub fn permissions_for(&self, subject: &ObjectId) -> Result<Vec<(Privilege, ObjectId)>> {
        self.permissions.permissions_for(subject)
    }

    /// The grants `subject` holds directly.
    pub fn grants_for(&self, subject: &ObjectId) -> Result<Vec<Grant>> {
        self.permissions.grants_for(subject)
    }

    /// See [`PermissionMatcher::has_permission`].
    pub fn has_permission(
        &self,
        subject: &Reference,
        privilege: &str,
        object: &Reference,
    ) -> Result<bool> {
        self.matcher.has_permission(subject, privilege, object)
    }

    /// Whether `subject` holds `privilege` on `object` at `when`.
    pub fn has_permission_at(
        &self,
        subject: &Reference,
        privilege: &str,
        object: &Reference,
        when: DateTime<Utc>,
    ) -> Result<bool> {
        self.matcher.has_permission_at(subject, privilege, object, when)
    }

    /// The grant that allows an access at `when`, and the principal in the
    /// subject's closure that holds it.
    pub fn find_grant(
        &self,
        subject: &Reference,
        privilege: &str,
        object: &Reference,
        when: DateTime<Utc>,
    ) -> Result<Option<Match>> {
        self.matcher.find_grant(subject, privilege, object, when)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_store::InMemoryStorage;

    #[test]
    fn test_audit_follows_config() {
        let storage = Arc::new(InMemoryStorage::new());
        assert!(Rbac::new(Arc::clone(&storage)).audit().is_none());

        let mut config = WardenConfig::default();
        config.audit.enabled = true;
        config.audit.max_entries_per_subject = 2;
        let rbac = Rbac::with_config(storage, &config);

        let user = rbac.create_identity(NewIdentity::with_email("u@example.com")).unwrap();
        for _ in 0..3 {
            rbac.has_permission(&user.into(), "read", &user.into()).unwrap();
        }
        assert_eq!(rbac.audit().unwrap().decisions_for(&user).len(), 2);
    }

    #[test]
    fn test_facade_shares_storage() {
        let rbac = Rbac::new(Arc::new(InMemoryStorage::new()));
        let user = rbac.create_identity(NewIdentity::with_email("u@example.com")).unwrap();
        let group = rbac.create_group(NewGroup::named("g")).unwrap();
        let item = rbac.create_item(NewItem::named("doc")).unwrap();

        rbac.add_membership(user, group).unwrap();
        rbac.add_permission(GrantRequest::new(group, "read", item)).unwrap();

        assert!(rbac.has_permission(&user.into(), "read", &item.into()).unwrap());
        assert_eq!(rbac.storage().entity_count(), 3);
    }
}
