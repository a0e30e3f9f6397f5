//! Entity registration.
//!
//! This module creates identities, groups and items and reads them back.

use std::sync::Arc;

use warden_core::error::{Error, Result};
use warden_core::id::ObjectId;
use warden_core::log_event;
use warden_core::traits::Storage;
use warden_core::types::{Credential, Entity, EntityKind, Reference};
use warden_core::utils::LogLevel;

use crate::integration::IdentifierResolver;

/// The fields of a new identity.
#[derive(Debug, Clone, Default)]
pub struct NewIdentity {
    /// A caller-chosen identifier. A fresh one is generated when absent.
    pub id: Option<ObjectId>,

    /// The email address, used as the natural key.
    pub email: Option<String>,

    /// Given name.
    pub firstname: Option<String>,

    /// Family name.
    pub lastname: Option<String>,

    /// Full display name.
    pub fullname: Option<String>,

    /// An already-encoded credential.
    pub credential: Option<Credential>,
}

impl NewIdentity {
    /// An identity with the given email.
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }

    /// Use a caller-chosen identifier.
    pub fn id(mut self, id: ObjectId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the given and family names.
    pub fn names(mut self, firstname: impl Into<String>, lastname: impl Into<String>) -> Self {
        self.firstname = Some(firstname.into());
        self.lastname = Some(lastname.into());
        self
    }

    /// Set the full display name.
    pub fn fullname(mut self, fullname: impl Into<String>) -> Self {
        self.fullname = Some(fullname.into());
        self
    }

    /// Set the encoded credential.
    pub fn credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }
}

/// The fields of a new group.
#[derive(Debug, Clone, Default)]
pub struct NewGroup {
    /// A caller-chosen identifier.
    pub id: Option<ObjectId>,

    /// The group name, used as the natural key.
    pub name: Option<String>,
}

impl NewGroup {
    /// A group with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }

    /// Use a caller-chosen identifier.
    pub fn id(mut self, id: ObjectId) -> Self {
        self.id = Some(id);
        self
    }
}

/// The fields of a new item.
#[derive(Debug, Clone, Default)]
pub struct NewItem {
    /// A caller-chosen identifier.
    pub id: Option<ObjectId>,

    /// The item name, used as the natural key.
    pub name: Option<String>,
}

impl NewItem {
    /// An item with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }

    /// Use a caller-chosen identifier.
    pub fn id(mut self, id: ObjectId) -> Self {
        self.id = Some(id);
        self
    }
}

/// Creates and reads entities.
pub struct EntityRegistry<S: ?Sized> {
    /// The storage collaborator.
    storage: Arc<S>,

    /// Resolver for [`EntityRegistry::find`].
    resolver: IdentifierResolver<S>,
}

impl<S: ?Sized> Clone for EntityRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            resolver: self.resolver.clone(),
        }
    }
}

impl<S> EntityRegistry<S>
where
    S: Storage + ?Sized,
{
    /// Create a new registry.
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            resolver: IdentifierResolver::new(Arc::clone(&storage)),
            storage,
        }
    }

    /// Create an identity.
    ///
    /// # Arguments
    ///
    /// * `identity` - The fields of the identity.
    ///
    /// # Returns
    ///
    /// * `Ok(ObjectId)` - The identifier of the new identity.
    /// * `Err(Error::DuplicateIdentifier)` - If the requested identifier is
    ///   already assigned or is the universal marker.
    pub fn create_identity(&self, identity: NewIdentity) -> Result<ObjectId> {
        let mut entity = Entity::new(self.assign_id(identity.id)?, EntityKind::Identity);
        if let Some(email) = identity.email {
            entity = entity.with_key(email);
        }
        entity.firstname = identity.firstname;
        entity.lastname = identity.lastname;
        entity.fullname = identity.fullname;
        entity.credential = identity.credential;
        self.insert(entity)
    }

    /// Create a group.
    pub fn create_group(&self, group: NewGroup) -> Result<ObjectId> {
        let mut entity = Entity::new(self.assign_id(group.id)?, EntityKind::Group);
        if let Some(name) = group.name {
            entity = entity.with_key(name);
        }
        self.insert(entity)
    }

    /// Create an item.
    pub fn create_item(&self, item: NewItem) -> Result<ObjectId> {
        let mut entity = Entity::new(self.assign_id(item.id)?, EntityKind::Item);
        if let Some(name) = item.name {
            entity = entity.with_key(name);
        }
        self.insert(entity)
    }

    /// Get an entity by identifier.
    pub fn get(&self, id: &ObjectId) -> Result<Option<Entity>> {
        self.storage.lookup_by_id(id)
    }

    /// Find an entity by any reference.
    pub fn find(&self, reference: &Reference) -> Result<Option<Entity>> {
        self.resolver.resolve_entity(reference)
    }

    /// List every entity of a kind, in creation order.
    pub fn list(&self, kind: EntityKind) -> Result<Vec<Entity>> {
        self.storage.list_rows(kind)
    }

    fn assign_id(&self, requested: Option<ObjectId>) -> Result<ObjectId> {
        match requested {
            None => loop {
                let id = ObjectId::new();
                if !id.is_universal() && self.storage.lookup_by_id(&id)?.is_none() {
                    return Ok(id);
                }
            },
            Some(id) if id.is_universal() => Err(Error::DuplicateIdentifier(id)),
            Some(id) => {
                if self.storage.lookup_by_id(&id)?.is_some() {
                    return Err(Error::DuplicateIdentifier(id));
                }
                Ok(id)
            }
        }
    }

    fn insert(&self, entity: Entity) -> Result<ObjectId> {
        let kind = entity.kind;
        let name = entity.display_name();
        let id = self.storage.insert_row(entity)?;
        log_event!(LogLevel::Info, "Entity created",
            kind => kind,
            id => id,
            name => name,
        );
        Ok(id)
    }
}
