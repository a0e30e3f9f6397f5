//! Identifier resolution.
//!
//! This module turns caller references into canonical identifiers.

use serde_json::Value;
use std::sync::Arc;

use warden_core::error::{Error, Result};
use warden_core::id::ObjectId;
use warden_core::traits::Storage;
use warden_core::types::{normalize_key, Entity, Reference};

/// A resolver that normalizes references into identifiers.
///
/// Resolution is read-only. An unresolvable reference is `Ok(None)`, so
/// the caller chooses the policy (deny, default, error). Only references
/// with an unusable shape raise `Error::InvalidReference`.
pub struct IdentifierResolver<S: ?Sized> {
    /// The storage collaborator.
    storage: Arc<S>,
}

impl<S: ?Sized> Clone for IdentifierResolver<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<S> IdentifierResolver<S>
where
    S: Storage + ?Sized,
{
    /// Create a new resolver.
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// Resolve a reference to an identifier.
    ///
    /// * A canonical identifier is returned unchanged.
    /// * A natural key is looked up across all entity kinds.
    /// * A lookup uses its identifier when that parses and names an
    ///   existing entity (or the universal object), and falls back to its
    ///   natural key otherwise.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(ObjectId))` - The identifier.
    /// * `Ok(None)` - If nothing matches.
    /// * `Err(Error::InvalidReference)` - If the reference is malformed.
    /// * `Err` - If the storage collaborator failed.
    pub fn resolve(&self, reference: &Reference) -> Result<Option<ObjectId>> {
        match reference {
            Reference::Id(id) => Ok(Some(*id)),
            Reference::Key(key) => Ok(self.lookup_key(key)?.map(|entity| entity.id)),
            Reference::Lookup { id, key } => {
                if let Some(id) = self.lookup_candidate_id(id.as_deref())? {
                    return Ok(Some(id));
                }
                self.lookup_fallback_key(id.as_deref(), key.as_deref())
                    .map(|found| found.map(|entity| entity.id))
            }
        }
    }

    /// Resolve a reference to the stored entity.
    ///
    /// Unlike [`IdentifierResolver::resolve`], a canonical identifier must
    /// name a stored entity, and the universal object resolves to `None`
    /// because it has no row.
    pub fn resolve_entity(&self, reference: &Reference) -> Result<Option<Entity>> {
        match reference {
            Reference::Id(id) => self.storage.lookup_by_id(id),
            Reference::Key(key) => self.lookup_key(key),
            Reference::Lookup { id, key } => {
                if let Some(id) = self.lookup_candidate_id(id.as_deref())? {
                    if let Some(entity) = self.storage.lookup_by_id(&id)? {
                        return Ok(Some(entity));
                    }
                }
                self.lookup_fallback_key(id.as_deref(), key.as_deref())
            }
        }
    }

    /// Resolve a structured JSON reference.
    ///
    /// See [`Reference::from_value`] for the accepted shapes.
    pub fn resolve_value(&self, value: &Value) -> Result<Option<ObjectId>> {
        self.resolve(&Reference::from_value(value)?)
    }

    /// Whether a reference resolves to anything.
    pub fn exists(&self, reference: &Reference) -> Result<bool> {
        match reference {
            Reference::Id(id) => Ok(id.is_universal() || self.storage.lookup_by_id(id)?.is_some()),
            _ => Ok(self.resolve(reference)?.is_some()),
        }
    }

    fn lookup_key(&self, key: &str) -> Result<Option<Entity>> {
        let key = normalize_key(key);
        if key.is_empty() {
            return Err(Error::InvalidReference("empty natural key".to_string()));
        }
        self.storage.lookup_by_natural_key(None, &key)
    }

    /// The identifier field of a lookup, if it is usable.
    fn lookup_candidate_id(&self, id: Option<&str>) -> Result<Option<ObjectId>> {
        let Some(parsed) = id.and_then(|text| text.parse::<ObjectId>().ok()) else {
            return Ok(None);
        };

        if parsed.is_universal() || self.storage.lookup_by_id(&parsed)?.is_some() {
            Ok(Some(parsed))
        } else {
            Ok(None)
        }
    }

    fn lookup_fallback_key(&self, id: Option<&str>, key: Option<&str>) -> Result<Option<Entity>> {
        match key {
            Some(key) if !key.trim().is_empty() => self.lookup_key(key),
            _ if id.is_some() => Ok(None),
            _ => Err(Error::InvalidReference(
                "lookup carries neither an identifier nor a key".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use warden_core::types::EntityKind;
    use warden_store::InMemoryStorage;

    fn setup() -> (IdentifierResolver<InMemoryStorage>, Arc<InMemoryStorage>, Entity) {
        let storage = Arc::new(InMemoryStorage::new());
        let alice = Entity::new(ObjectId::new(), EntityKind::Identity).with_key("alice@example.com");
        storage.insert_row(alice.clone()).unwrap();
        (IdentifierResolver::new(Arc::clone(&storage)), storage, alice)
    }

    #[test]
    fn test_canonical_id_returned_unchanged() {
        let (resolver, _, alice) = setup();
        assert_eq!(resolver.resolve(&Reference::Id(alice.id)).unwrap(), Some(alice.id));

        // Canonical identifiers are not looked up
        let ghost = ObjectId::new();
        assert_eq!(resolver.resolve(&Reference::Id(ghost)).unwrap(), Some(ghost));
        assert!(!resolver.exists(&Reference::Id(ghost)).unwrap());
    }

    #[test]
    fn test_natural_key_lookup() {
        let (resolver, _, alice) = setup();
        assert_eq!(
            resolver.resolve(&Reference::parse("Alice@Example.com")).unwrap(),
            Some(alice.id)
        );
        assert_eq!(resolver.resolve(&Reference::parse("bob@example.com")).unwrap(), None);
    }

    #[test]
    fn test_empty_key_is_invalid() {
        let (resolver, _, _) = setup();
        assert!(matches!(
            resolver.resolve(&Reference::Key("   ".into())),
            Err(Error::InvalidReference(_))
        ));
    }

    #[test]
    fn test_lookup_prefers_existing_id() {
        let (resolver, storage, alice) = setup();
        let bob = Entity::new(ObjectId::new(), EntityKind::Identity).with_key("bob@example.com");
        storage.insert_row(bob.clone()).unwrap();

        let reference = Reference::Lookup {
            id: Some(bob.id.to_string()),
            key: Some("alice@example.com".into()),
        };
        assert_eq!(resolver.resolve(&reference).unwrap(), Some(bob.id));
        assert_eq!(resolver.resolve_entity(&reference).unwrap().unwrap().id, bob.id);

        // An unknown or malformed identifier falls back to the key
        for id in [ObjectId::new().to_string(), "not-a-uuid".to_string()] {
            let reference = Reference::Lookup {
                id: Some(id),
                key: Some("alice@example.com".into()),
            };
            assert_eq!(resolver.resolve(&reference).unwrap(), Some(alice.id));
        }
    }

    #[test]
    fn test_lookup_without_match_is_none() {
        let (resolver, _, _) = setup();
        let reference = Reference::Lookup {
            id: Some(ObjectId::new().to_string()),
            key: None,
        };
        assert_eq!(resolver.resolve(&reference).unwrap(), None);
    }

    #[test]
    fn test_lookup_without_fields_is_invalid() {
        let (resolver, _, _) = setup();
        let reference = Reference::Lookup { id: None, key: None };
        assert!(matches!(
            resolver.resolve(&reference),
            Err(Error::InvalidReference(_))
        ));
    }

    #[test]
    fn test_resolve_value() {
        let (resolver, _, alice) = setup();
        assert_eq!(
            resolver.resolve_value(&json!({"email": "alice@example.com"})).unwrap(),
            Some(alice.id)
        );
        assert_eq!(
            resolver.resolve_value(&json!(alice.id.to_string())).unwrap(),
            Some(alice.id)
        );
        assert!(matches!(
            resolver.resolve_value(&json!(12)),
            Err(Error::InvalidReference(_))
        ));
    }

    #[test]
    fn test_universal_object() {
        let (resolver, _, _) = setup();
        let universal = Reference::Id(ObjectId::universal());
        assert!(resolver.exists(&universal).unwrap());
        assert!(resolver.resolve_entity(&universal).unwrap().is_none());

        let lookup = Reference::Lookup {
            id: Some(ObjectId::universal().to_string()),
            key: None,
        };
        assert_eq!(resolver.resolve(&lookup).unwrap(), Some(ObjectId::universal()));
    }
}
