//! Permission storage.
//!
//! This module records which principal holds which privilege on which
//! object.

mod validation;

use std::sync::Arc;

use warden_core::error::{Error, Result};
use warden_core::id::ObjectId;
use warden_core::log_event;
use warden_core::traits::Storage;
use warden_core::types::{Grant, GrantRequest, Privilege};
use warden_core::utils::{GrantConfig, LogLevel};

use crate::integration::IdentifierResolver;
use validation::GrantValidator;

/// Stores and revokes grants.
pub struct PermissionStore<S: ?Sized> {
    /// The storage collaborator.
    storage: Arc<S>,

    /// Resolves the references of incoming requests.
    resolver: IdentifierResolver<S>,

    /// Window applied to requests that leave it open.
    defaults: GrantConfig,
}

impl<S: ?Sized> Clone for PermissionStore<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            resolver: self.resolver.clone(),
            defaults: self.defaults.clone(),
        }
    }
}

impl<S> PermissionStore<S>
where
    S: Storage + ?Sized,
{
    /// Create a permission store with the built-in default window.
    pub fn new(storage: Arc<S>) -> Self {
        Self::with_defaults(storage, GrantConfig::default())
    }

    /// Create a permission store with a configured default window.
    pub fn with_defaults(storage: Arc<S>, defaults: GrantConfig) -> Self {
        Self {
            resolver: IdentifierResolver::new(Arc::clone(&storage)),
            storage,
            defaults,
        }
    }

    /// Store a single grant.
    ///
    /// # Arguments
    ///
    /// * `request` - The grant to store.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the grant was stored.
    /// * `Ok(false)` - If the same triple was already stored. The stored
    ///   window is left as it was.
    /// * `Err(Error::Validation)` - If the request was refused.
    pub fn add_permission(&self, request: GrantRequest) -> Result<bool> {
        Ok(self.add_permissions(std::slice::from_ref(&request))? == 1)
    }

    /// Store a batch of grants.
    ///
    /// Every request is validated before the first write, so a refused
    /// request leaves the store untouched. Repeated triples, within the
    /// batch or against stored grants, are written once.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - The number of newly stored grants.
    /// * `Err(Error::Validation)` - Naming the first refused request.
    pub fn add_permissions(&self, requests: &[GrantRequest]) -> Result<usize> {
        let grants = match GrantValidator::new(&self.resolver, &self.defaults).validate_all(requests)
        {
            Ok(grants) => grants,
            Err(err) => {
                log_event!(LogLevel::Warning, "Grant batch refused",
                    requests => requests.len(),
                    error => err,
                );
                return Err(err);
            }
        };

        let mut stored = 0;
        for grant in grants {
            let description = grant.to_string();
            if self.storage.insert_triple(grant)? {
                stored += 1;
                log_event!(LogLevel::Info, "Grant stored", grant => description);
            } else {
                log::debug!("Grant {} already present", description);
            }
        }
        Ok(stored)
    }

    /// Remove the grant with the given triple.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If a grant was removed.
    /// * `Ok(false)` - If both endpoints exist but hold no such grant.
    /// * `Err(Error::UnknownPrincipal)` - If `subject` is not a stored
    ///   identity or group.
    /// * `Err(Error::UnknownItem)` - If `object` is neither a stored entity
    ///   nor the universal marker.
    pub fn revoke_permission(
        &self,
        subject: &ObjectId,
        privilege: &str,
        object: &ObjectId,
    ) -> Result<bool> {
        match self.storage.lookup_by_id(subject)? {
            Some(entity) if entity.is_principal() => {}
            _ => return Err(Error::UnknownPrincipal(*subject)),
        }
        if !object.is_universal() && self.storage.lookup_by_id(object)?.is_none() {
            return Err(Error::UnknownItem(*object));
        }

        let privilege = Privilege::new(privilege);
        let removed = self.storage.remove_triple(subject, &privilege, object)?;
        if removed {
            log_event!(LogLevel::Info, "Grant revoked",
                subject => subject,
                privilege => privilege,
                object => object,
            );
        }
        Ok(removed)
    }

    /// The grants held directly by `subject`, without their windows.
    pub fn permissions_for(&self, subject: &ObjectId) -> Result<Vec<(Privilege, ObjectId)>> {
        Ok(self
            .grants_for(subject)?
            .into_iter()
            .map(|grant| (grant.privilege, grant.object))
            .collect())
    }

    /// The grants held directly by `subject`.
    pub fn grants_for(&self, subject: &ObjectId) -> Result<Vec<Grant>> {
        self.storage.query_triples(subject)
    }

    /// The default validity window.
    pub fn defaults(&self) -> &GrantConfig {
        &self.defaults
    }
}
