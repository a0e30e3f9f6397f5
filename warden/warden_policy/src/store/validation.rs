//! Grant validation.
//!
//! A batch of grant requests is checked in full before anything is written.

use chrono::{DateTime, Utc};

use warden_core::error::{Error, Result, ValidationError, ValidationReason};
use warden_core::id::ObjectId;
use warden_core::traits::Storage;
use warden_core::types::{Entity, Grant, GrantRequest, Privilege, Reference};
use warden_core::utils::GrantConfig;

use crate::integration::IdentifierResolver;

/// Checks grant requests against stored entities.
pub(crate) struct GrantValidator<'a, S: ?Sized> {
    resolver: &'a IdentifierResolver<S>,
    defaults: &'a GrantConfig,
}

impl<'a, S> GrantValidator<'a, S>
where
    S: Storage + ?Sized,
{
    pub(crate) fn new(resolver: &'a IdentifierResolver<S>, defaults: &'a GrantConfig) -> Self {
        Self { resolver, defaults }
    }

    /// Validate every request and build the grants to store.
    ///
    /// The first failing request stops validation with its index. Storage
    /// failures are passed through unchanged.
    pub(crate) fn validate_all(&self, requests: &[GrantRequest]) -> Result<Vec<Grant>> {
        requests
            .iter()
            .enumerate()
            .map(|(index, request)| {
                self.validate(request)?
                    .map_err(|reason| Error::Validation(ValidationError::new(index, reason)))
            })
            .collect()
    }

    /// Validate a single request.
    ///
    /// The outer result carries storage failures; the inner one the reason
    /// a well-formed request was refused.
    fn validate(&self, request: &GrantRequest) -> Result<std::result::Result<Grant, ValidationReason>> {
        let privilege = Privilege::new(&request.privilege);
        if privilege.is_empty() {
            return Ok(Err(ValidationReason::EmptyPrivilege));
        }

        let subject = match self.lookup(&request.subject)? {
            Some(entity) if entity.is_principal() => entity.id,
            _ => return Ok(Err(ValidationReason::UnknownSubject(request.subject.to_string()))),
        };

        if request.object.is_wildcard() {
            return Ok(Err(ValidationReason::WildcardObject));
        }
        let object = match self.lookup_object(&request.object)? {
            Some(id) => id,
            None => return Ok(Err(ValidationReason::UnknownObject(request.object.to_string()))),
        };

        let starts = request.starts.unwrap_or(self.defaults.default_starts);
        let ends = request.ends.unwrap_or(self.defaults.default_ends);
        if !window_is_valid(starts, ends) {
            return Ok(Err(ValidationReason::InvalidWindow));
        }

        Ok(Ok(Grant::new(subject, privilege, object).with_window(starts, ends)))
    }

    fn lookup(&self, reference: &Reference) -> Result<Option<Entity>> {
        match self.resolver.resolve_entity(reference) {
            Err(Error::InvalidReference(_)) => Ok(None),
            other => other,
        }
    }

    /// Objects may be any stored entity or the universal marker.
    fn lookup_object(&self, reference: &Reference) -> Result<Option<ObjectId>> {
        match reference {
            Reference::Id(id) if id.is_universal() => Ok(Some(*id)),
            Reference::Id(_) => Ok(self.lookup(reference)?.map(|entity| entity.id)),
            _ => match self.resolver.resolve(reference) {
                Err(Error::InvalidReference(_)) => Ok(None),
                other => other,
            },
        }
    }
}

fn window_is_valid(starts: DateTime<Utc>, ends: DateTime<Utc>) -> bool {
    starts < ends
}
