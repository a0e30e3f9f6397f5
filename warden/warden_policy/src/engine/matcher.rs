//! Permission matching.
//!
//! This module decides whether a subject holds a privilege on an object,
//! directly or through any group it reaches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use warden_core::error::{Error, Result};
use warden_core::id::ObjectId;
use warden_core::traits::Storage;
use warden_core::types::{Grant, Privilege, Reference};

use crate::engine::audit::{CheckAudit, Decision};
use crate::graph::MembershipGraph;
use crate::integration::IdentifierResolver;

/// A grant that satisfied a check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// The matching grant.
    pub grant: Grant,

    /// The principal holding it: the subject itself or one of its groups.
    pub via: ObjectId,

    /// Hops from the subject to `via`.
    pub level: u32,
}

/// Whether a stored grant satisfies a request for `requested` on `object`.
///
/// A `*` grant satisfies any privilege. A request for `*` is satisfied only
/// by a literal `*` grant. Objects are compared exactly, so the universal
/// marker only meets grants on the universal marker.
pub fn grant_matches(
    grant: &Grant,
    requested: &Privilege,
    object: &ObjectId,
    when: DateTime<Utc>,
) -> bool {
    grant.object == *object
        && (grant.privilege == *requested || grant.privilege.is_wildcard())
        && grant.is_active_at(when)
}

/// Evaluates permission checks.
pub struct PermissionMatcher<S: ?Sized> {
    /// The storage collaborator.
    storage: Arc<S>,

    /// Resolves subject and object references.
    resolver: IdentifierResolver<S>,

    /// Expands a subject into the principals it acts as.
    graph: MembershipGraph<S>,

    /// Where decisions are recorded, if anywhere.
    audit: Option<CheckAudit>,
}

impl<S: ?Sized> Clone for PermissionMatcher<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            resolver: self.resolver.clone(),
            graph: self.graph.clone(),
            audit: self.audit.clone(),
        }
    }
}

impl<S> PermissionMatcher<S>
where
    S: Storage + ?Sized,
{
    /// Create a new matcher.
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            resolver: IdentifierResolver::new(Arc::clone(&storage)),
            graph: MembershipGraph::new(Arc::clone(&storage)),
            storage,
            audit: None,
        }
    }

    /// Record every resolved decision in `audit`.
    pub fn with_audit(mut self, audit: CheckAudit) -> Self {
        self.audit = Some(audit);
        self
    }

    /// The audit log, if one is attached.
    pub fn audit(&self) -> Option<&CheckAudit> {
        self.audit.as_ref()
    }

    /// Whether `subject` holds `privilege` on `object` now.
    ///
    /// # Arguments
    ///
    /// * `subject` - The principal asking, by any reference.
    /// * `privilege` - The privilege token. `*` asks for the wildcard grant.
    /// * `object` - The object, by any reference.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If a grant held by the subject or one of its groups
    ///   matches.
    /// * `Ok(false)` - If nothing matches, including when a reference does
    ///   not resolve or is malformed.
    /// * `Err` - If the storage collaborator failed.
    pub fn has_permission(
        &self,
        subject: &Reference,
        privilege: &str,
        object: &Reference,
    ) -> Result<bool> {
        self.has_permission_at(subject, privilege, object, Utc::now())
    }

    /// Whether `subject` holds `privilege` on `object` at `when`.
    pub fn has_permission_at(
        &self,
        subject: &Reference,
        privilege: &str,
        object: &Reference,
        when: DateTime<Utc>,
    ) -> Result<bool> {
        Ok(self.find_grant(subject, privilege, object, when)?.is_some())
    }

    /// Find the nearest grant that satisfies a check at `when`.
    ///
    /// The subject itself is searched first, then its groups in order of
    /// distance.
    pub fn find_grant(
        &self,
        subject: &Reference,
        privilege: &str,
        object: &Reference,
        when: DateTime<Utc>,
    ) -> Result<Option<Match>> {
        let requested = Privilege::new(privilege);
        if requested.is_empty() {
            return Ok(None);
        }

        let (Some(subject), Some(object)) = (self.resolve(subject)?, self.resolve(object)?) else {
            log::debug!("Check on unresolved reference denied");
            return Ok(None);
        };

        let found = self.search(&subject, &requested, &object, when)?;
        log::debug!(
            "Check {} {} {}: {}",
            subject,
            requested,
            object,
            if found.is_some() { "allowed" } else { "denied" }
        );

        if let Some(audit) = &self.audit {
            audit.record(Decision {
                subject,
                privilege: requested,
                object,
                allowed: found.is_some(),
                via: found.as_ref().map(|m| m.via),
                at: when,
            });
        }

        Ok(found)
    }

    fn search(
        &self,
        subject: &ObjectId,
        requested: &Privilege,
        object: &ObjectId,
        when: DateTime<Utc>,
    ) -> Result<Option<Match>> {
        for candidate in self.graph.memberships(subject)? {
            let grants = self.storage.query_triples(&candidate.id)?;
            if let Some(grant) = grants
                .into_iter()
                .find(|grant| grant_matches(grant, requested, object, when))
            {
                return Ok(Some(Match {
                    grant,
                    via: candidate.id,
                    level: candidate.level,
                }));
            }
        }
        Ok(None)
    }

    /// Resolve a reference, treating malformed ones as unresolvable.
    fn resolve(&self, reference: &Reference) -> Result<Option<ObjectId>> {
        match self.resolver.resolve(reference) {
            Err(Error::InvalidReference(reason)) => {
                log::debug!("Ignoring invalid reference: {}", reason);
                Ok(None)
            }
            other => other,
        }
    }
}
