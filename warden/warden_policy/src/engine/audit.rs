//! Permission check auditing.
//!
//! This module records the outcome of permission checks.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use warden_core::id::ObjectId;
use warden_core::types::Privilege;

/// The recorded outcome of one permission check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// The resolved subject.
    pub subject: ObjectId,

    /// The requested privilege.
    pub privilege: Privilege,

    /// The resolved object.
    pub object: ObjectId,

    /// Whether access was allowed.
    pub allowed: bool,

    /// The principal whose grant allowed access.
    pub via: Option<ObjectId>,

    /// The instant the check was evaluated for.
    pub at: DateTime<Utc>,
}

/// A permission check audit.
///
/// Keeps the most recent decisions for each subject.
#[derive(Clone)]
pub struct CheckAudit {
    /// The audit entries.
    entries: Arc<DashMap<ObjectId, Vec<Decision>>>,

    /// The maximum number of entries to keep per subject.
    max_entries_per_subject: usize,
}

impl CheckAudit {
    /// Create a new check audit.
    ///
    /// # Arguments
    ///
    /// * `max_entries_per_subject` - The maximum number of entries to keep per subject.
    pub fn new(max_entries_per_subject: usize) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            max_entries_per_subject,
        }
    }

    /// Record a decision, dropping the oldest entries beyond the limit.
    pub fn record(&self, decision: Decision) {
        let mut entries = self.entries.entry(decision.subject).or_default();
        entries.push(decision);

        if entries.len() > self.max_entries_per_subject {
            let to_remove = entries.len() - self.max_entries_per_subject;
            entries.drain(0..to_remove);
        }
    }

    /// Get decisions for a subject, oldest first.
    pub fn decisions_for(&self, subject: &ObjectId) -> Vec<Decision> {
        self.entries
            .get(subject)
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Get every recorded decision.
    pub fn all_decisions(&self) -> Vec<Decision> {
        let mut all: Vec<Decision> = self
            .entries
            .iter()
            .flat_map(|entry| entry.value().clone())
            .collect();
        all.sort_by_key(|decision| decision.at);
        all
    }

    /// Forget decisions for a subject.
    pub fn clear_subject(&self, subject: &ObjectId) {
        self.entries.remove(subject);
    }

    /// Forget every decision.
    pub fn clear(&self) {
        self.entries.clear();
    }
}
