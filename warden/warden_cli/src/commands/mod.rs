//! Command implementations
//!
//! Each submodule holds the arguments and the implementation of one group
//! of subcommands.

pub mod entity;
pub mod grant;
pub mod membership;
pub mod query;

use anyhow::{bail, Result};
use std::process::ExitCode;

use warden_core::{ObjectId, Reference};
use warden_policy::Rbac;
use warden_store::InMemoryStorage;

/// What a command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing was written.
    Unchanged,

    /// The state was modified and must be saved.
    Changed,

    /// A check was denied.
    Denied,
}

impl Outcome {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Unchanged | Self::Changed => ExitCode::SUCCESS,
            Self::Denied => ExitCode::from(1),
        }
    }
}

/// Resolve a command-line reference that must name something.
pub fn resolve_required(rbac: &Rbac<InMemoryStorage>, text: &str) -> Result<ObjectId> {
    match rbac.resolve(&Reference::parse(text))? {
        Some(id) => Ok(id),
        None => bail!("'{}' not found", text),
    }
}

/// A human-readable name for an identifier.
pub fn describe(rbac: &Rbac<InMemoryStorage>, id: &ObjectId) -> Result<String> {
    if id.is_universal() {
        return Ok("(universal)".to_string());
    }
    Ok(rbac
        .registry()
        .get(id)?
        .map(|entity| entity.display_name())
        .unwrap_or_else(|| id.to_string()))
}
