//! State file handling.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use warden_core::WardenConfig;
use warden_policy::Rbac;
use warden_store::{InMemoryStorage, Snapshot};

/// An access-control state loaded from disk for one command.
pub struct Session {
    path: PathBuf,
    rbac: Rbac<InMemoryStorage>,
}

impl Session {
    /// Load the state at `path`, or start empty if the file does not exist.
    pub fn open(path: &Path, config: &WardenConfig) -> Result<Self> {
        let snapshot = if path.exists() {
            Snapshot::load_json(path)
                .with_context(|| format!("Failed to read state from {}", path.display()))?
        } else {
            log::debug!("No state at {}, starting empty", path.display());
            Snapshot::default()
        };

        let storage = InMemoryStorage::from_snapshot(&snapshot)
            .with_context(|| format!("Failed to restore state from {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            rbac: Rbac::with_config(Arc::new(storage), config),
        })
    }

    pub fn rbac(&self) -> &Rbac<InMemoryStorage> {
        &self.rbac
    }

    /// Write the current state back to disk.
    pub fn save(&self) -> Result<()> {
        self.rbac
            .storage()
            .snapshot()
            .save_json(&self.path)
            .with_context(|| format!("Failed to write state to {}", self.path.display()))
    }
}
