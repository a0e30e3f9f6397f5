//! Configuration.
//!
//! Configuration is read from TOML. Every section is optional and falls
//! back to its defaults, so an empty file is a valid configuration.
//!
//! ```toml
//! [logging]
//! level = "info"
//!
//! [grants]
//! default_starts = "2000-01-01T00:00:00Z"
//! default_ends = "3000-01-01T00:00:00Z"
//!
//! [audit]
//! enabled = true
//! max_entries_per_subject = 100
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{default_ends, default_starts};
use crate::utils::logging::LogLevel;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    /// Logging settings.
    pub logging: LoggingConfig,

    /// Defaults applied to new grants.
    pub grants: GrantConfig,

    /// Permission check auditing.
    pub audit: AuditConfig,
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level to emit.
    pub level: LogLevel,
}

/// Defaults applied to grants that do not specify a validity window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrantConfig {
    /// Start of the default window.
    pub default_starts: DateTime<Utc>,

    /// End of the default window.
    pub default_ends: DateTime<Utc>,
}

impl Default for GrantConfig {
    fn default() -> Self {
        Self {
            default_starts: default_starts(),
            default_ends: default_ends(),
        }
    }
}

/// Permission check auditing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Whether decisions are recorded.
    pub enabled: bool,

    /// How many decisions to keep per subject.
    pub max_entries_per_subject: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_entries_per_subject: 100,
        }
    }
}

impl WardenConfig {
    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// `Error::Config` if the text is not valid TOML, does not match the
    /// configuration layout, or has a default window that does not end
    /// after it starts.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Render this configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        if self.grants.default_starts >= self.grants.default_ends {
            return Err(Error::Config(
                "grants.default_ends must be after grants.default_starts".to_string(),
            ));
        }
        Ok(())
    }
}
