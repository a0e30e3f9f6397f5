//! Utility functions and types.
//!
//! Logging levels and configuration loading.

pub mod config;
pub mod logging;

pub use config::{AuditConfig, GrantConfig, LoggingConfig, WardenConfig};
pub use logging::LogLevel;
