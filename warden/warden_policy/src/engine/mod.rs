//! Permission check engine.
//!
//! This module provides the matcher that answers permission checks and the
//! audit that records its decisions.

pub mod audit;
pub mod matcher;

pub use audit::{CheckAudit, Decision};
pub use matcher::{grant_matches, Match, PermissionMatcher};
