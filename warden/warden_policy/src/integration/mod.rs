//! Integration with callers.
//!
//! This module provides the entry point that turns caller references into
//! identifiers.

pub mod resolver;

pub use resolver::IdentifierResolver;
