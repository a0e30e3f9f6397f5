//! Core interfaces for the system.
//!
//! - **storage**: the persistence collaborator every component reads and
//!   writes through

pub mod storage;

pub use storage::{EdgeKind, Storage};
