//! Command execution engine
//!
//! This module handles:
//! - Announcing each external command before it runs
//! - Reporting success or the failing exit code afterwards
//! - Running step sequences that stop at the first failure

pub mod runner;

// Re-export key types for convenience
pub use runner::Runner;
