//! Interactive front ends for managing Nexus prover nodes.
//! ## Usage
//!
//! ```bash
//! # Numbered menus
//! sudo nexus-tool
//!
//! # Dual-panel interface with the live session log
//! sudo nexus-tool --panel
//!
//! # Keep the configuration somewhere else
//! sudo nexus-tool --config /etc/nexus/tool.json
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod console;
pub mod error;
pub mod execution;
pub mod menu;
pub mod output;
pub mod session;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(test)]
pub mod testing;

#[cfg(test)]
mod error_test;

// Re-export commonly used types
pub use commands::{Action, Flow, NodeManager, RunMode};
pub use console::{Console, TerminalConsole};
pub use error::{InteractiveError, Result, UserFriendlyError};

/// Version information for the interactive CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
