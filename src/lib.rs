//! # nexus-node-tool
//!
//! Interactive installer and manager for Nexus network prover nodes.
//!
//! The crate is split the same way the tool runs:
//!
//! - [`core`]: the persisted node configuration and the text parsers that pull
//!   identifiers out of external tool output
//! - [`runtime`]: subprocess execution and host environment discovery
//! - `cli` (feature `cli`): menus, actions, screen session handling and the
//!   optional dual-panel UI (feature `tui`)
//!
//! Every action is a parameterized call to an external program: `apt`,
//! `rustup`, the `nexus-network` CLI, `screen`, swap utilities or `reboot`.

pub mod core;
pub mod runtime;

#[cfg(feature = "cli")]
pub mod cli;

pub use crate::core::{Error, NodeConfig, Result};
pub use crate::runtime::{CommandSpec, Executor, ProcessExecutor};
