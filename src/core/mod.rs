//! Core types shared by every front end
//!
//! This module handles:
//! - The node configuration persisted between runs
//! - Extraction of identifiers from external command output
//! - The library error type

pub mod config;
pub mod error;
pub mod parse;


pub use config::NodeConfig;
pub use error::{Error, Result};
pub use parse::{extract_node_id, parse_glibc_version, parse_screen_sessions};

/// Name of the node client executable installed by the Nexus installer
pub const NEXUS_CLI_NAME: &str = "nexus-network";

/// Name of the terminal multiplexer executable
pub const SCREEN_NAME: &str = "screen";

/// File name of the configuration store inside the user's home directory
pub const CONFIG_FILE_NAME: &str = ".nexus_tool_config.json";
