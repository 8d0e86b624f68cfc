//! Output formatting and display utilities
//!
//! This module handles:
//! - Color coding for status, warnings and prompts
//! - Banners and separators around external command runs
//! - Dependency status lines

pub mod formatter;

// Re-export key types for convenience
pub use formatter::{banner, paint, separator, status_line, OutputStyle};
