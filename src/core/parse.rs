//! Identifier extraction from external tool output
//!
//! Compiled once and shared, following the same pattern for every tool whose
//! free-text output we need to read:
//! - `nexus-network register-node` for the new node id
//! - `screen -ls` for running session names
//! - `ldd --version` for the installed GLIBC version

use once_cell::sync::Lazy;
use regex::Regex;

static ANSI_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").expect("Invalid regex pattern")
});

static NODE_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:Node registered successfully with ID|Successfully registered node with ID):\s*([A-Za-z0-9-]+)",
    )
    .expect("Invalid regex pattern")
});

static NODE_ID_FALLBACK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:Node ID|ID):\s*(\w+)").expect("Invalid regex pattern")
});

static SCREEN_SESSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s+(\d+\.[^\s(]+)").expect("Invalid regex pattern")
});

static LDD_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"ldd\s+\(.*\)\s+([\d.]+)").expect("Invalid regex pattern")
});

static TRAILING_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+\.\d+)\s*$").expect("Invalid regex pattern")
});

/// Remove terminal color sequences
pub fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}

/// Find the node id in `register-node` output.
///
/// The explicit success sentence is preferred; older CLI releases only print
/// a `Node ID: <id>` line, which is accepted as a fallback.
pub fn extract_node_id(output: &str) -> Option<String> {
    let clean = strip_ansi(output);

    if let Some(caps) = NODE_ID_PATTERN.captures(&clean) {
        return caps.get(1).map(|m| m.as_str().trim().to_string());
    }

    clean.lines().find_map(|line| {
        NODE_ID_FALLBACK
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

/// Session names (`<pid>.<name>`) listed by `screen -ls`, in listing order
pub fn parse_screen_sessions(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| SCREEN_SESSION.captures(line))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// GLIBC version from the first line of `ldd --version`
pub fn parse_glibc_version(output: &str) -> Option<String> {
    let first = output.lines().next()?.trim();

    LDD_VERSION
        .captures(first)
        .or_else(|| TRAILING_VERSION.captures(first))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end_matches('.').to_string())
        .filter(|v| !v.is_empty())
}
