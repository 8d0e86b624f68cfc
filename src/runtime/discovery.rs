//! Host environment discovery
//!
//! The tool runs under `sudo`, so the interesting home directory is the one
//! of the invoking user rather than root's. Executables installed by the
//! Nexus and Rust installers land in that user's home, outside root's
//! `PATH`, hence the extended search list.

use nix::unistd::{geteuid, User};
use std::ffi::{OsStr, OsString};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::{NEXUS_CLI_NAME, SCREEN_NAME};

/// Directories searched after `PATH`
pub const EXTRA_SEARCH_DIRS: &[&str] = &[
    "/usr/bin",
    "/bin",
    "/usr/local/bin",
    "/sbin",
    "/usr/sbin",
    "/snap/bin",
];

/// True when running with an effective uid of 0
pub fn is_elevated() -> bool {
    geteuid().is_root()
}

/// Home directory of the user who invoked `sudo`, or of the current user
pub fn user_home() -> PathBuf {
    let sudo_user = std::env::var("SUDO_USER").ok();
    resolve_home(sudo_user.as_deref(), dirs::home_dir())
}

fn resolve_home(sudo_user: Option<&str>, fallback: Option<PathBuf>) -> PathBuf {
    if let Some(user) = sudo_user.filter(|u| !u.is_empty()) {
        if let Some(home) = passwd_home(user) {
            return home;
        }
        debug!("No passwd entry for SUDO_USER '{}'", user);
    }
    fallback.unwrap_or_else(|| PathBuf::from("/root"))
}

fn passwd_home(user: &str) -> Option<PathBuf> {
    match User::from_name(user) {
        Ok(entry) => entry.map(|u| u.dir),
        Err(e) => {
            debug!("passwd lookup for '{}' failed: {}", user, e);
            None
        }
    }
}

/// True for a regular file with any execute bit set
pub fn is_executable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Ordered, de-duplicated search list: `PATH`, the fixed system
/// directories, then `<home>/.local/bin`
pub fn search_dirs(path_var: Option<&OsStr>, user_home: Option<&Path>) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = path_var
        .map(|p| std::env::split_paths(p).collect())
        .unwrap_or_default();
    dirs.extend(EXTRA_SEARCH_DIRS.iter().map(PathBuf::from));
    if let Some(home) = user_home {
        dirs.push(home.join(".local").join("bin"));
    }

    let mut seen = std::collections::HashSet::new();
    dirs.retain(|d| !d.as_os_str().is_empty() && seen.insert(d.clone()));
    dirs
}

/// Locate `command` on the extended search list
pub fn find_executable(command: &str, user_home: Option<&Path>) -> Option<PathBuf> {
    let path_var: Option<OsString> = std::env::var_os("PATH");
    find_in(command, &search_dirs(path_var.as_deref(), user_home))
}

/// Locate `command` in the given directories
pub fn find_in(command: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    let candidate = Path::new(command);
    if candidate.is_absolute() {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }

    let joined = std::env::join_paths(dirs).ok()?;
    which::which_in(command, Some(joined), "/")
        .ok()
        .filter(|p| is_executable(p))
}

/// Absolute paths of the external tools the menus depend on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolPaths {
    pub screen: Option<PathBuf>,
    pub nexus_cli: Option<PathBuf>,
    pub rustc: Option<PathBuf>,
}

impl ToolPaths {
    /// Probe the host for every tool
    pub fn discover(user_home: &Path) -> Self {
        let rustc = user_home.join(".cargo").join("bin").join("rustc");
        let paths = Self {
            screen: find_executable(SCREEN_NAME, None),
            nexus_cli: find_executable(NEXUS_CLI_NAME, Some(user_home)),
            rustc: is_executable(&rustc).then_some(rustc),
        };
        debug!("Discovered tools: {:?}", paths);
        paths
    }
}
