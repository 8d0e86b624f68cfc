//! Screen session management
//!
//! Background nodes live inside detached GNU `screen` sessions. This module
//! builds the `screen` invocations for listing, starting, attaching to,
//! quitting and snapshotting those sessions.

use crate::cli::error::{InteractiveError, Result};
use crate::cli::execution::Runner;
use crate::core::{parse_screen_sessions, SCREEN_NAME};
use crate::runtime::CommandSpec;
use rand::Rng;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Session name prefix for nodes started with default settings
pub const NODE_PREFIX: &str = "nexus";

/// Session name prefix for nodes started with a thread limit
pub const PROVER_PREFIX: &str = "nexus-prover";

/// How long a hardcopy may take to appear after `screen` accepted it
const HARDCOPY_WAIT: Duration = Duration::from_millis(500);

const HARDCOPY_POLL: Duration = Duration::from_millis(50);

/// Wraps the discovered `screen` executable
#[derive(Debug, Clone)]
pub struct ScreenManager {
    screen: PathBuf,
}

impl ScreenManager {
    pub fn new(screen: impl Into<PathBuf>) -> Self {
        Self {
            screen: screen.into(),
        }
    }

    /// Build a manager from an optional discovered path
    pub fn from_path(screen: Option<&Path>) -> Result<Self> {
        screen
            .map(Self::new)
            .ok_or_else(|| InteractiveError::ExecutableNotFound(SCREEN_NAME.to_string()))
    }

    fn command(&self) -> CommandSpec {
        CommandSpec::new(self.screen.to_string_lossy())
    }

    /// Running sessions as `<pid>.<name>`. `screen -ls` exits non-zero in
    /// several normal situations, so only its output is considered.
    pub async fn list(&self, runner: &Runner) -> Result<Vec<String>> {
        let output = runner.capture_quiet(&self.command().arg("-ls")).await?;
        let sessions = parse_screen_sessions(&output.combined());
        debug!("Found {} screen session(s)", sessions.len());
        Ok(sessions)
    }

    /// `screen -S <name> -dm bash -c <command>`
    pub fn start_spec(&self, name: &str, command: &CommandSpec) -> CommandSpec {
        self.command()
            .args(["-S", name, "-dm", "bash", "-c"])
            .arg(command.to_shell_line())
    }

    /// `screen -r <session>`
    pub fn attach_spec(&self, session: &str) -> CommandSpec {
        self.command().args(["-r", session])
    }

    /// `screen -X -S <session> quit`
    pub fn quit_spec(&self, session: &str) -> CommandSpec {
        self.command().args(["-X", "-S", session, "quit"])
    }

    /// `screen -S <session> -X hardcopy -h <file>`
    pub fn hardcopy_spec(&self, session: &str, file: &Path) -> CommandSpec {
        self.command()
            .args(["-S", session, "-X", "hardcopy", "-h"])
            .arg(file.to_string_lossy())
    }

    /// Snapshot of the session's scrollback and visible window, or `None`
    /// when the session has not written it yet. `screen -X` only queues the
    /// command, so the file shows up some time after `screen` returns.
    pub async fn hardcopy(&self, runner: &Runner, session: &str) -> Result<Option<Vec<String>>> {
        let dir = tempfile::Builder::new().prefix("screen_log_").tempdir()?;
        let file = dir.path().join("hardcopy.txt");

        let output = runner
            .capture_quiet(&self.hardcopy_spec(session, &file))
            .await?;
        if !output.success() {
            return Err(InteractiveError::invalid_input(format!(
                "screen session '{}' is not available",
                session
            )));
        }

        let mut waited = Duration::ZERO;
        while !file.exists() {
            if waited >= HARDCOPY_WAIT {
                debug!("Hardcopy of {} not written yet", session);
                return Ok(None);
            }
            tokio::time::sleep(HARDCOPY_POLL).await;
            waited += HARDCOPY_POLL;
        }

        let content = std::fs::read(&file)?;
        Ok(Some(
            String::from_utf8_lossy(&content)
                .lines()
                .map(|l| l.trim_end().to_string())
                .collect(),
        ))
    }
}

/// `<prefix>-NNN` with a random three-digit suffix
pub fn random_session_name(prefix: &str) -> String {
    let suffix: u16 = rand::thread_rng().gen_range(100..=999);
    format!("{}-{}", prefix, suffix)
}

/// Screen names are passed as a single argument and later shown in
/// `screen -ls`, so whitespace and the `.` pid separator are rejected.
pub fn validate_session_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(InteractiveError::invalid_input("Session name cannot be empty"));
    }
    if name.chars().any(|c| c.is_whitespace() || c == '.' || c.is_control()) {
        return Err(InteractiveError::invalid_input(format!(
            "Session name '{}' may not contain spaces or dots",
            name
        )));
    }
    Ok(())
}
