//! Subprocess execution
//!
//! Every action of the tool ends up here. A [`CommandSpec`] describes one
//! invocation; an [`Executor`] either streams it to the terminal (the child
//! inherits stdin/stdout/stderr) or captures its output for parsing.

use crate::core::error::{Error, Result};
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;
use tokio::process::Command;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{debug, warn};

/// Exit code after CTRL+C outside a foreground command, as shells report it
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

static FOREGROUND_CHILDREN: AtomicUsize = AtomicUsize::new(0);
static INTERRUPT_WATCHER: Once = Once::new();

/// One external program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    envs: Vec<(String, String)>,
    current_dir: Option<PathBuf>,
    script: Option<String>,
}

impl CommandSpec {
    /// Invoke `program` directly, without a shell
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            current_dir: None,
            script: None,
        }
    }

    /// Run `script` through `bash -c`, for pipelines and `&&` chains
    pub fn shell(script: impl Into<String>) -> Self {
        let script = script.into();
        Self {
            program: "bash".to_string(),
            args: vec!["-c".to_string(), script.clone()],
            envs: Vec::new(),
            current_dir: None,
            script: Some(script),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn get_envs(&self) -> &[(String, String)] {
        &self.envs
    }

    pub fn get_current_dir(&self) -> Option<&PathBuf> {
        self.current_dir.as_ref()
    }

    /// The full command as a single quoted shell line, suitable as the
    /// payload of `bash -c` (e.g. inside a screen session)
    pub fn to_shell_line(&self) -> String {
        let mut parts: Vec<String> = self
            .envs
            .iter()
            .map(|(k, v)| format!("{}={}", k, shell_quote(v)))
            .collect();
        parts.push(shell_quote(&self.program));
        parts.extend(self.args.iter().map(|a| shell_quote(a)));
        parts.join(" ")
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.script {
            Some(script) => {
                for (key, value) in &self.envs {
                    write!(f, "{}={} ", key, shell_quote(value))?;
                }
                f.write_str(script)
            }
            None => f.write_str(&self.to_shell_line()),
        }
    }
}

/// Output of a captured run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// stdout followed by stderr, the way `2>&1` would show a tool that
    /// writes its report and its warnings separately
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => {
                let mut out = self.stdout.clone();
                if !out.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str(&self.stderr);
                out
            }
        }
    }
}

/// Seam between the actions and the operating system
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run with the terminal attached and return the exit code
    async fn stream(&self, spec: &CommandSpec) -> Result<i32>;

    /// Run detached from the terminal and collect its output
    async fn capture(&self, spec: &CommandSpec) -> Result<CapturedOutput>;
}

/// What CTRL+C does to this process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptAction {
    /// The signal belongs to the attached child
    Ignore,
    /// Leave the menu with this exit code
    Exit(i32),
}

/// CTRL+C stops the attached command, or the tool itself when none runs
pub fn interrupt_action(child_running: bool) -> InterruptAction {
    if child_running {
        InterruptAction::Ignore
    } else {
        InterruptAction::Exit(INTERRUPTED_EXIT_CODE)
    }
}

/// True while a streamed child owns the terminal
pub fn foreground_child_running() -> bool {
    FOREGROUND_CHILDREN.load(Ordering::SeqCst) > 0
}

/// Marks a streamed child as running until dropped
struct ForegroundGuard;

impl ForegroundGuard {
    fn enter() -> Self {
        FOREGROUND_CHILDREN.fetch_add(1, Ordering::SeqCst);
        Self
    }
}

impl Drop for ForegroundGuard {
    fn drop(&mut self) {
        FOREGROUND_CHILDREN.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Take over SIGINT for the rest of the process. Once a handler exists the
/// default disposition is gone, so the watcher has to exit on its own
/// whenever no child is attached.
fn watch_interrupts() {
    INTERRUPT_WATCHER.call_once(|| {
        let mut interrupts = match signal(SignalKind::interrupt()) {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Could not install the CTRL+C handler: {}", e);
                return;
            }
        };
        tokio::spawn(async move {
            while interrupts.recv().await.is_some() {
                match interrupt_action(foreground_child_running()) {
                    InterruptAction::Ignore => {
                        debug!("Interrupt left to the foreground command");
                    }
                    InterruptAction::Exit(code) => {
                        println!();
                        std::process::exit(code);
                    }
                }
            }
        });
    });
}

/// Executor backed by real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Executor for ProcessExecutor {
    async fn stream(&self, spec: &CommandSpec) -> Result<i32> {
        debug!("Streaming: {}", spec);
        watch_interrupts();
        let mut child = spec
            .to_command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| Error::spawn(spec.program(), e))?;

        // CTRL+C reaches the child through the terminal's process group
        let _guard = ForegroundGuard::enter();
        let status = child.wait().await?;

        Ok(exit_code(status))
    }

    async fn capture(&self, spec: &CommandSpec) -> Result<CapturedOutput> {
        debug!("Capturing: {}", spec);
        let output = spec
            .to_command()
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::spawn(spec.program(), e))?;

        let captured = CapturedOutput {
            code: exit_code(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        if !captured.success() {
            warn!("'{}' exited with code {}", spec.program(), captured.code);
        }
        Ok(captured)
    }
}

/// Exit code, with signal deaths mapped to `128 + signal` as shells report them
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}

/// Quote a single argument for a POSIX shell
pub fn shell_quote(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }
    let safe = arg
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
