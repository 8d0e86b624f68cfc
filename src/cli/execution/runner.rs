use crate::cli::console::Console;
use crate::cli::error::Result;
use crate::cli::output::{paint, separator, OutputStyle};
use crate::core;
use crate::runtime::{CapturedOutput, CommandSpec, Executor};
use std::sync::Arc;
use tracing::{info, warn};

/// Exit code reported when a program does not exist
pub const SPAWN_FAILURE_CODE: i32 = 127;

/// Exit code reported when a program exists but cannot be executed
pub const NOT_EXECUTABLE_CODE: i32 = 126;

/// Shell-style exit code for a program that never started, `None` for
/// errors that are not about launching
fn launch_failure_code(e: &core::Error) -> Option<i32> {
    match e {
        _ if e.is_missing_program() => Some(SPAWN_FAILURE_CODE),
        core::Error::Spawn { .. } => Some(NOT_EXECUTABLE_CODE),
        _ => None,
    }
}

/// Runs external commands and reports their outcome on a console
#[derive(Clone)]
pub struct Runner {
    executor: Arc<dyn Executor>,
}

impl Runner {
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    /// Announce, stream and report one command. Returns whether it exited 0.
    pub async fn run(&self, console: &mut dyn Console, spec: &CommandSpec) -> Result<bool> {
        console.say(&format!(
            "\n{}{}",
            paint(OutputStyle::Highlight, "▶ Running: "),
            spec
        ));

        let code = match self.executor.stream(spec).await {
            Ok(code) => code,
            Err(e) => match launch_failure_code(&e) {
                Some(code) => {
                    warn!("{}", e);
                    let reason = if code == SPAWN_FAILURE_CODE {
                        "✖ Command not found.".to_string()
                    } else {
                        format!("✖ Command could not be started: {}", e)
                    };
                    console.say(&paint(OutputStyle::Failure, &reason));
                    code
                }
                None => return Err(e.into()),
            },
        };

        if code == 0 {
            console.say(&paint(OutputStyle::Success, "✔ Command finished.\n"));
        } else {
            info!("'{}' failed with exit code {}", spec.program(), code);
            console.say(&paint(
                OutputStyle::Failure,
                &format!("✖ Command failed with exit code: {}\n", code),
            ));
        }
        console.say(&separator());
        Ok(code == 0)
    }

    /// Run each command in order, stopping at the first failure
    pub async fn run_all(&self, console: &mut dyn Console, specs: &[CommandSpec]) -> Result<bool> {
        for spec in specs {
            if !self.run(console, spec).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Announce the command, then capture its output instead of streaming it
    pub async fn capture(
        &self,
        console: &mut dyn Console,
        spec: &CommandSpec,
    ) -> Result<CapturedOutput> {
        console.say(&format!(
            "\n{}{}",
            paint(OutputStyle::Highlight, "▶ Running: "),
            spec
        ));
        self.capture_quiet(spec).await
    }

    /// Capture without any console output. A program that cannot be started
    /// is reported as exit code 127 (missing) or 126 (not executable) with
    /// the reason on stderr.
    pub async fn capture_quiet(&self, spec: &CommandSpec) -> Result<CapturedOutput> {
        match self.executor.capture(spec).await {
            Ok(output) => Ok(output),
            Err(e) => match launch_failure_code(&e) {
                Some(code) => Ok(CapturedOutput {
                    code,
                    stdout: String::new(),
                    stderr: e.to_string(),
                }),
                None => Err(e.into()),
            },
        }
    }

    /// Hand the terminal to a command without any announcement
    pub async fn attach(&self, spec: &CommandSpec) -> Result<i32> {
        match self.executor.stream(spec).await {
            Ok(code) => Ok(code),
            Err(e) => match launch_failure_code(&e) {
                Some(code) => {
                    warn!("{}", e);
                    Ok(code)
                }
                None => Err(e.into()),
            },
        }
    }
}
