//! Mock implementations for testing
//!
//! This module provides mock implementations of external dependencies:
//! - Mock process execution with canned exit codes and output
//! - Scripted console input with captured output

use crate::cli::console::Console;
use crate::cli::error::{InteractiveError, Result};
use crate::core;
use crate::runtime::{CapturedOutput, CommandSpec, Executor};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Mock response configuration
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Matched as a substring of the command's shell line
    pub command_pattern: String,
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl MockResponse {
    pub fn new(pattern: &str, code: i32, stdout: &str) -> Self {
        Self {
            command_pattern: pattern.to_string(),
            code,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }
}

/// Executor that never starts a process
#[derive(Debug, Default)]
pub struct MockExecutor {
    responses: Mutex<Vec<MockResponse>>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a response for every command containing `pattern`. Earlier
    /// responses win.
    pub fn respond(&self, pattern: &str, code: i32, stdout: &str) {
        self.responses
            .lock()
            .unwrap()
            .push(MockResponse::new(pattern, code, stdout));
    }

    pub fn add_response(&self, response: MockResponse) {
        self.responses.lock().unwrap().push(response);
    }

    /// Every command executed so far, as shell lines
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.to_shell_line())
            .collect()
    }

    /// Every command executed so far
    pub fn specs(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    /// True if any executed command contains `pattern`
    pub fn ran(&self, pattern: &str) -> bool {
        self.calls().iter().any(|c| c.contains(pattern))
    }

    fn answer(&self, spec: &CommandSpec) -> CapturedOutput {
        self.calls.lock().unwrap().push(spec.clone());
        let line = spec.to_shell_line();
        let responses = self.responses.lock().unwrap();
        responses
            .iter()
            .find(|r| line.contains(&r.command_pattern))
            .map(|r| CapturedOutput {
                code: r.code,
                stdout: r.stdout.clone(),
                stderr: r.stderr.clone(),
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl Executor for MockExecutor {
    async fn stream(&self, spec: &CommandSpec) -> core::Result<i32> {
        Ok(self.answer(spec).code)
    }

    async fn capture(&self, spec: &CommandSpec) -> core::Result<CapturedOutput> {
        Ok(self.answer(spec))
    }
}

/// Console fed from a list of input lines
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    pub output: Vec<String>,
    pub prompts: Vec<String>,
    pub clears: usize,
    /// Make `clear` fail like a closed terminal
    pub broken_terminal: bool,
}

impl ScriptedConsole {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// All output lines joined, for substring assertions
    pub fn text(&self) -> String {
        self.output.join("\n")
    }

    pub fn printed(&self, needle: &str) -> bool {
        self.output.iter().any(|line| line.contains(needle))
    }

    pub fn remaining_inputs(&self) -> usize {
        self.inputs.len()
    }
}

impl Console for ScriptedConsole {
    fn say(&mut self, text: &str) {
        self.output.push(text.to_string());
    }

    fn read_line(&mut self, prompt: &str) -> Result<String> {
        self.prompts.push(prompt.to_string());
        self.inputs.pop_front().ok_or(InteractiveError::InputClosed)
    }

    fn clear(&mut self) -> Result<()> {
        if self.broken_terminal {
            return Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe).into());
        }
        self.clears += 1;
        Ok(())
    }
}
