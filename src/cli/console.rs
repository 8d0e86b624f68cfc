//! Line-based terminal interaction
//!
//! Actions never touch stdin/stdout directly; they talk to a [`Console`] so
//! the plain menu, the panel UI and the tests can each provide their own.

use crate::cli::error::{InteractiveError, Result};
use crate::cli::output::{paint, OutputStyle};
use std::io::{BufRead, Write};

pub trait Console: Send {
    /// Write a line of output
    fn say(&mut self, text: &str);

    /// Show `prompt` and read one line, without the trailing newline
    fn read_line(&mut self, prompt: &str) -> Result<String>;

    /// Clear the visible screen
    fn clear(&mut self) -> Result<()>;
}

/// Console on the process's own stdin/stdout
#[derive(Debug, Default)]
pub struct TerminalConsole;

impl TerminalConsole {
    pub fn new() -> Self {
        Self
    }
}

impl Console for TerminalConsole {
    fn say(&mut self, text: &str) {
        println!("{}", text);
    }

    fn read_line(&mut self, prompt: &str) -> Result<String> {
        let mut stdout = std::io::stdout();
        write!(stdout, "{}", paint(OutputStyle::Heading, prompt))?;
        stdout.flush()?;

        let mut line = String::new();
        let read = std::io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(InteractiveError::InputClosed);
        }
        Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
    }

    fn clear(&mut self) -> Result<()> {
        let mut stdout = std::io::stdout();
        write!(stdout, "\x1b[2J\x1b[H")?;
        stdout.flush()?;
        Ok(())
    }
}

/// Ask a yes/no question. An empty answer takes `default_yes`.
pub fn confirm(console: &mut dyn Console, prompt: &str, default_yes: bool) -> Result<bool> {
    let answer = console.read_line(prompt)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(match answer.as_str() {
        "" => default_yes,
        "y" | "yes" => true,
        _ => false,
    })
}

/// Read a line and trim it, returning `None` when nothing was entered
pub fn prompt_value(console: &mut dyn Console, prompt: &str) -> Result<Option<String>> {
    let value = console.read_line(prompt)?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}

/// Wait for Enter
pub fn pause(console: &mut dyn Console, prompt: &str) -> Result<()> {
    console.read_line(prompt).map(|_| ())
}
