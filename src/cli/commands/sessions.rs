use super::NodeManager;
use crate::cli::console::{pause, Console};
use crate::cli::error::Result;
use crate::cli::output::{paint, OutputStyle};

/// Outcome of picking a session from a numbered list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPick {
    Selected(String),
    Back,
    Invalid,
}

/// Interpret the user's answer to a numbered session list. `x` or an empty
/// line goes back.
pub fn pick_session(sessions: &[String], input: &str) -> SessionPick {
    let input = input.trim();
    if input.is_empty() || input.eq_ignore_ascii_case("x") {
        return SessionPick::Back;
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=sessions.len()).contains(&n) => SessionPick::Selected(sessions[n - 1].clone()),
        _ => SessionPick::Invalid,
    }
}

impl NodeManager {
    /// List sessions and let the user choose one. `None` when there is
    /// nothing to choose or the user went back.
    async fn choose_session(
        &self,
        console: &mut dyn Console,
        verb: &str,
    ) -> Result<Option<String>> {
        let sessions = self.list_sessions().await?;
        if sessions.is_empty() {
            console.say(&paint(
                OutputStyle::Highlight,
                "No screen sessions are running.\n",
            ));
            return Ok(None);
        }

        console.say(&paint(OutputStyle::Success, "Screen sessions found:\n"));
        for (i, session) in sessions.iter().enumerate() {
            console.say(&format!("{}. {}", i + 1, paint(OutputStyle::Highlight, session)));
        }

        let answer = console.read_line(&format!(
            "\nChoose a session to {} (enter its number), or 'x' to go back: ",
            verb
        ))?;
        match pick_session(&sessions, &answer) {
            SessionPick::Selected(session) => Ok(Some(session)),
            SessionPick::Back => Ok(None),
            SessionPick::Invalid => {
                console.say(&paint(OutputStyle::Failure, "Invalid choice.\n"));
                Ok(None)
            }
        }
    }

    pub(super) async fn view_sessions(&mut self, console: &mut dyn Console) -> Result<()> {
        let Some(screens) = self.require_screen(console) else {
            return Ok(());
        };
        console.say(&paint(
            OutputStyle::Heading,
            "📊 Checking running screen sessions...\n",
        ));

        let Some(session) = self.choose_session(console, "attach to").await? else {
            return Ok(());
        };
        console.say(&paint(
            OutputStyle::Success,
            &format!("Attaching to session '{}'...\n", session),
        ));
        console.clear()?;
        self.runner.attach(&screens.attach_spec(&session)).await?;
        pause(
            console,
            "\nBack from the screen session. Press [Enter] to continue.",
        )
    }

    pub(super) async fn stop_session(&mut self, console: &mut dyn Console) -> Result<()> {
        let Some(screens) = self.require_screen(console) else {
            return Ok(());
        };
        console.say(&paint(OutputStyle::Heading, "🛑 Stopping a screen session...\n"));

        let Some(session) = self.choose_session(console, "stop").await? else {
            return Ok(());
        };
        if self.runner.run(console, &screens.quit_spec(&session)).await? {
            console.say(&paint(
                OutputStyle::Success,
                &format!("Session '{}' has been stopped.\n", session),
            ));
        }
        Ok(())
    }

    /// Session picker for the panel UI, which watches logs instead of
    /// attaching
    pub async fn choose_session_to_watch(
        &self,
        console: &mut dyn Console,
    ) -> Result<Option<String>> {
        if self.require_screen(console).is_none() {
            return Ok(None);
        }
        self.choose_session(console, "watch").await
    }
}
