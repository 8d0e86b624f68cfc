use crate::cli::commands::NodeManager;
use crate::cli::config::{Settings, UiMode};
use crate::cli::console::{Console, TerminalConsole};
use crate::cli::error::{InteractiveError, Result};
use crate::cli::menu;
use crate::runtime::{is_elevated, user_home, ProcessExecutor, ToolPaths};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Interactive installer and manager for Nexus network prover nodes
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file holding the wallet address and node ID
    #[arg(long, env = "NEXUS_TOOL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Use the full-screen dual-panel interface
    #[arg(long)]
    pub panel: bool,

    /// Thread limit offered by "Run node with max threads"
    #[arg(long, env = "NEXUS_MAX_THREADS")]
    pub max_threads: Option<u32>,
}

impl Cli {
    /// Run the interactive tool. Returns the process exit code.
    pub async fn execute(self) -> Result<i32> {
        if !is_elevated() {
            return Err(InteractiveError::PermissionDenied(
                "the tool must run as root".to_string(),
            ));
        }

        let settings = Settings::new(user_home()).merge_with_cli_args(&self);
        debug!("Settings: {:?}", settings);
        let paths = ToolPaths::discover(&settings.user_home);
        let ui = settings.ui;

        let mut manager = NodeManager::new(settings, paths, Arc::new(ProcessExecutor::new()));
        let mut console = TerminalConsole::new();

        if let Some(code) = menu::welcome(&mut manager, &mut console).await? {
            return Ok(code);
        }
        manager.load_config(&mut console);

        match ui {
            UiMode::Plain => menu::run_plain(&mut manager, &mut console).await,
            UiMode::Panel => run_panel(&mut manager, &mut console).await,
        }
    }
}

#[cfg(feature = "tui")]
async fn run_panel(manager: &mut NodeManager, _console: &mut dyn Console) -> Result<i32> {
    info!("Starting the panel interface");
    crate::cli::tui::run_panel(manager).await
}

#[cfg(not(feature = "tui"))]
async fn run_panel(manager: &mut NodeManager, console: &mut dyn Console) -> Result<i32> {
    use crate::cli::output::{paint, OutputStyle};

    info!("Panel interface not compiled in, using the plain menu");
    console.say(&paint(
        OutputStyle::Warning,
        "This build has no panel interface. Falling back to the plain menu.",
    ));
    menu::run_plain(manager, console).await
}
