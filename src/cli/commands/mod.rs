//! Node management actions
//!
//! This module handles:
//! - Dependency checks and the initial host setup
//! - Wallet and node registration through the `nexus-network` CLI
//! - Starting nodes in the foreground or inside screen sessions
//! - VPS maintenance: GLIBC, swap and reboot
//!
//! Every action reports through a [`Console`] and runs its external
//! commands through a [`Runner`], so the plain menu and the panel UI share
//! one implementation.

mod node;
mod sessions;
mod setup;
mod system;

#[cfg(test)]
mod commands_test;

pub use node::RunMode;
pub use system::{GLIBC_PREFIX, GLIBC_TARGET_VERSION, GLIBC_UPGRADABLE_VERSION, SWAP_FILE};

use crate::cli::config::Settings;
use crate::cli::console::Console;
use crate::cli::error::Result;
use crate::cli::execution::Runner;
use crate::cli::output::{paint, OutputStyle};
use crate::cli::session::ScreenManager;
use crate::core::{NodeConfig, NEXUS_CLI_NAME, SCREEN_NAME};
use crate::runtime::{Executor, ToolPaths};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything a menu can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    InitialSetup,
    CheckStatus,
    UpdateCli,
    RegisterWallet,
    RegisterNode,
    StartNode(RunMode),
    ViewSessions,
    StopSession,
    CheckGlibc,
    UpdateGlibc,
    CreateSwap,
    Reboot,
    Exit,
}

/// What the front end should do after an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit(i32),
}

/// Shared state behind every action
pub struct NodeManager {
    settings: Settings,
    paths: ToolPaths,
    config: NodeConfig,
    runner: Runner,
}

impl NodeManager {
    pub fn new(settings: Settings, paths: ToolPaths, executor: Arc<dyn Executor>) -> Self {
        Self {
            settings,
            paths,
            config: NodeConfig::default(),
            runner: Runner::new(executor),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn paths(&self) -> &ToolPaths {
        &self.paths
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    /// Read the configuration store. A broken file is reported and the run
    /// continues with empty values.
    pub fn load_config(&mut self, console: &mut dyn Console) {
        let path = &self.settings.config_path;
        if !path.exists() {
            debug!("No configuration file at {}", path.display());
            return;
        }
        match NodeConfig::load(path) {
            Ok(config) => {
                self.config = config;
                console.say(&paint(
                    OutputStyle::Success,
                    "Previous configuration loaded.\n",
                ));
            }
            Err(e) => {
                warn!("{}", e);
                console.say(&paint(
                    OutputStyle::Failure,
                    &format!("✖ Failed to load configuration: {}", e),
                ));
            }
        }
    }

    /// Rewrite the configuration store, reporting failures on the console
    fn save_config(&self, console: &mut dyn Console) -> bool {
        match self.config.save(&self.settings.config_path) {
            Ok(()) => true,
            Err(e) => {
                warn!("{}", e);
                console.say(&paint(
                    OutputStyle::Failure,
                    &format!("✖ Failed to save configuration: {}", e),
                ));
                false
            }
        }
    }

    /// Look for every tool again; setup and updates may have installed
    /// some since the last menu
    pub fn refresh_tools(&mut self) {
        self.paths = ToolPaths::discover(&self.settings.user_home);
    }

    /// The node client, or a message telling the user how to get it
    fn require_cli(&self, console: &mut dyn Console) -> Option<PathBuf> {
        if self.paths.nexus_cli.is_none() {
            console.say(&paint(
                OutputStyle::Failure,
                &format!(
                    "'{}' was not found. Run 'Check dependency status' (1) and 'Update Nexus CLI' (2).\n",
                    NEXUS_CLI_NAME
                ),
            ));
        }
        self.paths.nexus_cli.clone()
    }

    /// The screen manager, or a message telling the user how to get it
    fn require_screen(&self, console: &mut dyn Console) -> Option<ScreenManager> {
        match ScreenManager::from_path(self.paths.screen.as_deref()) {
            Ok(screens) => Some(screens),
            Err(_) => {
                console.say(&paint(
                    OutputStyle::Failure,
                    &format!(
                        "'{}' was not found. Run 'Check dependency status' (1) for details.\n",
                        SCREEN_NAME
                    ),
                ));
                None
            }
        }
    }

    /// Running screen sessions, empty when screen is missing
    pub async fn list_sessions(&self) -> Result<Vec<String>> {
        match ScreenManager::from_path(self.paths.screen.as_deref()) {
            Ok(screens) => screens.list(&self.runner).await,
            Err(_) => Ok(Vec::new()),
        }
    }

    /// Current scrollback of a screen session, `None` while not yet written
    pub async fn session_log(&self, session: &str) -> Result<Option<Vec<String>>> {
        ScreenManager::from_path(self.paths.screen.as_deref())?
            .hardcopy(&self.runner, session)
            .await
    }

    /// Run one action to completion
    pub async fn perform(&mut self, action: Action, console: &mut dyn Console) -> Result<Flow> {
        debug!("Performing {:?}", action);
        match action {
            Action::InitialSetup => return self.initial_setup(console).await,
            Action::CheckStatus => self.check_status(console),
            Action::UpdateCli => self.update_cli(console).await?,
            Action::RegisterWallet => self.register_wallet(console).await?,
            Action::RegisterNode => self.register_node(console).await?,
            Action::StartNode(mode) => self.start_node(mode, console).await?,
            Action::ViewSessions => self.view_sessions(console).await?,
            Action::StopSession => self.stop_session(console).await?,
            Action::CheckGlibc => {
                self.check_glibc(console).await?;
            }
            Action::UpdateGlibc => self.update_glibc(console).await?,
            Action::CreateSwap => self.create_swap(console).await?,
            Action::Reboot => self.reboot(console).await?,
            Action::Exit => {
                console.say(&paint(OutputStyle::Success, "👋 Goodbye!\n"));
                return Ok(Flow::Exit(0));
            }
        }
        Ok(Flow::Continue)
    }
}
