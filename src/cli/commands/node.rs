use super::system::{GLIBC_LIBRARY_PATH, GLIBC_LOADER};
use super::NodeManager;
use crate::cli::console::{confirm, prompt_value, Console};
use crate::cli::error::Result;
use crate::cli::output::{paint, OutputStyle};
use crate::cli::session::{
    random_session_name, validate_session_name, NODE_PREFIX, PROVER_PREFIX,
};
use crate::core::extract_node_id;
use crate::runtime::CommandSpec;
use std::path::Path;
use tracing::{info, warn};

/// How a node process is launched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Attached to this terminal until CTRL+C
    Foreground,
    /// Detached inside a new screen session
    Background,
    /// Detached, with a thread limit
    BackgroundMaxThreads,
    /// Attached, through the dynamic loader of the locally built GLIBC, for
    /// hosts whose system GLIBC is too old for the node binary
    LocalGlibc,
}

impl RunMode {
    pub fn is_background(self) -> bool {
        matches!(self, Self::Background | Self::BackgroundMaxThreads)
    }
}

impl NodeManager {
    pub(super) async fn register_wallet(&mut self, console: &mut dyn Console) -> Result<()> {
        let Some(cli) = self.require_cli(console) else {
            return Ok(());
        };
        console.say(&paint(OutputStyle::Heading, "🔑 Wallet address registration\n"));

        let Some(address) = prompt_value(console, "Enter your wallet address: ")? else {
            console.say(&paint(
                OutputStyle::Failure,
                "Wallet address cannot be empty.\n",
            ));
            return Ok(());
        };

        let spec = CommandSpec::new(cli.to_string_lossy())
            .args(["register-user", "--wallet-address", address.as_str()]);
        if self.runner.run(console, &spec).await? {
            info!("Wallet registered");
            self.config.wallet_address = Some(address.clone());
            if self.save_config(console) {
                console.say(&paint(
                    OutputStyle::Highlight,
                    &format!("Wallet address '{}' has been saved.\n", address),
                ));
            }
        } else {
            console.say(&paint(
                OutputStyle::Failure,
                "Wallet registration failed. The saved address was not changed.\n",
            ));
        }
        Ok(())
    }

    pub(super) async fn register_node(&mut self, console: &mut dyn Console) -> Result<()> {
        let Some(cli) = self.require_cli(console) else {
            return Ok(());
        };
        console.say(&paint(OutputStyle::Heading, "🆔 Creating a new node ID...\n"));

        let spec = CommandSpec::new(cli.to_string_lossy()).arg("register-node");
        let output = self.runner.capture(console, &spec).await?;
        let text = output.combined();
        console.say(&text);

        if !output.success() {
            console.say(&paint(
                OutputStyle::Failure,
                &format!(
                    "Failed to create a node ID. Make sure your wallet is registered. Exit code: {}\n",
                    output.code
                ),
            ));
            return Ok(());
        }

        match extract_node_id(&text) {
            Some(node_id) => {
                info!("Registered node {}", node_id);
                self.config.node_id = Some(node_id.clone());
                if self.save_config(console) {
                    console.say(&paint(
                        OutputStyle::Success,
                        &format!("\n✅ Node ID created and saved: {}\n", node_id),
                    ));
                }
            }
            None => {
                warn!("register-node succeeded but printed no node id");
                console.say(&paint(
                    OutputStyle::Highlight,
                    "⚠ Could not find a node ID in the output above. The saved configuration was not changed.\n",
                ));
            }
        }
        Ok(())
    }

    /// Saved node id after confirmation, or one typed by the user
    fn resolve_node_id(&self, console: &mut dyn Console) -> Result<Option<String>> {
        match &self.config.node_id {
            Some(saved) => {
                let prompt = format!(
                    "Use the saved node ID {}? (Y/n): ",
                    paint(OutputStyle::Success, saved)
                );
                if confirm(console, &prompt, true)? {
                    Ok(Some(saved.clone()))
                } else {
                    prompt_value(console, "Enter a new node ID: ")
                }
            }
            None => {
                console.say(&paint(
                    OutputStyle::Highlight,
                    "No node ID saved yet. Enter it manually.",
                ));
                prompt_value(console, "Enter node ID: ")
            }
        }
    }

    /// Thread limit for the prover, defaulting to the configured value
    fn resolve_thread_count(&self, console: &mut dyn Console) -> Result<Option<u32>> {
        let default = self.settings.max_threads;
        let answer = prompt_value(
            console,
            &format!("Maximum number of threads (default: {}): ", default),
        )?;
        match answer {
            None => Ok(Some(default)),
            Some(text) => match text.parse::<u32>() {
                Ok(n) if n > 0 => Ok(Some(n)),
                _ => {
                    console.say(&paint(
                        OutputStyle::Failure,
                        "Thread count must be a positive number.\n",
                    ));
                    Ok(None)
                }
            },
        }
    }

    pub(super) async fn start_node(&mut self, mode: RunMode, console: &mut dyn Console) -> Result<()> {
        let screens = if mode.is_background() {
            match self.require_screen(console) {
                Some(screens) => Some(screens),
                None => return Ok(()),
            }
        } else {
            None
        };
        let Some(cli) = self.require_cli(console) else {
            return Ok(());
        };
        if mode == RunMode::LocalGlibc && !Path::new(GLIBC_LOADER).exists() {
            console.say(&paint(
                OutputStyle::Failure,
                &format!(
                    "{} was not found. Run 'Update GLIBC' from the system utilities first.\n",
                    GLIBC_LOADER
                ),
            ));
            return Ok(());
        }

        let title = if mode.is_background() {
            "⚡ Starting node in the background...\n"
        } else {
            "⚡ Starting node...\n"
        };
        console.say(&paint(OutputStyle::Heading, title));

        let Some(node_id) = self.resolve_node_id(console)? else {
            console.say(&paint(OutputStyle::Failure, "Node ID cannot be empty.\n"));
            return Ok(());
        };

        let cli = cli.to_string_lossy().to_string();
        let mut node = match mode {
            RunMode::LocalGlibc => CommandSpec::new(GLIBC_LOADER)
                .args(["--library-path", GLIBC_LIBRARY_PATH])
                .arg(cli),
            _ => CommandSpec::new(cli),
        }
        .args(["start", "--node-id", node_id.as_str()]);
        if mode == RunMode::BackgroundMaxThreads {
            let Some(threads) = self.resolve_thread_count(console)? else {
                return Ok(());
            };
            node = node.args(["--max-threads".to_string(), threads.to_string()]);
        }

        let Some(screens) = screens else {
            console.say(&paint(
                OutputStyle::Highlight,
                "To stop the node, press CTRL+C.\n",
            ));
            self.runner.run(console, &node).await?;
            return Ok(());
        };

        console.say(&format!(
            "{}{}",
            paint(OutputStyle::Heading, "Node ID to use: "),
            paint(OutputStyle::Highlight, &node_id)
        ));
        let prefix = if mode == RunMode::BackgroundMaxThreads {
            PROVER_PREFIX
        } else {
            NODE_PREFIX
        };
        let default_name = random_session_name(prefix);
        let name = prompt_value(
            console,
            &format!("Screen session name (default: {}): ", default_name),
        )?
        .unwrap_or(default_name);
        if let Err(e) = validate_session_name(&name) {
            console.say(&paint(OutputStyle::Failure, &format!("{}\n", e)));
            return Ok(());
        }

        if self.runner.run(console, &screens.start_spec(&name, &node)).await? {
            info!("Node {} started in screen session {}", node_id, name);
            console.say(&paint(
                OutputStyle::Success,
                &format!("✅ Node started inside screen session '{}'.", name),
            ));
            console.say("Attach with 'View screen sessions'; detach again with CTRL+A then D.\n");
        }
        Ok(())
    }
}
