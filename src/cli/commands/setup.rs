use super::{Flow, NodeManager};
use crate::cli::console::Console;
use crate::cli::error::Result;
use crate::cli::output::{paint, status_line, OutputStyle};
use crate::core::{NEXUS_CLI_NAME, SCREEN_NAME};
use crate::runtime::CommandSpec;
use std::path::PathBuf;
use tracing::info;

/// Installer for the Rust toolchain
pub const RUSTUP_INSTALL: &str =
    "curl --proto '=https' --tlsv1.2 -sSf https://sh.rustup.rs | sh -s -- -y";

/// Installer for the `nexus-network` CLI
pub const NEXUS_CLI_INSTALL: &str = "curl https://cli.nexus.xyz/ | sh";

/// Target the prover compiles guest programs for
pub const RISCV_TARGET: &str = "riscv32i-unknown-none-elf";

/// OS packages the node and its build need
pub const BASE_PACKAGES: &[&str] = &[
    "screen",
    "curl",
    "build-essential",
    "pkg-config",
    "libssl-dev",
    "git-all",
];

fn apt_install(packages: &[&str]) -> CommandSpec {
    CommandSpec::new("sudo")
        .args(["apt", "install"])
        .args(packages.iter().copied())
        .arg("-y")
}

/// `PATH` for commands that need the fresh toolchain: the invoking user's
/// cargo bin, this process's own cargo bin when it differs, then `existing`
fn toolchain_path(
    user_cargo_bin: PathBuf,
    own_home: Option<PathBuf>,
    existing: Option<String>,
) -> String {
    let mut dirs = vec![user_cargo_bin];
    if let Some(own) = own_home.map(|home| home.join(".cargo").join("bin")) {
        if !dirs.contains(&own) {
            dirs.push(own);
        }
    }
    let mut parts: Vec<String> = dirs.iter().map(|d| d.display().to_string()).collect();
    if let Some(existing) = existing.filter(|p| !p.is_empty()) {
        parts.push(existing);
    }
    parts.join(":")
}

impl NodeManager {
    pub(super) fn check_status(&self, console: &mut dyn Console) {
        console.say(&paint(OutputStyle::Heading, "🔍 Checking dependency status...\n"));

        console.say(&status_line(
            SCREEN_NAME,
            self.paths.screen.as_deref(),
            "Run 'sudo apt install screen'.",
        ));
        console.say(&status_line(
            "rustc",
            self.paths.rustc.as_deref(),
            "Run the initial setup (startup option 1).",
        ));
        console.say(&status_line(
            NEXUS_CLI_NAME,
            self.paths.nexus_cli.as_deref(),
            "Run 'Update Nexus CLI' (main menu 2).",
        ));
    }

    /// Install OS packages, Rust, the RISC-V target and the node client.
    /// The tool exits afterwards so the next run picks up the new `PATH`.
    pub(super) async fn initial_setup(&mut self, console: &mut dyn Console) -> Result<Flow> {
        console.say(&paint(
            OutputStyle::Heading,
            "🚀 Starting initial installation & dependency setup...\n",
        ));
        info!("Running initial setup");

        let packages = [
            CommandSpec::shell("sudo apt update && sudo apt upgrade -y"),
            apt_install(BASE_PACKAGES),
            apt_install(&["protobuf-compiler"]),
            CommandSpec::new("sudo").args(["apt", "update"]),
        ];
        for spec in &packages {
            self.runner.run(console, spec).await?;
        }

        console.say(&paint(OutputStyle::Highlight, "\nInstalling Rust...\n"));
        if !self
            .runner
            .run(console, &CommandSpec::shell(RUSTUP_INSTALL))
            .await?
        {
            console.say(&paint(
                OutputStyle::Failure,
                "✖ Rust installation failed. Setup aborted.",
            ));
            return Ok(Flow::Exit(1));
        }

        // The installer may have written to either home when run under sudo
        let path = toolchain_path(
            self.settings.cargo_bin(),
            dirs::home_dir(),
            std::env::var("PATH").ok(),
        );
        let rustup = CommandSpec::new("rustup")
            .args(["target", "add", RISCV_TARGET])
            .env("PATH", path);
        self.runner.run(console, &rustup).await?;

        console.say(&paint(OutputStyle::Heading, "\nInstalling Nexus CLI...\n"));
        self.update_cli(console).await?;

        console.say(&paint(
            OutputStyle::Success,
            "🎉 Initial setup complete! Run the tool again to open the main menu.\n",
        ));
        Ok(Flow::Exit(0))
    }

    pub(super) async fn update_cli(&mut self, console: &mut dyn Console) -> Result<()> {
        console.say(&paint(OutputStyle::Heading, "🔄 Updating Nexus CLI...\n"));
        let ok = self
            .runner
            .run(console, &CommandSpec::shell(NEXUS_CLI_INSTALL))
            .await?;

        self.refresh_tools();
        match (&self.paths.nexus_cli, ok) {
            (Some(path), true) => console.say(&paint(
                OutputStyle::Success,
                &format!("Nexus CLI updated: {}\n", path.display()),
            )),
            (None, true) => console.say(&paint(
                OutputStyle::Highlight,
                "Nexus CLI installed. Please restart the tool so its path is detected.\n",
            )),
            (_, false) => console.say(&paint(
                OutputStyle::Failure,
                "Nexus CLI update failed. See the output above.\n",
            )),
        }
        Ok(())
    }
}
