//! Runtime settings resolved from the command line and the host

use crate::core::NodeConfig;
use std::path::{Path, PathBuf};

/// Thread limit used by "Run node with max threads"
pub const DEFAULT_MAX_THREADS: u32 = 4;

/// Which front end drives the actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiMode {
    /// Numbered menus on a scrolling terminal
    #[default]
    Plain,
    /// Full-screen menu with the live screen log panel
    Panel,
}

/// Settings for one run of the tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Home of the user who invoked sudo
    pub user_home: PathBuf,

    /// Location of the node configuration store
    pub config_path: PathBuf,

    pub ui: UiMode,

    pub verbose: bool,

    /// `--max-threads` passed to the node in max-threads mode
    pub max_threads: u32,
}

impl Settings {
    /// Defaults rooted at the given home directory
    pub fn new(user_home: impl Into<PathBuf>) -> Self {
        let user_home = user_home.into();
        Self {
            config_path: NodeConfig::default_path(&user_home),
            user_home,
            ui: UiMode::default(),
            verbose: false,
            max_threads: DEFAULT_MAX_THREADS,
        }
    }

    /// Merge with command-line arguments, giving priority to CLI args
    pub fn merge_with_cli_args(mut self, cli_args: &crate::cli::cli::Cli) -> Self {
        if let Some(ref path) = cli_args.config {
            self.config_path = path.clone();
        }
        if cli_args.panel {
            self.ui = UiMode::Panel;
        }
        if cli_args.verbose {
            self.verbose = true;
        }
        if let Some(threads) = cli_args.max_threads {
            self.max_threads = threads.max(1);
        }
        self
    }

    /// `<home>/.cargo/bin`, where rustup installs the toolchain
    pub fn cargo_bin(&self) -> PathBuf {
        self.user_home.join(".cargo").join("bin")
    }

    pub fn home(&self) -> &Path {
        &self.user_home
    }
}
