//! Numbered menus on a scrolling terminal
//!
//! Menus are plain tables of [`MenuItem`]s. Parsing a choice is a pure
//! lookup so it can be tested without a terminal; [`run_plain`] owns the
//! loop.

use crate::cli::commands::{Action, Flow, NodeManager, RunMode};
use crate::cli::console::{pause, Console};
use crate::cli::error::Result;
use crate::cli::output::{banner, paint, OutputStyle};
use crate::core::NodeConfig;
use tracing::debug;

/// What selecting a menu line does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    Run(Action),
    /// Open the system utilities submenu
    Utilities,
    /// Leave the current submenu
    Back,
}

#[derive(Debug, Clone, Copy)]
pub struct MenuItem {
    pub key: &'static str,
    pub label: &'static str,
    pub style: OutputStyle,
    pub entry: MenuEntry,
}

const fn item(key: &'static str, label: &'static str, style: OutputStyle, entry: MenuEntry) -> MenuItem {
    MenuItem {
        key,
        label,
        style,
        entry,
    }
}

pub const MAIN_MENU: &[MenuItem] = &[
    item("1", "Check dependency status", OutputStyle::Success, MenuEntry::Run(Action::CheckStatus)),
    item("2", "Update Nexus CLI", OutputStyle::Plain, MenuEntry::Run(Action::UpdateCli)),
    item("3", "Register/Update wallet address", OutputStyle::Plain, MenuEntry::Run(Action::RegisterWallet)),
    item("4", "Create/Update node ID", OutputStyle::Plain, MenuEntry::Run(Action::RegisterNode)),
    item("5", "Run node (foreground)", OutputStyle::Plain, MenuEntry::Run(Action::StartNode(RunMode::Foreground))),
    item("6", "Run node (background)", OutputStyle::Heading, MenuEntry::Run(Action::StartNode(RunMode::Background))),
    item("6b", "Run node with max threads (in screen)", OutputStyle::Highlight, MenuEntry::Run(Action::StartNode(RunMode::BackgroundMaxThreads))),
    item("7", "View screen sessions (logs)", OutputStyle::Plain, MenuEntry::Run(Action::ViewSessions)),
    item("8", "Stop a screen session", OutputStyle::Failure, MenuEntry::Run(Action::StopSession)),
    item("9", "System utilities", OutputStyle::Highlight, MenuEntry::Utilities),
    item("10", "Exit", OutputStyle::Plain, MenuEntry::Run(Action::Exit)),
];

pub const UTILITIES_MENU: &[MenuItem] = &[
    item("1", "Check GLIBC version", OutputStyle::Plain, MenuEntry::Run(Action::CheckGlibc)),
    item("2", "Update GLIBC (build 2.39 from source)", OutputStyle::Highlight, MenuEntry::Run(Action::UpdateGlibc)),
    item("3", "Fix 'Killed' nodes (create swap)", OutputStyle::Plain, MenuEntry::Run(Action::CreateSwap)),
    item("4", "Run node with local GLIBC", OutputStyle::Plain, MenuEntry::Run(Action::StartNode(RunMode::LocalGlibc))),
    item("5", "Reboot VPS", OutputStyle::Failure, MenuEntry::Run(Action::Reboot)),
    item("6", "Back to main menu", OutputStyle::Plain, MenuEntry::Back),
];

/// Look up a typed choice. Surrounding whitespace and case are ignored.
pub fn parse_choice(menu: &[MenuItem], input: &str) -> Option<MenuEntry> {
    let input = input.trim();
    menu.iter()
        .find(|item| item.key.eq_ignore_ascii_case(input))
        .map(|item| item.entry)
}

/// Startup question: initial setup or straight to the menus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Welcome {
    InitialSetup,
    MainMenu,
}

/// Only an explicit `1` runs the setup
pub fn parse_welcome(input: &str) -> Welcome {
    if input.trim() == "1" {
        Welcome::InitialSetup
    } else {
        Welcome::MainMenu
    }
}

/// Greet the user and offer the initial setup. Returns an exit code when
/// the setup ran, since the tool stops afterwards.
pub async fn welcome(manager: &mut NodeManager, console: &mut dyn Console) -> Result<Option<i32>> {
    console.say(&paint(OutputStyle::Frame, &banner("")));
    console.say(&paint(
        OutputStyle::Frame,
        &banner(&format!("Welcome to Nexus Node Tool v{}", crate::cli::VERSION)),
    ));
    console.say(&paint(OutputStyle::Frame, &banner("")));
    console.say("Choose an option:");
    console.say(&format!(
        "1. {} (run this the first time)",
        paint(OutputStyle::Heading, "[INITIAL SETUP]")
    ));
    console.say(&format!(
        "2. {} (go straight to node management)",
        paint(OutputStyle::Success, "[MAIN MENU]")
    ));

    let answer = console.read_line("Enter your choice (1/2): ")?;
    match parse_welcome(&answer) {
        Welcome::InitialSetup => match manager.perform(Action::InitialSetup, console).await? {
            Flow::Exit(code) => Ok(Some(code)),
            Flow::Continue => Ok(None),
        },
        Welcome::MainMenu => Ok(None),
    }
}

/// Saved wallet and node id, framed
pub fn render_header(config: &NodeConfig) -> Vec<String> {
    let value = |text: &str, set: bool| {
        if set {
            paint(OutputStyle::Highlight, text)
        } else {
            paint(OutputStyle::Failure, text)
        }
    };
    vec![
        paint(OutputStyle::Frame, &banner("NEXUS NODE MANAGEMENT")),
        paint(OutputStyle::Heading, "Saved configuration:"),
        format!(
            "- Wallet Address : {}",
            value(config.display_wallet(), config.wallet_address.is_some())
        ),
        format!(
            "- Node ID        : {}",
            value(config.display_node_id(), config.node_id.is_some())
        ),
        paint(OutputStyle::Frame, &banner("")),
    ]
}

pub fn render_items(menu: &[MenuItem]) -> Vec<String> {
    menu.iter()
        .map(|item| format!("{}. {}", item.key, paint(item.style, item.label)))
        .collect()
}

fn invalid_choice(console: &mut dyn Console) {
    console.say(&paint(
        OutputStyle::Failure,
        "Invalid choice. Please try again.\n",
    ));
}

/// Drive the main menu until the user exits. Returns the process exit code.
pub async fn run_plain(manager: &mut NodeManager, console: &mut dyn Console) -> Result<i32> {
    loop {
        manager.refresh_tools();
        pause(console, "\nPress [Enter] to show the menu...")?;
        console.clear()?;

        for line in render_header(manager.config()) {
            console.say(&line);
        }
        console.say("\nChoose an action:");
        for line in render_items(MAIN_MENU) {
            console.say(&line);
        }

        let answer = console.read_line("Enter your choice [1-10]: ")?;
        let flow = match parse_choice(MAIN_MENU, &answer) {
            Some(MenuEntry::Run(action)) => manager.perform(action, console).await?,
            Some(MenuEntry::Utilities) => run_utilities(manager, console).await?,
            Some(MenuEntry::Back) | None => {
                debug!("Rejected main menu input {:?}", answer);
                invalid_choice(console);
                Flow::Continue
            }
        };
        if let Flow::Exit(code) = flow {
            return Ok(code);
        }
    }
}

/// The system utilities submenu
async fn run_utilities(manager: &mut NodeManager, console: &mut dyn Console) -> Result<Flow> {
    loop {
        console.clear()?;
        console.say(&paint(OutputStyle::Highlight, &banner("SYSTEM UTILITIES")));
        for line in render_items(UTILITIES_MENU) {
            console.say(&line);
        }

        let answer = console.read_line("Enter your choice [1-6]: ")?;
        match parse_choice(UTILITIES_MENU, &answer) {
            Some(MenuEntry::Run(action)) => {
                if let Flow::Exit(code) = manager.perform(action, console).await? {
                    return Ok(Flow::Exit(code));
                }
            }
            Some(MenuEntry::Back) => return Ok(Flow::Continue),
            Some(MenuEntry::Utilities) | None => invalid_choice(console),
        }
        pause(console, "\nPress [Enter] to return to the utilities menu...")?;
    }
}
