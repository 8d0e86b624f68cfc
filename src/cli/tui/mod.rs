//! Full-screen dual-panel front end
//!
//! The left panel is a sectioned menu driven with the arrow keys. The right
//! panel shows the saved configuration, or the live log of a screen session
//! refreshed through `screen -X hardcopy`.
//!
//! Actions still talk to a line-based [`TerminalConsole`]: the panel leaves
//! raw mode and the alternate screen while an action runs, then comes back.

use crate::cli::commands::{Action, Flow, NodeManager, RunMode};
use crate::cli::console::{pause, Console, TerminalConsole};
use crate::cli::error::{InteractiveError, Result};
use crate::core::NodeConfig;
use crate::runtime::ToolPaths;
use chrono::{DateTime, Local};
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{Frame, Terminal};
use std::io::{self, IsTerminal, Stdout};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How often a watched session's log is captured again
pub const LOG_REFRESH: Duration = Duration::from_secs(2);

const TICK: Duration = Duration::from_millis(250);

/// What a selectable panel line does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelEntry {
    Run(Action),
    /// Pick a screen session and follow its log in the right panel
    WatchLog,
}

/// A menu line; headers have no entry and cannot be selected
#[derive(Debug, Clone, Copy)]
pub struct PanelItem {
    pub label: &'static str,
    pub entry: Option<PanelEntry>,
}

const fn header(label: &'static str) -> PanelItem {
    PanelItem { label, entry: None }
}

const fn run(label: &'static str, action: Action) -> PanelItem {
    PanelItem {
        label,
        entry: Some(PanelEntry::Run(action)),
    }
}

pub const PANEL_MENU: &[PanelItem] = &[
    header("NODE SETUP"),
    run("Check dependency status", Action::CheckStatus),
    run("Update Nexus CLI", Action::UpdateCli),
    run("Register/Update wallet", Action::RegisterWallet),
    run("Create/Update node ID", Action::RegisterNode),
    header("RUN NODE"),
    run("Run node (foreground)", Action::StartNode(RunMode::Foreground)),
    run("Run node (background)", Action::StartNode(RunMode::Background)),
    run("Run node with max threads", Action::StartNode(RunMode::BackgroundMaxThreads)),
    run("Run node with local GLIBC", Action::StartNode(RunMode::LocalGlibc)),
    header("SESSIONS"),
    PanelItem {
        label: "Watch session log",
        entry: Some(PanelEntry::WatchLog),
    },
    run("Attach to session", Action::ViewSessions),
    run("Stop a session", Action::StopSession),
    header("SYSTEM"),
    run("Check GLIBC version", Action::CheckGlibc),
    run("Update GLIBC", Action::UpdateGlibc),
    run("Create swap file", Action::CreateSwap),
    run("Reboot VPS", Action::Reboot),
    run("Exit", Action::Exit),
];

/// Content of the right panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RightPane {
    Info,
    Log {
        session: String,
        lines: Vec<String>,
        error: Option<String>,
    },
}

/// Result of a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Nothing,
    Quit,
    Activate(PanelEntry),
}

#[derive(Debug, Clone)]
pub struct PanelState {
    items: &'static [PanelItem],
    selected: usize,
    pane: RightPane,
    last_refresh: Option<Instant>,
    /// Wall-clock time of the last successful capture
    updated_at: Option<DateTime<Local>>,
}

impl Default for PanelState {
    fn default() -> Self {
        Self::new(PANEL_MENU)
    }
}

impl PanelState {
    pub fn new(items: &'static [PanelItem]) -> Self {
        let selected = items
            .iter()
            .position(|item| item.entry.is_some())
            .unwrap_or(0);
        Self {
            items,
            selected,
            pane: RightPane::Info,
            last_refresh: None,
            updated_at: None,
        }
    }

    pub fn items(&self) -> &'static [PanelItem] {
        self.items
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn pane(&self) -> &RightPane {
        &self.pane
    }

    pub fn selected_entry(&self) -> Option<PanelEntry> {
        self.items.get(self.selected).and_then(|item| item.entry)
    }

    /// Move to the next selectable line below, staying put at the bottom
    pub fn move_down(&mut self) {
        if let Some(next) = (self.selected + 1..self.items.len())
            .find(|&i| self.items[i].entry.is_some())
        {
            self.selected = next;
        }
    }

    /// Move to the next selectable line above, staying put at the top
    pub fn move_up(&mut self) {
        if let Some(prev) = (0..self.selected)
            .rev()
            .find(|&i| self.items[i].entry.is_some())
        {
            self.selected = prev;
        }
    }

    /// Follow the log of `session`; the first capture happens on the next
    /// refresh check
    pub fn watch(&mut self, session: String) {
        self.pane = RightPane::Log {
            session,
            lines: Vec::new(),
            error: None,
        };
        self.last_refresh = None;
        self.updated_at = None;
    }

    pub fn stop_watching(&mut self) {
        self.pane = RightPane::Info;
        self.last_refresh = None;
        self.updated_at = None;
    }

    pub fn updated_at(&self) -> Option<DateTime<Local>> {
        self.updated_at
    }

    pub fn watched_session(&self) -> Option<&str> {
        match &self.pane {
            RightPane::Log { session, .. } => Some(session),
            RightPane::Info => None,
        }
    }

    pub fn needs_refresh(&self, now: Instant) -> bool {
        self.watched_session().is_some()
            && self
                .last_refresh
                .map_or(true, |at| now.duration_since(at) >= LOG_REFRESH)
    }

    /// Store a fresh capture, or the reason it failed. A capture that is not
    /// ready yet keeps the current lines.
    pub fn set_log(
        &mut self,
        capture: std::result::Result<Option<Vec<String>>, String>,
        now: Instant,
    ) {
        if let RightPane::Log { lines, error, .. } = &mut self.pane {
            match capture {
                Ok(None) => {}
                Ok(Some(fresh)) => {
                    *lines = fresh;
                    *error = None;
                    self.updated_at = Some(Local::now());
                }
                Err(reason) => *error = Some(reason),
            }
        }
        self.last_refresh = Some(now);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.kind != KeyEventKind::Press {
            return KeyOutcome::Nothing;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                KeyOutcome::Quit
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_up();
                KeyOutcome::Nothing
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_down();
                KeyOutcome::Nothing
            }
            KeyCode::Enter => self
                .selected_entry()
                .map_or(KeyOutcome::Nothing, KeyOutcome::Activate),
            KeyCode::Char('q') | KeyCode::Esc => {
                if self.watched_session().is_some() {
                    self.stop_watching();
                    KeyOutcome::Nothing
                } else {
                    KeyOutcome::Quit
                }
            }
            _ => KeyOutcome::Nothing,
        }
    }
}

/// The last lines of `lines` that fit in `height` rows, without trailing
/// blank rows
pub fn log_tail(lines: &[String], height: usize) -> &[String] {
    let end = lines
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .map_or(0, |i| i + 1);
    &lines[end.saturating_sub(height)..end]
}

fn found(name: &str, path: Option<&std::path::Path>) -> Line<'static> {
    match path {
        Some(_) => Line::from(vec![
            Span::raw(format!("{:<15}", name)),
            Span::styled("FOUND", Style::default().fg(Color::Green)),
        ]),
        None => Line::from(vec![
            Span::raw(format!("{:<15}", name)),
            Span::styled("NOT FOUND", Style::default().fg(Color::Red)),
        ]),
    }
}

fn menu_lines(state: &PanelState) -> Vec<Line<'static>> {
    state
        .items()
        .iter()
        .enumerate()
        .map(|(i, item)| match item.entry {
            None => Line::from(Span::styled(
                format!("─ {} ─", item.label),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Some(_) if i == state.selected() => Line::from(Span::styled(
                format!("▶ {}", item.label),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            Some(_) => Line::from(format!("  {}", item.label)),
        })
        .collect()
}

fn info_lines(config: &NodeConfig, paths: &ToolPaths) -> Vec<Line<'static>> {
    let value = |text: &str, set: bool| {
        let color = if set { Color::Yellow } else { Color::Red };
        Span::styled(text.to_string(), Style::default().fg(color))
    };
    vec![
        Line::from(Span::styled(
            "Saved configuration",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::raw("Wallet Address : "),
            value(config.display_wallet(), config.wallet_address.is_some()),
        ]),
        Line::from(vec![
            Span::raw("Node ID        : "),
            value(config.display_node_id(), config.node_id.is_some()),
        ]),
        Line::default(),
        Line::from(Span::styled(
            "Tools",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        found("screen", paths.screen.as_deref()),
        found("rustc", paths.rustc.as_deref()),
        found("nexus-network", paths.nexus_cli.as_deref()),
        Line::default(),
        Line::from(Span::styled(
            "Keys",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from("↑/↓ or k/j  move"),
        Line::from("Enter       run the selected action"),
        Line::from("q / Esc     leave the log view, or quit"),
    ]
}

/// Draw both panels
pub fn render(frame: &mut Frame, state: &PanelState, config: &NodeConfig, paths: &ToolPaths) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(frame.area());

    let menu = Paragraph::new(menu_lines(state)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Nexus Node Tool v{} ", crate::cli::VERSION)),
    );
    frame.render_widget(menu, columns[0]);

    render_right(frame, columns[1], state, config, paths);
}

fn render_right(
    frame: &mut Frame,
    area: Rect,
    state: &PanelState,
    config: &NodeConfig,
    paths: &ToolPaths,
) {
    match state.pane() {
        RightPane::Info => {
            let info = Paragraph::new(info_lines(config, paths))
                .block(Block::default().borders(Borders::ALL).title(" Info "));
            frame.render_widget(info, area);
        }
        RightPane::Log {
            session,
            lines,
            error,
        } => {
            let mut height = area.height.saturating_sub(2) as usize;
            let mut body: Vec<Line> = Vec::new();
            if let Some(reason) = error {
                body.push(Line::from(Span::styled(
                    reason.clone(),
                    Style::default().fg(Color::Red),
                )));
                height = height.saturating_sub(1);
            }
            if lines.is_empty() && error.is_none() {
                body.push(Line::from("Waiting for output..."));
            }
            body.extend(log_tail(lines, height).iter().map(|l| Line::from(l.clone())));

            let title = match state.updated_at() {
                Some(at) => format!(" Log: {} @ {} (q to close) ", session, at.format("%H:%M:%S")),
                None => format!(" Log: {} (q to close) ", session),
            };
            let log = Paragraph::new(body).block(Block::default().borders(Borders::ALL).title(title));
            frame.render_widget(log, area);
        }
    }
}

fn terminal_error(e: io::Error) -> InteractiveError {
    InteractiveError::terminal(e.to_string())
}

/// Raw-mode terminal on the alternate screen, restored when dropped
struct PanelTerminal {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl PanelTerminal {
    fn enter() -> Result<Self> {
        if !io::stdout().is_terminal() {
            return Err(InteractiveError::terminal("stdout is not a terminal"));
        }
        enable_raw_mode().map_err(terminal_error)?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(terminal_error)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout)).map_err(terminal_error)?;
        terminal.clear().map_err(terminal_error)?;
        Ok(Self {
            terminal,
            active: true,
        })
    }

    /// Hand the terminal back to line-based I/O
    fn suspend(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        disable_raw_mode().map_err(terminal_error)?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen).map_err(terminal_error)?;
        self.terminal.show_cursor().map_err(terminal_error)
    }

    fn resume(&mut self) -> Result<()> {
        if self.active {
            return Ok(());
        }
        enable_raw_mode().map_err(terminal_error)?;
        execute!(self.terminal.backend_mut(), EnterAlternateScreen).map_err(terminal_error)?;
        self.active = true;
        self.terminal.clear().map_err(terminal_error)
    }

    fn draw(&mut self, state: &PanelState, manager: &NodeManager) -> Result<()> {
        self.terminal
            .draw(|frame| render(frame, state, manager.config(), manager.paths()))
            .map(|_| ())
            .map_err(terminal_error)
    }
}

impl Drop for PanelTerminal {
    fn drop(&mut self) {
        if let Err(e) = self.suspend() {
            warn!("Failed to restore the terminal: {}", e);
        }
    }
}

/// Run one menu entry on the plain terminal. Returns an exit code when the
/// action ends the tool.
async fn activate(
    entry: PanelEntry,
    state: &mut PanelState,
    manager: &mut NodeManager,
) -> Result<Option<i32>> {
    let mut console = TerminalConsole::new();
    console.clear()?;
    match entry {
        PanelEntry::Run(action) => {
            if let Flow::Exit(code) = manager.perform(action, &mut console).await? {
                return Ok(Some(code));
            }
            pause(&mut console, "\nPress [Enter] to return to the panel...")?;
        }
        PanelEntry::WatchLog => match manager.choose_session_to_watch(&mut console).await? {
            Some(session) => state.watch(session),
            None => pause(&mut console, "\nPress [Enter] to return to the panel...")?,
        },
    }
    manager.refresh_tools();
    Ok(None)
}

async fn refresh_log(state: &mut PanelState, manager: &NodeManager) {
    let Some(session) = state.watched_session().map(str::to_string) else {
        return;
    };
    let capture = manager
        .session_log(&session)
        .await
        .map_err(|e| e.user_message());
    if let Err(reason) = &capture {
        debug!("Log capture of {} failed: {}", session, reason);
    }
    state.set_log(capture, Instant::now());
}

/// Drive the panel until the user quits. Returns the process exit code.
pub async fn run_panel(manager: &mut NodeManager) -> Result<i32> {
    let mut terminal = PanelTerminal::enter()?;
    let mut state = PanelState::default();
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(TICK);

    loop {
        if state.needs_refresh(Instant::now()) {
            refresh_log(&mut state, manager).await;
        }
        terminal.draw(&state, manager)?;

        let outcome = tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) => state.handle_key(key),
                Some(Ok(_)) => KeyOutcome::Nothing,
                Some(Err(e)) => return Err(terminal_error(e)),
                None => KeyOutcome::Quit,
            },
            _ = tick.tick() => KeyOutcome::Nothing,
        };

        match outcome {
            KeyOutcome::Nothing => {}
            KeyOutcome::Quit | KeyOutcome::Activate(PanelEntry::Run(Action::Exit)) => break,
            KeyOutcome::Activate(entry) => {
                drop(events);
                terminal.suspend()?;
                let result = activate(entry, &mut state, manager).await;
                if let Some(code) = result? {
                    return Ok(code);
                }
                terminal.resume()?;
                events = EventStream::new();
            }
        }
    }

    terminal.suspend()?;
    TerminalConsole::new().say("👋 Goodbye!");
    Ok(0)
}
