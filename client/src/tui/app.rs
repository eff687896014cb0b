//! Application state and event handling for the interactive board.
//!
//! This module provides:
//!
//! - [`BoardApp`]: Screen state wrapped around a [`Board`] (selection, input
//!   modes, the login form) and the key bindings that drive it
//! - [`Action`]: Remote operations a key press asks for, performed by
//!   [`BoardApp::perform`]
//! - [`Theme`]: Styles used by the widgets, with `NO_COLOR` support
//! - [`EventHandler`]: Async event loop using `tokio::select!` to multiplex
//!   terminal input and ticks
//!
//! Key handling is split in two so it can be tested without a terminal or a
//! server: [`BoardApp::on_key`] only updates local state and returns the
//! [`Action`] to run, and [`BoardApp::perform`] awaits it against the board.

use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::style::{Color, Modifier, Style};
use tokio::sync::{mpsc, oneshot};
use zeroize::Zeroize;

use crate::board::Board;
use crate::types::{Column, NewTask, TaskStatus};

// ============================================================================
// Theme
// ============================================================================

/// Color theme for the board.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Style for unfocused borders (default: dark gray).
    pub border: Style,
    /// Style for the focused column border (default: cyan).
    pub border_focused: Style,
    /// Style for titles (default: white bold).
    pub title: Style,
    /// Style for primary text.
    pub text_primary: Style,
    /// Style for muted text such as key hints (default: dark gray).
    pub text_muted: Style,
    /// Style for the selected task (default: reversed).
    pub selected: Style,
    /// Style for completed tasks (default: dark gray, crossed out).
    pub task_done: Style,

    /// Priority markers.
    pub priority_high: Style,
    pub priority_medium: Style,
    pub priority_low: Style,

    /// Style for the focused login field (default: cyan bold).
    pub input_focused: Style,
    /// Style for unfocused login fields (default: gray).
    pub input_unfocused: Style,
    /// Style for error messages (default: red).
    pub input_error: Style,
    /// Style for form labels (default: white).
    pub label: Style,
    /// Style for the "working" indicator (default: yellow).
    pub status_busy: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            border: Style::default().fg(Color::DarkGray),
            border_focused: Style::default().fg(Color::Cyan),
            title: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            text_primary: Style::default(),
            text_muted: Style::default().fg(Color::DarkGray),
            selected: Style::default().add_modifier(Modifier::REVERSED),
            task_done: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::CROSSED_OUT),

            priority_high: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            priority_medium: Style::default().fg(Color::Yellow),
            priority_low: Style::default().fg(Color::Green),

            input_focused: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            input_unfocused: Style::default().fg(Color::Gray),
            input_error: Style::default().fg(Color::Red),
            label: Style::default().fg(Color::White),
            status_busy: Style::default().fg(Color::Yellow),
        }
    }
}

impl Theme {
    /// Creates a monochrome theme for `NO_COLOR` support.
    #[must_use]
    pub fn monochrome() -> Self {
        Self {
            border: Style::default(),
            border_focused: Style::default().add_modifier(Modifier::BOLD),
            title: Style::default().add_modifier(Modifier::BOLD),
            text_primary: Style::default(),
            text_muted: Style::default().add_modifier(Modifier::DIM),
            selected: Style::default().add_modifier(Modifier::REVERSED),
            task_done: Style::default().add_modifier(Modifier::DIM | Modifier::CROSSED_OUT),

            priority_high: Style::default().add_modifier(Modifier::BOLD),
            priority_medium: Style::default(),
            priority_low: Style::default().add_modifier(Modifier::DIM),

            input_focused: Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            input_unfocused: Style::default().add_modifier(Modifier::DIM),
            input_error: Style::default().add_modifier(Modifier::BOLD),
            label: Style::default(),
            status_busy: Style::default().add_modifier(Modifier::ITALIC),
        }
    }

    /// Returns [`Theme::monochrome`] if `NO_COLOR` is set, the default otherwise.
    #[must_use]
    pub fn from_env() -> Self {
        if std::env::var("NO_COLOR").is_ok() {
            Self::monochrome()
        } else {
            Self::default()
        }
    }
}

// ============================================================================
// Login form
// ============================================================================

/// Whether the login screen signs in or creates an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginMode {
    #[default]
    SignIn,
    Register,
}

/// Input fields of the login form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    Name,
    #[default]
    Email,
    Password,
}

impl LoginField {
    /// Label shown next to the field.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            LoginField::Name => "Name",
            LoginField::Email => "Email",
            LoginField::Password => "Password",
        }
    }
}

/// Values typed into the login screen.
#[derive(Default)]
pub struct LoginForm {
    pub mode: LoginMode,
    pub focused: LoginField,
    pub name: String,
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// Fields shown in the current mode, top to bottom.
    #[must_use]
    pub fn fields(&self) -> &'static [LoginField] {
        match self.mode {
            LoginMode::SignIn => &[LoginField::Email, LoginField::Password],
            LoginMode::Register => &[LoginField::Name, LoginField::Email, LoginField::Password],
        }
    }

    /// Current value of `field`.
    #[must_use]
    pub fn value(&self, field: LoginField) -> &str {
        match field {
            LoginField::Name => &self.name,
            LoginField::Email => &self.email,
            LoginField::Password => &self.password,
        }
    }

    pub fn focus_next(&mut self) {
        let fields = self.fields();
        let index = self.focus_index();
        self.focused = fields[(index + 1) % fields.len()];
    }

    pub fn focus_prev(&mut self) {
        let fields = self.fields();
        let index = self.focus_index();
        self.focused = fields[(index + fields.len() - 1) % fields.len()];
    }

    /// Switches between sign-in and registration.
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            LoginMode::SignIn => LoginMode::Register,
            LoginMode::Register => LoginMode::SignIn,
        };
        if !self.fields().contains(&self.focused) {
            self.focused = LoginField::Email;
        }
    }

    pub fn push(&mut self, c: char) {
        self.focused_value_mut().push(c);
    }

    pub fn backspace(&mut self) {
        self.focused_value_mut().pop();
    }

    /// Wipes the typed password.
    pub fn clear_password(&mut self) {
        self.password.zeroize();
    }

    fn focus_index(&self) -> usize {
        self.fields()
            .iter()
            .position(|field| *field == self.focused)
            .unwrap_or(0)
    }

    fn focused_value_mut(&mut self) -> &mut String {
        match self.focused {
            LoginField::Name => &mut self.name,
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("mode", &self.mode)
            .field("focused", &self.focused)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Board state
// ============================================================================

/// What keystrokes currently edit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Keys navigate and trigger commands.
    #[default]
    Normal,
    /// Keys edit the search term.
    Search,
    /// Keys edit the title of a new task.
    NewTask,
    /// Waiting for `y` to delete this task.
    ConfirmDelete(String),
}

/// A remote operation requested by a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Sign in with the login form's email and password.
    Login,
    /// Register with the login form's name, email and password.
    Register,
    Refresh,
    Create(String),
    Toggle(String),
    SetStatus(String, TaskStatus),
    Delete(String),
    Logout,
}

impl Action {
    /// Text shown in the status line while the action runs.
    #[must_use]
    pub fn progress_label(&self) -> &'static str {
        match self {
            Action::Login => "Signing in...",
            Action::Register => "Creating account...",
            Action::Refresh => "Refreshing...",
            Action::Create(_) => "Adding task...",
            Action::Toggle(_) | Action::SetStatus(..) => "Updating task...",
            Action::Delete(_) => "Deleting task...",
            Action::Logout => "Signing out...",
        }
    }
}

/// State of the interactive board.
#[derive(Debug)]
pub struct BoardApp {
    /// The board being displayed.
    pub board: Board,
    pub theme: Theme,
    pub mode: InputMode,
    pub login: LoginForm,

    /// Focused column.
    pub column: Column,

    /// Selected row per column, clamped to the column length on use.
    rows: [usize; 3],

    /// Title being typed for a new task.
    pub draft: String,

    /// Progress message for a running operation.
    pub busy: Option<&'static str>,

    should_quit: bool,
}

impl BoardApp {
    #[must_use]
    pub fn new(board: Board, theme: Theme) -> Self {
        Self {
            board,
            theme,
            mode: InputMode::Normal,
            login: LoginForm::default(),
            column: Column::Todo,
            rows: [0; 3],
            draft: String::new(),
            busy: None,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Selected row in the focused column, or `None` if the column is empty.
    #[must_use]
    pub fn selected_row(&self) -> Option<usize> {
        let len = self.board.view().grouped.column(self.column).len();
        if len == 0 {
            None
        } else {
            Some(self.rows[self.column.index()].min(len - 1))
        }
    }

    /// Identifier of the selected task.
    #[must_use]
    pub fn selected_task_id(&self) -> Option<String> {
        let row = self.selected_row()?;
        let view = self.board.view();
        view.grouped
            .column(self.column)
            .get(row)
            .map(|task| task.id.clone())
    }

    /// Handles one key press and returns the remote action it requests.
    pub fn on_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return None;
        }

        if !self.board.is_authenticated() {
            return self.on_login_key(key);
        }

        match self.mode.clone() {
            InputMode::Normal => self.on_board_key(key),
            InputMode::Search => {
                self.on_search_key(key);
                None
            }
            InputMode::NewTask => self.on_draft_key(key),
            InputMode::ConfirmDelete(id) => {
                self.mode = InputMode::Normal;
                match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => Some(Action::Delete(id)),
                    _ => None,
                }
            }
        }
    }

    /// Runs `action` against the board. Failures end up in `board.error()`.
    pub async fn perform(&mut self, action: Action) {
        match action {
            Action::Login => {
                let result = self
                    .board
                    .login(&self.login.email, &self.login.password)
                    .await;
                self.login.clear_password();
                if result.is_ok() {
                    self.reset_selection();
                }
            }
            Action::Register => {
                let name = Some(self.login.name.trim()).filter(|name| !name.is_empty());
                let result = self
                    .board
                    .register(name, &self.login.email, &self.login.password)
                    .await;
                self.login.clear_password();
                if result.is_ok() {
                    self.reset_selection();
                }
            }
            Action::Refresh => {
                let _ = self.board.refresh().await;
            }
            Action::Create(title) => {
                if let Ok(task) = self.board.create_task(NewTask::new(title)).await {
                    self.select_task(task.column(), &task.id);
                }
            }
            Action::Toggle(id) => {
                if let Ok(task) = self.board.toggle_complete(&id).await {
                    self.select_task(task.column(), &task.id);
                }
            }
            Action::SetStatus(id, status) => {
                if let Ok(task) = self.board.set_status(&id, status).await {
                    self.select_task(task.column(), &task.id);
                }
            }
            Action::Delete(id) => {
                let _ = self.board.delete_task(&id).await;
            }
            Action::Logout => {
                let _ = self.board.logout();
                self.login = LoginForm::default();
                self.mode = InputMode::Normal;
                self.reset_selection();
            }
        }
    }

    fn on_login_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r') {
            self.login.toggle_mode();
            self.board.clear_error();
            return None;
        }

        match key.code {
            KeyCode::Esc => self.quit(),
            KeyCode::Tab | KeyCode::Down => self.login.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.login.focus_prev(),
            KeyCode::Backspace => self.login.backspace(),
            KeyCode::Enter => {
                return Some(match self.login.mode {
                    LoginMode::SignIn => Action::Login,
                    LoginMode::Register => Action::Register,
                })
            }
            KeyCode::Char(c) => self.login.push(c),
            _ => {}
        }
        None
    }

    fn on_board_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Esc => self.board.clear_error(),
            KeyCode::Char('h') | KeyCode::Left => {
                if let Some(column) = self.column.prev() {
                    self.column = column;
                }
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if let Some(column) = self.column.next() {
                    self.column = column;
                }
            }
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Char(' ') => return self.selected_task_id().map(Action::Toggle),
            KeyCode::Char('<') => return self.move_selected(self.column.prev()),
            KeyCode::Char('>') => return self.move_selected(self.column.next()),
            KeyCode::Char('f') => {
                let next = self.board.filter().next();
                self.board.set_filter(next);
            }
            KeyCode::Char('/') => self.mode = InputMode::Search,
            KeyCode::Char('n') => {
                self.draft.clear();
                self.mode = InputMode::NewTask;
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_task_id() {
                    self.mode = InputMode::ConfirmDelete(id);
                }
            }
            KeyCode::Char('r') => return Some(Action::Refresh),
            KeyCode::Char('L') => return Some(Action::Logout),
            _ => {}
        }
        None
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.mode = InputMode::Normal,
            KeyCode::Esc => {
                self.board.set_search("");
                self.mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                let mut search = self.board.search().to_string();
                search.pop();
                self.board.set_search(search);
            }
            KeyCode::Char(c) => {
                let mut search = self.board.search().to_string();
                search.push(c);
                self.board.set_search(search);
            }
            _ => {}
        }
    }

    fn on_draft_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Enter => {
                self.mode = InputMode::Normal;
                return Some(Action::Create(std::mem::take(&mut self.draft)));
            }
            KeyCode::Esc => {
                self.draft.clear();
                self.mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                self.draft.pop();
            }
            KeyCode::Char(c) => self.draft.push(c),
            _ => {}
        }
        None
    }

    fn move_selected(&self, target: Option<Column>) -> Option<Action> {
        let id = self.selected_task_id()?;
        let column = target?;
        Some(Action::SetStatus(id, TaskStatus::from(column)))
    }

    fn move_selection(&mut self, delta: isize) {
        let Some(row) = self.selected_row() else {
            return;
        };
        let len = self.board.view().grouped.column(self.column).len();
        let next = row.saturating_add_signed(delta).min(len - 1);
        self.rows[self.column.index()] = next;
    }

    /// Focuses `column` and the row holding task `id`, if it is visible.
    fn select_task(&mut self, column: Column, id: &str) {
        let position = self
            .board
            .view()
            .grouped
            .column(column)
            .iter()
            .position(|task| task.id == id);
        if let Some(row) = position {
            self.column = column;
            self.rows[column.index()] = row;
        }
    }

    fn reset_selection(&mut self) {
        self.column = Column::Todo;
        self.rows = [0; 3];
    }
}

// ============================================================================
// Events
// ============================================================================

/// Events consumed by the board's main loop.
#[derive(Debug, Clone)]
pub enum TuiEvent {
    /// Periodic tick; triggers a redraw.
    Tick,

    /// Terminal key press.
    Key(KeyEvent),

    /// Terminal resize (columns, rows).
    Resize(u16, u16),
}

/// Default tick rate for the event handler.
pub const DEFAULT_TICK_RATE_MS: u64 = 250;

/// Default poll timeout for checking terminal input.
const DEFAULT_POLL_TIMEOUT_MS: u64 = 10;

/// Polls the terminal for input and generates periodic tick events.
///
/// Runs in its own tokio task until the shutdown signal fires or the
/// receiving side of the channel is dropped.
#[derive(Debug)]
pub struct EventHandler {
    /// Channel sender for dispatching events to the main loop.
    event_tx: mpsc::Sender<TuiEvent>,
    /// Receiver for the shutdown signal.
    shutdown_rx: oneshot::Receiver<()>,
    tick_rate: Duration,
}

impl EventHandler {
    /// Creates a new `EventHandler` with the default tick rate.
    pub fn new(event_tx: mpsc::Sender<TuiEvent>, shutdown_rx: oneshot::Receiver<()>) -> Self {
        Self::with_tick_rate(
            event_tx,
            shutdown_rx,
            Duration::from_millis(DEFAULT_TICK_RATE_MS),
        )
    }

    /// Creates a new `EventHandler` with a custom tick rate.
    pub fn with_tick_rate(
        event_tx: mpsc::Sender<TuiEvent>,
        shutdown_rx: oneshot::Receiver<()>,
        tick_rate: Duration,
    ) -> Self {
        Self {
            event_tx,
            shutdown_rx,
            tick_rate,
        }
    }

    /// Returns the configured tick rate.
    pub fn tick_rate(&self) -> Duration {
        self.tick_rate
    }

    /// Runs the event loop until a shutdown signal is received.
    ///
    /// # Errors
    ///
    /// Returns an error if the blocking terminal poll task panics.
    pub async fn run(mut self) -> std::io::Result<()> {
        let mut tick_interval = tokio::time::interval(self.tick_rate);
        tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // The first tick completes immediately
        tick_interval.tick().await;

        loop {
            tokio::select! {
                biased;

                _ = &mut self.shutdown_rx => {
                    tracing::debug!("EventHandler received shutdown signal");
                    break;
                }

                _ = tick_interval.tick() => {
                    if self.event_tx.send(TuiEvent::Tick).await.is_err() {
                        tracing::debug!("Event receiver dropped, exiting event loop");
                        break;
                    }
                }

                result = async {
                    tokio::time::sleep(Duration::from_millis(DEFAULT_POLL_TIMEOUT_MS)).await;
                    tokio::task::spawn_blocking(|| {
                        Self::poll_terminal_event(Duration::from_millis(DEFAULT_POLL_TIMEOUT_MS))
                    }).await
                } => {
                    match result {
                        Ok(Some(event)) => {
                            if self.event_tx.send(event).await.is_err() {
                                tracing::debug!("Event receiver dropped, exiting event loop");
                                break;
                            }
                        }
                        Ok(None) => {}
                        Err(join_error) => {
                            tracing::error!("spawn_blocking task panicked: {}", join_error);
                            return Err(std::io::Error::other(
                                "Terminal polling task panicked",
                            ));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Polls for one terminal event. Blocking; call via `spawn_blocking`.
    ///
    /// Poll failures (no terminal, as in CI) are reported as "no event".
    fn poll_terminal_event(timeout: Duration) -> Option<TuiEvent> {
        match event::poll(timeout) {
            Ok(true) => match event::read() {
                Ok(crossterm_event) => Self::convert_crossterm_event(crossterm_event),
                Err(e) => {
                    tracing::trace!("Failed to read terminal event: {}", e);
                    None
                }
            },
            Ok(false) => None,
            Err(e) => {
                tracing::trace!("Failed to poll terminal: {}", e);
                None
            }
        }
    }

    /// Keeps key and resize events; drops mouse, focus and paste events.
    fn convert_crossterm_event(event: CrosstermEvent) -> Option<TuiEvent> {
        match event {
            CrosstermEvent::Key(key_event) => Some(TuiEvent::Key(key_event)),
            CrosstermEvent::Resize(cols, rows) => Some(TuiEvent::Resize(cols, rows)),
            CrosstermEvent::Mouse(_)
            | CrosstermEvent::FocusGained
            | CrosstermEvent::FocusLost
            | CrosstermEvent::Paste(_) => None,
        }
    }
}
