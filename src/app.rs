//! Interactive controller: modes, key handling, and refresh bookkeeping.
//!
//! The controller never blocks on listings. It queues [`Refresh`] requests,
//! the runtime runs them on background threads, and their results come back
//! one at a time through [`App::on_message`].

use crate::error::{Error, Result};
use crate::input::TextInput;
use crate::models::{Session, Window};
use crate::save::SessionStore;
use crate::tmux::Multiplexer;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    CreateInput,
    RenameInput,
    ConfirmDelete,
    LoadInput,
    FuzzyFind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

impl Status {
    pub fn text(&self) -> &str {
        match self {
            Status::Info(text) | Status::Error(text) => text,
        }
    }
}

/// Background listing the runtime should start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refresh {
    Sessions,
    Windows(String),
}

/// Completion of a [`Refresh`].
#[derive(Debug)]
pub enum Message {
    Sessions(Result<Vec<Session>>),
    Windows {
        session: String,
        result: Result<Vec<Window>>,
    },
}

/// What the runtime must do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
    /// Release the terminal and hand it over to the session.
    Attach(String),
    /// Release the terminal and run the fuzzy selector.
    FuzzyFind,
}

/// Runs a refresh to completion. Called off the controller's thread.
pub fn run_refresh<M: Multiplexer + ?Sized>(tmux: &M, request: Refresh) -> Message {
    match request {
        Refresh::Sessions => Message::Sessions(tmux.list_sessions()),
        Refresh::Windows(session) => {
            let result = tmux.list_windows(&session);
            Message::Windows { session, result }
        }
    }
}

pub struct App<M: Multiplexer> {
    tmux: Arc<M>,
    store: SessionStore,
    mode: Mode,
    input: TextInput,
    sessions: Vec<Session>,
    windows: Vec<Window>,
    cursor: usize,
    selected: Option<String>,
    status: Option<Status>,
    requests: Vec<Refresh>,
}

impl<M: Multiplexer> App<M> {
    pub fn new(tmux: Arc<M>, store: SessionStore) -> Self {
        App {
            tmux,
            store,
            mode: Mode::Normal,
            input: TextInput::new(),
            sessions: Vec::new(),
            windows: Vec::new(),
            cursor: 0,
            selected: None,
            status: None,
            requests: vec![Refresh::Sessions],
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn input(&self) -> &TextInput {
        &self.input
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// Drains the refreshes queued since the last call.
    pub fn take_requests(&mut self) -> Vec<Refresh> {
        std::mem::take(&mut self.requests)
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            debug!(from = ?self.mode, to = ?mode, "mode change");
            self.mode = mode;
        }
    }

    fn fail(&mut self, err: Error) {
        warn!(error = %err, "operation failed");
        self.status = Some(Status::Error(err.to_string()));
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Effect {
        self.status = None;

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Effect::Quit;
        }

        match self.mode {
            Mode::Normal => {
                let effect = self.normal_key(key);
                if self.mode == Mode::Normal {
                    self.sync_selection();
                }
                effect
            }
            Mode::CreateInput | Mode::RenameInput | Mode::LoadInput => {
                self.input_key(key);
                Effect::None
            }
            Mode::ConfirmDelete => {
                self.confirm_key(key);
                Effect::None
            }
            // The runtime owns the terminal until the selector returns.
            Mode::FuzzyFind => Effect::None,
        }
    }

    fn normal_key(&mut self, key: KeyEvent) -> Effect {
        match key.code {
            KeyCode::Char('q') => return Effect::Quit,
            KeyCode::Char('c') => self.start_input(Mode::CreateInput),
            KeyCode::Char('d') | KeyCode::Char('k') => {
                if self.selected.is_some() {
                    self.set_mode(Mode::ConfirmDelete);
                }
            }
            KeyCode::Char('r') => {
                if self.selected.is_some() {
                    self.start_input(Mode::RenameInput);
                }
            }
            KeyCode::Char('s') => self.save_selected(),
            KeyCode::Char('l') => self.start_input(Mode::LoadInput),
            KeyCode::Char('/') => {
                self.set_mode(Mode::FuzzyFind);
                return Effect::FuzzyFind;
            }
            KeyCode::Enter => {
                if let Some(name) = &self.selected {
                    return Effect::Attach(name.clone());
                }
            }
            KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + 1 < self.sessions.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Home | KeyCode::Char('g') => self.cursor = 0,
            KeyCode::End | KeyCode::Char('G') => {
                self.cursor = self.sessions.len().saturating_sub(1);
            }
            _ => {}
        }
        Effect::None
    }

    fn start_input(&mut self, mode: Mode) {
        self.input.reset();
        self.set_mode(mode);
    }

    fn input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_input(),
            KeyCode::Esc => {
                self.input.reset();
                self.set_mode(Mode::Normal);
            }
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Delete => self.input.delete(),
            KeyCode::Left => self.input.left(),
            KeyCode::Right => self.input.right(),
            KeyCode::Home => self.input.home(),
            KeyCode::End => self.input.end(),
            KeyCode::Char(c) => self.input.insert(c),
            _ => {}
        }
    }

    fn submit_input(&mut self) {
        let value = self.input.value();
        let name = value.trim();
        if name.is_empty() {
            return;
        }

        let result = match self.mode {
            Mode::CreateInput => self.tmux.create_session(name),
            Mode::RenameInput => match self.selected.clone() {
                Some(old) => self
                    .tmux
                    .rename_session(&old, name)
                    .map(|()| self.rename_local(&old, name)),
                None => Ok(()),
            },
            Mode::LoadInput => self.store.load(self.tmux.as_ref(), name).map(|saved| {
                self.status = Some(Status::Info(format!(
                    "loaded '{}' ({} windows)",
                    saved.name,
                    saved.windows.len()
                )));
            }),
            _ => Ok(()),
        };

        self.set_mode(Mode::Normal);
        match result {
            Ok(()) => self.requests.push(Refresh::Sessions),
            Err(err) => self.fail(err),
        }
    }

    fn confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                if let Some(name) = self.selected.clone() {
                    if let Err(err) = self.tmux.kill_session(&name) {
                        self.fail(err);
                    }
                }
                self.set_mode(Mode::Normal);
                self.requests.push(Refresh::Sessions);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.set_mode(Mode::Normal);
            }
            _ => {}
        }
    }

    fn save_selected(&mut self) {
        let Some(name) = self.selected.clone() else {
            return;
        };
        match self.store.save(self.tmux.as_ref(), &name) {
            Ok(path) => {
                self.status = Some(Status::Info(format!(
                    "saved '{}' to {}",
                    name,
                    path.display()
                )));
            }
            Err(err) => self.fail(err),
        }
    }

    /// Mirrors a successful rename into the cached list so the selection
    /// stays a member of it until the next refresh lands.
    fn rename_local(&mut self, old: &str, new: &str) {
        if let Some(session) = self.sessions.iter_mut().find(|s| s.name == old) {
            session.name = new.to_string();
        }
        if self.selected.as_deref() == Some(old) {
            self.selected = Some(new.to_string());
        }
    }

    /// Points the tracked selection at the cursor; a change queues one window refresh.
    fn sync_selection(&mut self) {
        let Some(session) = self.sessions.get(self.cursor) else {
            return;
        };
        if self.selected.as_deref() != Some(session.name.as_str()) {
            self.selected = Some(session.name.clone());
            self.requests.push(Refresh::Windows(session.name.clone()));
        }
    }

    pub fn on_message(&mut self, message: Message) {
        match message {
            Message::Sessions(Ok(sessions)) => {
                debug!(count = sessions.len(), "sessions refreshed");
                self.sessions = sessions;
                self.reconcile_selection();
            }
            Message::Windows {
                session,
                result: Ok(windows),
            } => {
                debug!(session = %session, count = windows.len(), "windows refreshed");
                self.windows = windows;
            }
            Message::Sessions(Err(err)) | Message::Windows { result: Err(err), .. } => {
                self.fail(err);
            }
        }
    }

    fn reconcile_selection(&mut self) {
        if self.sessions.is_empty() {
            self.cursor = 0;
            self.selected = None;
            self.windows.clear();
            return;
        }

        let kept = self
            .selected
            .as_deref()
            .and_then(|name| self.sessions.iter().position(|s| s.name == name));
        self.cursor = kept.unwrap_or_else(|| self.cursor.min(self.sessions.len() - 1));

        let name = self.sessions[self.cursor].name.clone();
        self.selected = Some(name.clone());
        self.requests.push(Refresh::Windows(name));
    }

    /// The runtime got the terminal back from an attach or fuzzy hand-off.
    pub fn handoff_failed(&mut self, err: Error) {
        self.set_mode(Mode::Normal);
        self.fail(err);
    }
}
