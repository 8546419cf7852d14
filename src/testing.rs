//! In-memory multiplexer for exercising the controller and store without tmux.

use crate::app::{run_refresh, App};
use crate::error::{Error, Result};
use crate::models::{Session, Window};
use crate::tmux::Multiplexer;
use std::sync::Mutex;

#[derive(Default)]
struct State {
    sessions: Vec<(String, Vec<String>)>,
    calls: Vec<String>,
    fail_lists: bool,
}

#[derive(Default)]
pub struct FakeTmux {
    state: Mutex<State>,
}

impl FakeTmux {
    pub fn with_sessions(sessions: &[(&str, &[&str])]) -> Self {
        let fake = FakeTmux::default();
        {
            let mut state = fake.state.lock().unwrap();
            state.sessions = sessions
                .iter()
                .map(|(name, windows)| {
                    (
                        name.to_string(),
                        windows.iter().map(|w| w.to_string()).collect(),
                    )
                })
                .collect();
        }
        fake
    }

    pub fn fail_lists(&self) {
        self.state.lock().unwrap().fail_lists = true;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn window_names(&self, session: &str) -> Option<Vec<String>> {
        let state = self.state.lock().unwrap();
        state
            .sessions
            .iter()
            .find(|(name, _)| name == session)
            .map(|(_, windows)| windows.clone())
    }

    pub fn remove(&self, session: &str) {
        self.state
            .lock()
            .unwrap()
            .sessions
            .retain(|(name, _)| name != session);
    }

    fn record(&self, call: String) -> std::sync::MutexGuard<'_, State> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state
    }
}

fn position(state: &State, name: &str) -> Result<usize> {
    state
        .sessions
        .iter()
        .position(|(n, _)| n == name)
        .ok_or_else(|| Error::failed("lookup", format!("can't find session: {name}")))
}

impl Multiplexer for FakeTmux {
    fn is_available(&self) -> bool {
        true
    }

    fn session_exists(&self, name: &str) -> Result<bool> {
        let state = self.record(format!("has-session {name}"));
        Ok(state.sessions.iter().any(|(n, _)| n == name))
    }

    fn create_session(&self, name: &str) -> Result<()> {
        let mut state = self.record(format!("new-session {name}"));
        if state.sessions.iter().any(|(n, _)| n == name) {
            return Err(Error::failed("new-session", format!("duplicate session: {name}")));
        }
        state.sessions.push((name.to_string(), vec!["bash".to_string()]));
        Ok(())
    }

    fn kill_session(&self, name: &str) -> Result<()> {
        let mut state = self.record(format!("kill-session {name}"));
        let idx = position(&state, name)?;
        state.sessions.remove(idx);
        Ok(())
    }

    fn rename_session(&self, old: &str, new: &str) -> Result<()> {
        let mut state = self.record(format!("rename-session {old} {new}"));
        let idx = position(&state, old)?;
        state.sessions[idx].0 = new.to_string();
        Ok(())
    }

    fn rename_window(&self, session: &str, index: u32, name: &str) -> Result<()> {
        let mut state = self.record(format!("rename-window {session}:{index} {name}"));
        let idx = position(&state, session)?;
        let window = state.sessions[idx]
            .1
            .get_mut(index as usize)
            .ok_or_else(|| Error::failed("rename-window", "no such window"))?;
        *window = name.to_string();
        Ok(())
    }

    fn new_window(&self, session: &str, name: &str) -> Result<()> {
        let mut state = self.record(format!("new-window {session} {name}"));
        let idx = position(&state, session)?;
        state.sessions[idx].1.push(name.to_string());
        Ok(())
    }

    fn list_sessions(&self) -> Result<Vec<Session>> {
        let state = self.record("list-sessions".to_string());
        if state.fail_lists {
            return Err(Error::failed("list-sessions", "no server running"));
        }
        Ok(state
            .sessions
            .iter()
            .map(|(name, windows)| Session {
                name: name.clone(),
                windows: windows.len() as u32,
                created: "Mon Jan 1 00:00:00 2024".to_string(),
                attached: false,
            })
            .collect())
    }

    fn list_windows(&self, session: &str) -> Result<Vec<Window>> {
        let state = self.record(format!("list-windows {session}"));
        if state.fail_lists {
            return Err(Error::failed("list-windows", "no server running"));
        }
        let idx = position(&state, session)?;
        Ok(state.sessions[idx]
            .1
            .iter()
            .enumerate()
            .map(|(i, name)| Window {
                index: i as u32,
                name: name.clone(),
                panes: 1,
                size: "80x24".to_string(),
                created: "Mon Jan 1 00:00:00 2024".to_string(),
                active: i == 0,
            })
            .collect())
    }
}

/// Runs queued refreshes synchronously until none are left.
pub fn settle<M: Multiplexer>(app: &mut App<M>, tmux: &M) {
    loop {
        let requests = app.take_requests();
        if requests.is_empty() {
            break;
        }
        for request in requests {
            app.on_message(run_refresh(tmux, request));
        }
    }
}
