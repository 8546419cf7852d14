use crate::error::{Error, Result};
use crate::models::SavedSession;
use crate::save::SessionStore;
use crate::tmux::Multiplexer;
use std::fs;
use std::io;
use tracing::info;

impl SessionStore {
    pub fn read(&self, name: &str) -> Result<SavedSession> {
        let save_path = self.path_for(name);
        let content = fs::read_to_string(&save_path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                Error::NotFound(save_path.clone())
            } else {
                Error::Io {
                    path: save_path.clone(),
                    source,
                }
            }
        })?;

        serde_json::from_str(&content).map_err(|source| Error::InvalidFormat {
            path: save_path,
            source,
        })
    }

    /// Recreates a saved session: one session, then its windows in saved order.
    ///
    /// The fresh session's default window takes the first saved name. A save
    /// with no windows leaves that default window untouched.
    pub fn load<M: Multiplexer + ?Sized>(&self, tmux: &M, name: &str) -> Result<SavedSession> {
        let saved = self.read(name)?;

        tmux.create_session(&saved.name)?;

        for (i, window) in saved.windows.iter().enumerate() {
            if i == 0 {
                tmux.rename_window(&saved.name, 0, window)?;
            } else {
                tmux.new_window(&saved.name, window)?;
            }
        }

        info!(session = %saved.name, windows = saved.windows.len(), "restored session");
        Ok(saved)
    }
}
