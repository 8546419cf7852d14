use crate::error::{Error, Result};
use crate::models::SavedSession;
use crate::tmux::Multiplexer;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Directory of saved session layouts, one `<name>.json` per session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SessionStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    /// Writes the window names of `name` to its file, overwriting any earlier save.
    pub fn save<M: Multiplexer + ?Sized>(&self, tmux: &M, name: &str) -> Result<PathBuf> {
        let windows = tmux.list_windows(name)?;
        let saved = SavedSession::from_windows(name, &windows);

        let save_path = self.path_for(name);
        let content = serde_json::to_string(&saved).map_err(|source| Error::InvalidFormat {
            path: save_path.clone(),
            source,
        })?;

        fs::create_dir_all(&self.dir).map_err(|source| Error::Io {
            path: self.dir.clone(),
            source,
        })?;
        fs::write(&save_path, content).map_err(|source| Error::Io {
            path: save_path.clone(),
            source,
        })?;

        info!(session = name, windows = saved.windows.len(), path = %save_path.display(), "saved session");
        Ok(save_path)
    }
}
