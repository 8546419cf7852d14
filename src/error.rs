use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("tmux is not installed or not on PATH")]
    Unavailable,

    #[error("{action} failed: {reason}")]
    OperationFailed { action: String, reason: String },

    #[error("no saved session at {}", .0.display())]
    NotFound(PathBuf),

    #[error("invalid saved session {}: {source}", path.display())]
    InvalidFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to attach to session {session}: {source}")]
    Attach {
        session: String,
        #[source]
        source: io::Error,
    },

    #[error("no session selected")]
    FuzzyCancelled,
}

impl Error {
    pub fn failed(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::OperationFailed {
            action: action.into(),
            reason: reason.into(),
        }
    }
}
