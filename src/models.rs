use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub name: String,
    pub windows: u32,
    pub created: String,
    pub attached: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub index: u32,
    pub name: String,
    pub panes: u32,
    pub size: String,
    pub created: String,
    pub active: bool,
}

/// On-disk form of a session: its name and window names in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSession {
    pub name: String,
    pub windows: Vec<String>,
}

impl SavedSession {
    pub fn from_windows(name: &str, windows: &[Window]) -> Self {
        SavedSession {
            name: name.to_string(),
            windows: windows.iter().map(|w| w.name.clone()).collect(),
        }
    }
}
