use crate::models::{Session, Window};

const ATTACHED_SUFFIX: &str = " (attached)";

impl Session {
    fn from_line(line: &str) -> Option<Self> {
        // Format: name: 2 windows (created Mon Jan  1 00:00:00 2024) [80x24] (attached)
        let (name, details) = line.split_once(": ")?;

        let details = details.trim_end();
        let (details, attached) = match details.strip_suffix(ATTACHED_SUFFIX) {
            Some(rest) => (rest, true),
            None => (details, false),
        };

        let parts: Vec<&str> = details.split_whitespace().collect();
        if parts.len() < 4 {
            return None;
        }

        // Drop the trailing geometry bracket, then unwrap "(created ...)".
        let created = parts[2..parts.len() - 1].join(" ");
        let created = created.strip_prefix("(created").unwrap_or(&created).trim();
        let created = created.strip_suffix(')').unwrap_or(created);

        Some(Session {
            name: name.to_string(),
            windows: parts[0].parse().unwrap_or(0),
            created: created.to_string(),
            attached,
        })
    }
}

impl Window {
    fn from_line(line: &str) -> Option<Self> {
        // Format: 0: bash* (1 panes) [80x24] created Mon Jan  1 00:00:00 2024
        let (index, details) = line.split_once(": ")?;

        let active = details.contains('*');
        let details = details.replacen('*', "", 1);

        let parts: Vec<&str> = details.split_whitespace().collect();
        if parts.len() < 5 {
            return None;
        }

        Some(Window {
            index: index.trim().parse().unwrap_or(0),
            name: parts[0].to_string(),
            panes: parts[1].trim_start_matches('(').parse().unwrap_or(0),
            size: parts[3]
                .trim_start_matches('[')
                .trim_end_matches(']')
                .to_string(),
            created: parts[5..].join(" "),
            active,
        })
    }
}

/// Parses `list-sessions` output. Lines that don't fit the template are dropped.
pub fn parse_sessions(output: &str) -> Vec<Session> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(Session::from_line)
        .collect()
}

/// Parses `list-windows` output. Lines that don't fit the template are dropped.
pub fn parse_windows(output: &str) -> Vec<Window> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(Window::from_line)
        .collect()
}
