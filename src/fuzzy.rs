use crate::error::{Error, Result};
use crate::tmux::Tmux;
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::debug;

const FINDER: &str = "fzf";

/// Lets the user pick a session with fzf and returns its name.
///
/// fzf draws on the controlling tty, so the caller must not hold the terminal.
pub fn select_session(tmux: &Tmux) -> Result<String> {
    let listing = tmux.list_sessions_output()?;

    let mut child = Command::new(FINDER)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|err| Error::failed(FINDER, err.to_string()))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(listing.as_bytes())
            .map_err(|err| Error::failed(FINDER, err.to_string()))?;
    }

    let output = child
        .wait_with_output()
        .map_err(|err| Error::failed(FINDER, err.to_string()))?;
    debug!(status = %output.status, "fuzzy finder exited");

    if !output.status.success() {
        return Err(Error::FuzzyCancelled);
    }

    session_name(&String::from_utf8_lossy(&output.stdout)).ok_or(Error::FuzzyCancelled)
}

/// Extracts the session name from a picked `list-sessions` line.
fn session_name(line: &str) -> Option<String> {
    let name = match line.split_once(':') {
        Some((name, _)) => name,
        None => line,
    }
    .trim();

    (!name.is_empty()).then(|| name.to_string())
}

/// Fuzzy-select a session and attach to it. Returns only on failure.
pub fn select_and_attach(tmux: &Tmux) -> Error {
    match select_session(tmux) {
        Ok(name) => tmux.attach(&name),
        Err(err) => err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_name_before_colon() {
        assert_eq!(
            session_name("work: 2 windows (created Mon Jan 1 00:00:00 2024) [80x24]\n"),
            Some("work".to_string())
        );
    }

    #[test]
    fn empty_pick_is_none() {
        assert_eq!(session_name("\n"), None);
        assert_eq!(session_name(": nothing"), None);
    }
}
