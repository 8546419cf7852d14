use crate::error::{Error, Result};
use crate::models::{Session, Window};
use crate::parse;
use std::process::{Command, Output};
use tracing::{debug, info};

/// Control surface of the external multiplexer.
///
/// Every call crosses a process boundary and blocks until the command exits.
/// Implementations must be shareable with background refresh threads.
pub trait Multiplexer: Send + Sync + 'static {
    /// Probes whether the multiplexer binary can be run at all.
    fn is_available(&self) -> bool;

    fn session_exists(&self, name: &str) -> Result<bool>;

    /// Creates a detached session. A fresh session always has exactly one window.
    fn create_session(&self, name: &str) -> Result<()>;

    fn kill_session(&self, name: &str) -> Result<()>;

    fn rename_session(&self, old: &str, new: &str) -> Result<()>;

    fn rename_window(&self, session: &str, index: u32, name: &str) -> Result<()>;

    fn new_window(&self, session: &str, name: &str) -> Result<()>;

    fn list_sessions(&self) -> Result<Vec<Session>>;

    fn list_windows(&self, session: &str) -> Result<Vec<Window>>;
}

pub fn is_inside_tmux() -> bool {
    std::env::var("TMUX").is_ok()
}

#[derive(Debug, Clone)]
pub struct Tmux {
    program: String,
}

impl Tmux {
    pub fn new(program: impl Into<String>) -> Self {
        Tmux {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn output(&self, args: &[&str]) -> Result<Output> {
        debug!(program = %self.program, ?args, "running");
        Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|err| Error::failed(args[0], err.to_string()))
    }

    /// Runs a command, treating a non-zero exit as `OperationFailed`.
    fn run(&self, args: &[&str]) -> Result<String> {
        let output = self.output(args)?;
        if !output.status.success() {
            return Err(Error::failed(args[0], failure_reason(&output)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Raw `list-sessions` text, as fed to the fuzzy finder.
    pub fn list_sessions_output(&self) -> Result<String> {
        self.run(&["list-sessions"])
    }

    fn attach_command(&self, name: &str) -> Command {
        let verb = if is_inside_tmux() {
            "switch-client"
        } else {
            "attach-session"
        };
        let mut cmd = Command::new(&self.program);
        cmd.args([verb, "-t", name]);
        cmd
    }

    /// Hands the terminal over to `name`, replacing this process.
    ///
    /// Only returns when the hand-off could not happen; the caller must have
    /// released the terminal beforehand.
    pub fn attach(&self, name: &str) -> Error {
        match self.session_exists(name) {
            Ok(true) => {}
            Ok(false) => {
                return Error::failed("attach-session", format!("can't find session: {name}"));
            }
            Err(err) => return err,
        }

        info!(session = name, "attaching");
        let mut cmd = self.attach_command(name);
        exec(&mut cmd, name)
    }
}

#[cfg(unix)]
fn exec(cmd: &mut Command, name: &str) -> Error {
    use std::os::unix::process::CommandExt;

    let source = cmd.exec();
    Error::Attach {
        session: name.to_string(),
        source,
    }
}

#[cfg(not(unix))]
fn exec(cmd: &mut Command, name: &str) -> Error {
    match cmd.status() {
        Ok(status) => std::process::exit(status.code().unwrap_or(0)),
        Err(source) => Error::Attach {
            session: name.to_string(),
            source,
        },
    }
}

fn failure_reason(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let reason = [stderr.trim(), stdout.trim()]
        .into_iter()
        .find(|text| !text.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| output.status.to_string());
    reason
}

impl Multiplexer for Tmux {
    fn is_available(&self) -> bool {
        self.output(&["-V"])
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    fn session_exists(&self, name: &str) -> Result<bool> {
        let output = self.output(&["has-session", "-t", name])?;
        Ok(output.status.success())
    }

    fn create_session(&self, name: &str) -> Result<()> {
        self.run(&["new-session", "-d", "-s", name])?;
        info!(session = name, "created session");
        Ok(())
    }

    fn kill_session(&self, name: &str) -> Result<()> {
        self.run(&["kill-session", "-t", name])?;
        info!(session = name, "killed session");
        Ok(())
    }

    fn rename_session(&self, old: &str, new: &str) -> Result<()> {
        self.run(&["rename-session", "-t", old, new])?;
        info!(from = old, to = new, "renamed session");
        Ok(())
    }

    fn rename_window(&self, session: &str, index: u32, name: &str) -> Result<()> {
        self.run(&["rename-window", "-t", &format!("{}:{}", session, index), name])?;
        Ok(())
    }

    fn new_window(&self, session: &str, name: &str) -> Result<()> {
        self.run(&["new-window", "-t", session, "-n", name])?;
        Ok(())
    }

    fn list_sessions(&self) -> Result<Vec<Session>> {
        let output = self.list_sessions_output()?;
        Ok(parse::parse_sessions(&output))
    }

    fn list_windows(&self, session: &str) -> Result<Vec<Window>> {
        let output = self.run(&["list-windows", "-t", session])?;
        Ok(parse::parse_windows(&output))
    }
}
