use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

mod app;
mod error;
mod fuzzy;
mod input;
mod models;
mod parse;
mod restore;
mod save;
#[cfg(test)]
mod testing;
mod tmux;
mod ui;

use app::{App, Effect, Message, Refresh};
use save::SessionStore;
use tmux::{Multiplexer, Tmux};

const TICK: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Pick a session with fzf and attach to it, skipping the interactive view
    #[arg(short = 'f', long = "fuzzy")]
    fuzzy: bool,

    /// Directory holding saved session layouts
    #[arg(short = 'd', long = "dir", env = "SESN_DIR", default_value = ".")]
    save_dir: PathBuf,

    /// Write logs to this file (RUST_LOG sets the level)
    #[arg(long = "log-file", env = "SESN_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// tmux program to run
    #[arg(long = "tmux", env = "SESN_TMUX", default_value = "tmux")]
    tmux: String,
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .try_init();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;

    let tmux = Tmux::new(cli.tmux);
    if !tmux.is_available() {
        error!(program = tmux.program(), "multiplexer unavailable");
        return Err(error::Error::Unavailable.into());
    }

    if cli.fuzzy {
        return match fuzzy::select_and_attach(&tmux) {
            error::Error::FuzzyCancelled => Ok(()),
            err => Err(err.into()),
        };
    }

    let store = SessionStore::new(cli.save_dir);
    info!(dir = %store.dir().display(), "starting");
    run_tui(Arc::new(tmux), store)
}

fn run_tui(tmux: Arc<Tmux>, store: SessionStore) -> Result<()> {
    let mut terminal = ratatui::try_init().context("Failed to initialize terminal")?;
    let mut app = App::new(tmux.clone(), store);
    let result = run(&mut terminal, &mut app, &tmux);
    ratatui::try_restore().context("Failed to restore terminal")?;
    result
}

fn spawn_refresh(tmux: Arc<Tmux>, request: Refresh, tx: Sender<Message>) {
    std::thread::spawn(move || {
        debug!(?request, "refreshing");
        if tx.send(app::run_refresh(tmux.as_ref(), request)).is_err() {
            debug!("refresh result dropped, controller has exited");
        }
    });
}

fn run(terminal: &mut DefaultTerminal, app: &mut App<Tmux>, tmux: &Arc<Tmux>) -> Result<()> {
    let (tx, rx): (Sender<Message>, Receiver<Message>) = mpsc::channel();

    loop {
        for request in app.take_requests() {
            spawn_refresh(tmux.clone(), request, tx.clone());
        }

        terminal.draw(|frame| ui::render(frame, app))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match app.handle_key(key) {
                        Effect::None => {}
                        Effect::Quit => return Ok(()),
                        Effect::Attach(name) => {
                            let err = handoff(terminal, || tmux.attach(&name))?;
                            app.handoff_failed(err);
                        }
                        Effect::FuzzyFind => {
                            let err = handoff(terminal, || fuzzy::select_and_attach(tmux))?;
                            app.handoff_failed(err);
                        }
                    }
                }
            }
        }

        while let Ok(message) = rx.try_recv() {
            app.on_message(message);
        }
    }
}

/// Gives the terminal to `f`. If `f` comes back the hand-off failed, and the
/// terminal is taken back before returning its error.
fn handoff(
    terminal: &mut DefaultTerminal,
    f: impl FnOnce() -> error::Error,
) -> Result<error::Error> {
    ratatui::try_restore().context("Failed to release terminal")?;
    let err = f();
    *terminal = ratatui::try_init().context("Failed to reinitialize terminal")?;
    terminal.clear()?;
    Ok(err)
}
