use crate::app::{App, Mode, Status};
use crate::models::{Session, Window};
use crate::tmux::Multiplexer;
use ratatui::{
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Narrowest a column may get before the terminal itself clips it.
const MIN_COLUMN: u16 = 10;

const HELP: [&str; 2] = [
    "c: create  d: delete  r: rename",
    "k: kill  s: save  l: load  enter: attach  /: fuzzy find",
];

fn session_item(session: &Session) -> ListItem<'_> {
    let mut spans = vec![Span::raw(session.name.as_str())];
    if session.attached {
        spans.push(Span::styled(
            " (attached)",
            Style::default().add_modifier(Modifier::DIM),
        ));
    }
    ListItem::new(Line::from(spans))
}

fn window_item(window: &Window) -> ListItem<'static> {
    let text = format!("{}: {}", window.index, window.name);
    let style = if window.active {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    ListItem::new(Line::styled(text, style))
}

fn session_details(session: &Session) -> Line<'static> {
    Line::from(format!(
        "{} windows, created {}",
        session.windows, session.created
    ))
    .dim()
}

fn window_details(window: &Window) -> Line<'static> {
    Line::from(format!(
        "{} panes, {}, created {}",
        window.panes, window.size, window.created
    ))
    .dim()
}

/// Splits the body into session and window columns with a one-cell gap.
fn columns(area: Rect) -> (Rect, Rect) {
    let left_w = (area.width / 2).max(MIN_COLUMN);
    let right_w = area.width.saturating_sub(left_w + 1).max(MIN_COLUMN);

    let left = Rect {
        width: left_w,
        ..area
    }
    .intersection(area);
    let right = Rect {
        x: area.x.saturating_add(left_w + 1),
        width: right_w,
        ..area
    }
    .intersection(area);
    (left, right)
}

fn prompt_label(mode: Mode) -> Option<&'static str> {
    match mode {
        Mode::CreateInput => Some("Create: "),
        Mode::RenameInput => Some("Rename: "),
        Mode::LoadInput => Some("Load: "),
        _ => None,
    }
}

fn header_lines<M: Multiplexer>(app: &App<M>) -> Vec<Line<'static>> {
    match app.mode() {
        Mode::Normal => HELP.iter().map(|line| Line::raw(*line)).collect(),
        Mode::ConfirmDelete => vec![Line::raw(format!(
            "Delete session '{}'? (y/N)",
            app.selected().unwrap_or_default()
        ))],
        Mode::FuzzyFind => vec![Line::raw("Fuzzy find...")],
        mode => {
            let label = prompt_label(mode).unwrap_or_default();
            vec![Line::from(vec![
                Span::styled(label, Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(app.input().value()),
            ])]
        }
    }
}

fn status_line(status: &Status) -> Line<'_> {
    let color = match status {
        Status::Info(_) => Color::Green,
        Status::Error(_) => Color::Red,
    };
    Line::styled(status.text(), Style::default().fg(color))
}

pub fn render<M: Multiplexer>(frame: &mut Frame, app: &App<M>) {
    let header = header_lines(app);
    let status_height = u16::from(app.status().is_some());

    let [body, header_area, status_area, badge_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(header.len() as u16),
        Constraint::Length(status_height),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let (left, right) = columns(body);

    let mut block = Block::new().title("sessions".bold());
    if let Some(session) = app.sessions().get(app.cursor()) {
        block = block.title_bottom(session_details(session));
    }
    let sessions = List::new(app.sessions().iter().map(session_item))
        .block(block)
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !app.sessions().is_empty() {
        state.select(Some(app.cursor()));
    }
    frame.render_stateful_widget(sessions, left, &mut state);

    let mut block = Block::new().title("windows".bold());
    if let Some(window) = app.windows().iter().find(|w| w.active) {
        block = block.title_bottom(window_details(window));
    }
    let windows = List::new(app.windows().iter().map(window_item)).block(block);
    frame.render_widget(windows, right);

    frame.render_widget(Paragraph::new(header), header_area);
    if let Some(label) = prompt_label(app.mode()) {
        let x = header_area.x + (label.chars().count() + app.input().cursor()) as u16;
        frame.set_cursor_position(Position::new(x, header_area.y));
    }

    if let Some(status) = app.status() {
        frame.render_widget(Paragraph::new(status_line(status)), status_area);
    }

    let badge = Span::styled(
        " sesn ",
        Style::default()
            .bg(Color::LightYellow)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_widget(Paragraph::new(Line::from(badge)), badge_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::SessionStore;
    use crate::testing::{self, FakeTmux};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn app_with(sessions: &[(&str, &[&str])]) -> (tempfile::TempDir, App<FakeTmux>) {
        let dir = tempfile::tempdir().unwrap();
        let tmux = Arc::new(FakeTmux::with_sessions(sessions));
        let mut app = App::new(tmux.clone(), SessionStore::new(dir.path()));
        testing::settle(&mut app, tmux.as_ref());
        (dir, app)
    }

    fn draw(app: &App<FakeTmux>, width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| (0..width).map(|x| buffer[(x, y)].symbol()).collect())
            .collect()
    }

    fn press(app: &mut App<FakeTmux>, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn column_floor_applies_on_narrow_terminals() {
        let (left, right) = columns(Rect::new(0, 0, 30, 5));
        assert_eq!(left.width, 15);
        assert_eq!(right.x, 16);
        assert_eq!(right.width, 14);

        let (left, right) = columns(Rect::new(0, 0, 16, 5));
        assert_eq!(left.width, MIN_COLUMN);
        assert_eq!(right.x, 11);
        assert_eq!(right.width, 5);
    }

    #[test]
    fn renders_both_columns_and_help() {
        let (_dir, app) = app_with(&[("alpha", &["edit", "logs"]), ("beta", &["b1"])]);
        let rows = draw(&app, 40, 10);

        assert!(rows[0].starts_with("sessions"));
        assert_eq!(&rows[0][21..28], "windows");
        assert!(rows[1].starts_with("> alpha"));
        assert!(rows[2].starts_with("  beta"));
        assert_eq!(&rows[1][21..28], "0: edit");
        assert_eq!(&rows[2][21..28], "1: logs");
        assert!(rows[6].starts_with("2 windows, created"));
        assert!(rows[6][21..].starts_with("1 panes, 80x24"));
        assert!(rows[7].starts_with("c: create"));
        assert!(rows[9].starts_with(" sesn "));
    }

    #[test]
    fn long_names_are_cut_at_column_edge() {
        let long = "abcdefghijklmnopqrstuvwxyz";
        let (_dir, app) = app_with(&[(long, &["w"])]);
        let rows = draw(&app, 40, 8);

        assert_eq!(&rows[1][..20], "> abcdefghijklmnopqr");
        assert_eq!(&rows[1][20..21], " ");
        assert_eq!(&rows[1][21..25], "0: w");
    }

    #[test]
    fn prompt_and_status_lines() {
        let (_dir, mut app) = app_with(&[("alpha", &["a1"])]);
        press(&mut app, KeyCode::Char('c'));
        for c in "alpha".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        let rows = draw(&app, 40, 8);
        assert!(rows[6].starts_with("Create: alpha"));

        press(&mut app, KeyCode::Enter);
        let rows = draw(&app, 60, 8);
        assert!(rows[4].starts_with("c: create"));
        assert!(rows[6].starts_with("new-session failed: duplicate session: alpha"));
        assert!(rows[7].starts_with(" sesn "));
    }

    #[test]
    fn confirm_delete_names_the_session() {
        let (_dir, mut app) = app_with(&[("alpha", &["a1"])]);
        press(&mut app, KeyCode::Char('d'));
        let rows = draw(&app, 40, 6);
        assert!(rows[4].starts_with("Delete session 'alpha'? (y/N)"));
    }
}
