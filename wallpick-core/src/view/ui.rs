//! src/view/ui.rs
//! ============================================================================
//! # Live-mode frame renderer
//!
//! Draws the whole picker from a `&Session`. Nothing here mutates state, so
//! the event loop can call it after every event.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};
use tracing::instrument;

use crate::{
    model::{
        query::{EDIT_KEYWORD, FAVORITES_KEYWORD, Mode, RECENT_KEYWORD},
        session::{NOTIFICATION_TTL, Session},
    },
    view::theme,
};

pub const NO_MATCH_MESSAGE: &str = "No wallpaper folder found that matches that input.";
pub const PROMPT: &str = "> ";

#[instrument(level = "trace", skip_all)]
pub fn render(frame: &mut Frame<'_>, session: &Session) {
    let area = frame.area();
    frame.render_widget(Block::default().style(theme::base_style()), area);

    let [header, help, results, prompt, status] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(10),
        Constraint::Min(3),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    draw_active(frame, session, header);
    draw_instructions(frame, help);
    draw_results(frame, session, results);
    draw_prompt(frame, session, prompt);
    draw_notification(frame, session, status);
}

fn bordered(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(theme::border_style())
}

fn draw_active(frame: &mut Frame<'_>, session: &Session, area: Rect) {
    let line = match session.active_name() {
        Some(name) => Line::from(Span::styled(name.to_string(), theme::active_name_style())),
        None => Line::from(Span::styled("(unknown)", theme::hint_style())),
    };
    frame.render_widget(Paragraph::new(line).block(bordered(" Active Wallpaper ")), area);
}

fn instruction_rows() -> Vec<Row<'static>> {
    let key = |k: &'static str, what: &'static str| {
        Row::new(vec![
            Line::from(Span::styled(k, theme::key_style())),
            Line::from(what),
        ])
    };
    let word = |k: &'static str, what: &'static str, style: Style| {
        Row::new(vec![Line::from(Span::styled(k, style)), Line::from(what)])
    };

    vec![
        key("ENTER", "select the highlighted wallpaper"),
        key("TAB", "select a random wallpaper from the results"),
        key("UP / DOWN", "move the highlight"),
        key("BACKSPACE", "delete the last character"),
        word(RECENT_KEYWORD, "list recently used wallpapers", theme::keyword_style()),
        word(FAVORITES_KEYWORD, "list favorite wallpapers", theme::keyword_style()),
        word(EDIT_KEYWORD, "edit the active wallpaper", theme::edit_keyword_style()),
        Row::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "Pressing TAB on an empty input selects from all wallpapers",
                theme::hint_style(),
            )),
        ]),
    ]
}

fn draw_instructions(frame: &mut Frame<'_>, area: Rect) {
    let table = Table::new(
        instruction_rows(),
        [Constraint::Length(12), Constraint::Min(10)],
    )
    .block(bordered(" Keys "));
    frame.render_widget(table, area);
}

fn mode_title(mode: Mode) -> &'static str {
    match mode {
        Mode::All => " Results ",
        Mode::Recent => " Recent wallpapers: ",
        Mode::Favorites => " Favorite wallpapers: ",
    }
}

fn draw_results(frame: &mut Frame<'_>, session: &Session, area: Rect) {
    let block = bordered(mode_title(session.mode()));
    let results = session.results();

    if results.is_empty() {
        let text = if session.mode() == Mode::All && !session.query().is_empty() {
            Line::from(Span::styled(NO_MATCH_MESSAGE, theme::hint_style()))
        } else {
            Line::from("")
        };
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    let items: Vec<ListItem<'_>> = results
        .iter()
        .map(|name| ListItem::new(name.as_str()))
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(theme::highlight_style());

    let mut state = ListState::default().with_selected(Some(session.highlight()));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_prompt(frame: &mut Frame<'_>, session: &Session, area: Rect) {
    let line = Line::from(vec![
        Span::styled(PROMPT, theme::border_style()),
        Span::raw(session.query().to_string()),
    ]);
    frame.render_widget(Paragraph::new(line).block(bordered(" Search ")), area);

    // cursor after the query, inside the border
    let x = area.x + 1 + (PROMPT.len() + session.query().chars().count()) as u16;
    if x < area.right().saturating_sub(1) {
        frame.set_cursor_position(Position::new(x, area.y + 1));
    }
}

fn draw_notification(frame: &mut Frame<'_>, session: &Session, area: Rect) {
    let Some(note) = session.notification().filter(|n| !n.is_stale(NOTIFICATION_TTL)) else {
        return;
    };
    let text = Paragraph::new(Span::styled(
        note.message.clone(),
        theme::notification_style(note.level),
    ))
    .wrap(Wrap { trim: true });
    frame.render_widget(text, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{catalog::Catalog, favorites::Favorites, history::History};
    use ratatui::{Terminal, backend::TestBackend};
    use tempfile::TempDir;

    fn session(dir: &TempDir) -> Session {
        let catalog = Catalog::from_names(dir.path(), ["ocean-wave", "ocean-calm", "forest"]);
        let (favorites, _) = Favorites::load(dir.path().join("fav.txt"), &catalog).unwrap();
        let history = History::open(dir.path().join("hist.txt"), 25).unwrap();
        Session::new(catalog, favorites, history, Some("forest".into()))
    }

    fn screen(session: &Session) -> String {
        let mut terminal = Terminal::new(TestBackend::new(90, 30)).unwrap();
        terminal.draw(|f| render(f, session)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_screen_shows_active_results_and_query() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        s.set_query("ocean");

        let text = screen(&s);
        assert!(text.contains("forest"));
        assert!(text.contains("ocean-wave"));
        assert!(text.contains("ocean-calm"));
        assert!(text.contains("> ocean"));
    }

    #[test]
    fn test_no_match_message_and_notification() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);
        s.set_query("zzz");
        s.show_error("Results are empty");

        let text = screen(&s);
        assert!(text.contains(NO_MATCH_MESSAGE));
        assert!(text.contains("Results are empty"));
    }

    #[test]
    fn test_mode_headers() {
        let dir = TempDir::new().unwrap();
        let mut s = session(&dir);

        s.set_query("Recent");
        assert!(screen(&s).contains("Recent wallpapers:"));

        s.set_query("favorites");
        assert!(screen(&s).contains("Favorite wallpapers:"));
        // empty favorites, but a keyword is not a failed search
        assert!(!screen(&s).contains(NO_MATCH_MESSAGE));
    }
}
