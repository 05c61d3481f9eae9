//! Query/result engine: the live query, the universe it filters, the
//! filtered result list and the highlighted row.

use tracing::{trace, warn};

use crate::model::{catalog::Catalog, favorites::Favorites, history::History};

pub const RECENT_KEYWORD: &str = "recent";
pub const FAVORITES_KEYWORD: &str = "favorites";
pub const EDIT_KEYWORD: &str = "edit";

/// Which universe the query filters. Derived from the query on every
/// recompute, never sticky.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    All,
    Recent,
    Favorites,
}

impl Mode {
    pub fn derive(query: &str) -> Self {
        if query.eq_ignore_ascii_case(RECENT_KEYWORD) {
            Self::Recent
        } else if query.eq_ignore_ascii_case(FAVORITES_KEYWORD) {
            Self::Favorites
        } else {
            Self::All
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Default)]
pub struct QueryState {
    query: String,
    mode: Mode,
    results: Vec<String>,
    highlight: usize,
}

impl QueryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn results(&self) -> &[String] {
        &self.results
    }

    pub fn highlight(&self) -> usize {
        self.highlight
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.results.get(self.highlight).map(String::as_str)
    }

    /// Replace the whole query. Callers recompute afterwards.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn is_edit_keyword(&self) -> bool {
        self.query.eq_ignore_ascii_case(EDIT_KEYWORD)
    }

    /// Rebuild the result list for the current query and clamp the
    /// highlight back to the first row when it fell out of range.
    pub fn recompute(&mut self, catalog: &Catalog, favorites: &Favorites, history: &History) {
        self.mode = Mode::derive(&self.query);
        self.results = match self.mode {
            Mode::Recent => history.display_window().unwrap_or_else(|e| {
                warn!("Could not read history: {}", e);
                Vec::new()
            }),
            Mode::Favorites => favorites.entries().to_vec(),
            Mode::All => filter_catalog(catalog.names(), &self.query),
        };

        if self.highlight >= self.results.len() {
            self.highlight = 0;
        }

        trace!(
            query = %self.query,
            mode = ?self.mode,
            results = self.results.len(),
            "Results recomputed"
        );
    }

    pub fn move_highlight(&mut self, direction: Direction) {
        if self.results.is_empty() {
            return;
        }
        match direction {
            Direction::Up => self.highlight = self.highlight.saturating_sub(1),
            Direction::Down => {
                if self.highlight + 1 < self.results.len() {
                    self.highlight += 1;
                }
            }
        }
    }
}

/// Case-insensitive substring filter in catalog order. An empty query
/// matches nothing.
pub fn filter_catalog(names: &[String], query: &str) -> Vec<String> {
    if query.is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    names
        .iter()
        .filter(|name| name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        catalog: Catalog,
        favorites: Favorites,
        history: History,
    }

    fn fixture(history_lines: &str, favorite_lines: &str) -> Fixture {
        let dir = TempDir::new().unwrap();
        let catalog = Catalog::from_names(
            dir.path(),
            ["ocean-wave", "Ocean-Calm", "forest", "deep-OCEAN"],
        );
        let history_path = dir.path().join("history.txt");
        let favorites_path = dir.path().join("favorites.txt");
        fs::write(&history_path, history_lines).unwrap();
        fs::write(&favorites_path, favorite_lines).unwrap();
        let history = History::open(history_path, 25).unwrap();
        let (favorites, _) = Favorites::load(favorites_path, &catalog).unwrap();
        Fixture {
            _dir: dir,
            catalog,
            favorites,
            history,
        }
    }

    fn run(state: &mut QueryState, f: &Fixture, query: &str) {
        state.set_query(query);
        state.recompute(&f.catalog, &f.favorites, &f.history);
    }

    #[test]
    fn test_mode_derivation_is_exact_and_case_insensitive() {
        assert_eq!(Mode::derive("recent"), Mode::Recent);
        assert_eq!(Mode::derive("RECENT"), Mode::Recent);
        assert_eq!(Mode::derive("Favorites"), Mode::Favorites);
        assert_eq!(Mode::derive("recents"), Mode::All);
        assert_eq!(Mode::derive("favorite"), Mode::All);
        assert_eq!(Mode::derive(""), Mode::All);
    }

    #[test]
    fn test_all_mode_filters_in_catalog_order() {
        let f = fixture("", "");
        let mut state = QueryState::new();

        run(&mut state, &f, "ocean");
        assert_eq!(state.results(), ["ocean-wave", "Ocean-Calm", "deep-OCEAN"]);

        run(&mut state, &f, "OCEAN-c");
        assert_eq!(state.results(), ["Ocean-Calm"]);

        run(&mut state, &f, "");
        assert!(state.results().is_empty());
        assert_eq!(state.highlight(), 0);
    }

    #[test]
    fn test_keyword_modes() {
        let f = fixture("forest\n\nocean-wave\n", "Ocean-Calm\nforest\n");
        let mut state = QueryState::new();

        run(&mut state, &f, "Recent");
        assert_eq!(state.mode(), Mode::Recent);
        assert_eq!(state.results(), ["ocean-wave", "forest"]);

        run(&mut state, &f, "favorites");
        assert_eq!(state.mode(), Mode::Favorites);
        assert_eq!(state.results(), ["Ocean-Calm", "forest"]);

        // one more keystroke drops back to plain filtering
        run(&mut state, &f, "favoritesx");
        assert_eq!(state.mode(), Mode::All);
        assert!(state.results().is_empty());
    }

    #[test]
    fn test_highlight_clamps_and_resets() {
        let f = fixture("", "");
        let mut state = QueryState::new();
        run(&mut state, &f, "o");
        assert_eq!(state.results().len(), 4);

        state.move_highlight(Direction::Up);
        assert_eq!(state.highlight(), 0);
        for _ in 0..10 {
            state.move_highlight(Direction::Down);
        }
        assert_eq!(state.highlight(), 3);

        // narrowing past the highlighted row resets it
        run(&mut state, &f, "oc");
        assert_eq!(state.results().len(), 3);
        assert_eq!(state.highlight(), 0);

        run(&mut state, &f, "zzz");
        assert!(state.results().is_empty());
        state.move_highlight(Direction::Down);
        assert_eq!(state.highlight(), 0);
        assert_eq!(state.highlighted(), None);
    }

    #[test]
    fn test_highlight_survives_when_still_in_range() {
        let f = fixture("", "");
        let mut state = QueryState::new();
        run(&mut state, &f, "o");
        state.move_highlight(Direction::Down);
        run(&mut state, &f, "oc");
        assert_eq!(state.highlight(), 1);
        assert_eq!(state.highlighted(), Some("Ocean-Calm"));
    }

    #[test]
    fn test_edit_keyword() {
        let mut state = QueryState::new();
        state.set_query("EdIt");
        assert!(state.is_edit_keyword());
        state.set_query("edits");
        assert!(!state.is_edit_keyword());
    }
}
