//! src/model/session.rs
//! ============================================================================
//! # Session: everything one picker run owns
//!
//! The catalog snapshot, both persisted lists, the live query and the last
//! user-facing message. Passed explicitly to the controller and the view;
//! there is no global state.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::model::{
    catalog::Catalog,
    favorites::Favorites,
    history::History,
    query::{Direction, Mode, QueryState},
};

/// Notification levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub timestamp: Instant,
}

/// How long a notification stays on screen.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

impl Notification {
    pub fn is_stale(&self, ttl: Duration) -> bool {
        self.timestamp.elapsed() >= ttl
    }
}

#[derive(Debug)]
pub struct Session {
    pub catalog: Catalog,
    pub favorites: Favorites,
    pub history: History,
    query: QueryState,
    active_name: Option<String>,
    notification: Option<Notification>,
}

impl Session {
    pub fn new(
        catalog: Catalog,
        favorites: Favorites,
        history: History,
        active_name: Option<String>,
    ) -> Self {
        let mut session = Self {
            catalog,
            favorites,
            history,
            query: QueryState::new(),
            active_name,
            notification: None,
        };
        session.recompute();
        session
    }

    pub fn query(&self) -> &str {
        self.query.query()
    }

    pub fn mode(&self) -> Mode {
        self.query.mode()
    }

    pub fn results(&self) -> &[String] {
        self.query.results()
    }

    pub fn highlight(&self) -> usize {
        self.query.highlight()
    }

    /// Replace the query and recompute the results.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query.set_query(query);
        self.recompute();
    }

    pub fn recompute(&mut self) {
        self.query
            .recompute(&self.catalog, &self.favorites, &self.history);
    }

    pub fn move_highlight(&mut self, direction: Direction) {
        self.query.move_highlight(direction);
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active_name.as_deref()
    }

    pub fn set_active_name(&mut self, name: impl Into<String>) {
        self.active_name = Some(name.into());
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn notify(&mut self, message: impl Into<String>, level: NotificationLevel) {
        let message = message.into();
        debug!(?level, "Notification: {}", message);
        self.notification = Some(Notification {
            message,
            level,
            timestamp: Instant::now(),
        });
    }

    #[inline]
    pub fn show_info(&mut self, message: impl Into<String>) {
        self.notify(message, NotificationLevel::Info);
    }

    #[inline]
    pub fn show_success(&mut self, message: impl Into<String>) {
        self.notify(message, NotificationLevel::Success);
    }

    #[inline]
    pub fn show_warning(&mut self, message: impl Into<String>) {
        self.notify(message, NotificationLevel::Warning);
    }

    #[inline]
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.notify(message, NotificationLevel::Error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_query_recomputes() {
        let dir = TempDir::new().unwrap();
        let catalog = Catalog::from_names(dir.path(), ["ocean-wave", "forest"]);
        let (favorites, _) = Favorites::load(dir.path().join("fav.txt"), &catalog).unwrap();
        let history = History::open(dir.path().join("hist.txt"), 25).unwrap();
        let mut session = Session::new(catalog, favorites, history, Some("forest".into()));

        assert!(session.results().is_empty());
        session.set_query("FOR");
        assert_eq!(session.results(), ["forest"]);
        assert_eq!(session.active_name(), Some("forest"));

        session.show_warning("careful");
        let note = session.notification().unwrap();
        assert_eq!(note.level, NotificationLevel::Warning);
        assert_eq!(note.message, "careful");
        assert!(!note.is_stale(NOTIFICATION_TTL));
    }

    #[test]
    fn test_old_notification_is_stale() {
        let note = Notification {
            message: "done".into(),
            level: NotificationLevel::Success,
            timestamp: Instant::now().checked_sub(Duration::from_secs(10)).unwrap(),
        };
        assert!(note.is_stale(NOTIFICATION_TTL));
        assert!(!note.is_stale(Duration::from_secs(60)));
    }
}
