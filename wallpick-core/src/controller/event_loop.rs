//! src/controller/event_loop.rs
//! ============================================================================
//! # EventLoop: the single consumer of the input queue
//!
//! Every event is handled to completion (including any renderer restart)
//! before the next one is received, so the session needs no locking.

use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

use crate::{
    controller::{
        actions::Action,
        dispatcher,
        key_interpreter::KeyInterpreter,
    },
    error::AppError,
    external::Externals,
    input::terminal::InputEvent,
    model::session::Session,
};

/// Why the live loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOutcome {
    EnterEditMode,
    Interrupted,
    /// Every sender is gone.
    InputClosed,
}

pub struct EventLoop {
    session: Session,
    interpreter: KeyInterpreter,
    externals: Externals,
}

impl EventLoop {
    pub fn new(session: Session, externals: Externals) -> Self {
        Self {
            session,
            interpreter: KeyInterpreter::new(),
            externals,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_parts(self) -> (Session, Externals) {
        (self.session, self.externals)
    }

    /// Process events until one of them ends live mode. `render` runs once
    /// up front and after every event.
    pub async fn run<F>(
        &mut self,
        rx: &mut mpsc::Receiver<InputEvent>,
        mut render: F,
    ) -> Result<LoopOutcome, AppError>
    where
        F: FnMut(&Session) -> Result<(), AppError>,
    {
        info!("Live mode started");
        render(&self.session)?;

        loop {
            let Some(event) = rx.recv().await else {
                debug!("Input queue closed");
                return Ok(LoopOutcome::InputClosed);
            };

            if let Some(outcome) = self.handle_event(event) {
                info!("Live mode finished: {:?}", outcome);
                return Ok(outcome);
            }
            render(&self.session)?;
        }
    }

    pub fn handle_event(&mut self, event: InputEvent) -> Option<LoopOutcome> {
        match event {
            InputEvent::Key(raw) => {
                let action = self.interpreter.interpret(
                    raw,
                    self.session.query(),
                    self.session.highlight(),
                );
                self.apply(action)
            }
            InputEvent::Resize(w, h) => {
                debug!("Terminal resized to {}x{}", w, h);
                None
            }
            InputEvent::Interrupt => Some(LoopOutcome::Interrupted),
        }
    }

    #[instrument(level = "trace", skip(self))]
    fn apply(&mut self, action: Action) -> Option<LoopOutcome> {
        if action.is_noop() {
            return None;
        }
        match action {
            Action::QueryChanged(query) => self.session.set_query(query),
            Action::MoveHighlight(direction) => self.session.move_highlight(direction),
            Action::Select(trigger) => {
                match dispatcher::select(trigger, &mut self.session, &self.externals) {
                    Ok(_) => {}
                    Err(AppError::NoResults) => self.session.show_error(
                        "Results are empty, nothing to select from. \
                         To pick from everything, clear the input and press TAB.",
                    ),
                    Err(e) => self.session.show_error(e.to_string()),
                }
            }
            Action::EnterEditMode => return Some(LoopOutcome::EnterEditMode),
            Action::NoOp => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        controller::key_interpreter::{KeyName, RawKey},
        external::testing::Harness,
        input::terminal::input_channel,
        model::{catalog::Catalog, favorites::Favorites, history::History, session::NotificationLevel},
    };
    use tempfile::TempDir;

    fn session(dir: &TempDir) -> Session {
        let catalog = Catalog::from_names(dir.path(), ["ocean-wave", "ocean-calm", "forest"]);
        let (favorites, _) = Favorites::load(dir.path().join("fav.txt"), &catalog).unwrap();
        let history = History::open(dir.path().join("hist.txt"), 25).unwrap();
        Session::new(catalog, favorites, history, Some("forest".into()))
    }

    fn tap(name: KeyName) -> [InputEvent; 2] {
        [
            InputEvent::Key(RawKey::press(name.clone())),
            InputEvent::Key(RawKey::release(name)),
        ]
    }

    #[tokio::test]
    async fn test_type_move_and_select() {
        let dir = TempDir::new().unwrap();
        let harness = Harness::new(Some("forest"));
        let mut event_loop = EventLoop::new(session(&dir), harness.externals(dir.path()));

        let (tx, mut rx) = input_channel();
        let mut seen_results = Vec::new();
        tokio::spawn(async move {
            for name in [KeyName::Char('o'), KeyName::Char('c'), KeyName::Down, KeyName::Enter] {
                for event in tap(name) {
                    tx.send(event).await.unwrap();
                }
            }
        });

        let outcome = event_loop
            .run(&mut rx, |s| {
                seen_results.push(s.results().len());
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(outcome, LoopOutcome::InputClosed);
        // initial render, then one per stroke
        assert_eq!(seen_results.len(), 9);
        assert!(seen_results.contains(&2));

        let s = event_loop.session();
        assert_eq!(s.active_name(), Some("ocean-calm"));
        assert_eq!(s.query(), "");
        assert!(s.results().is_empty());
        assert_eq!(harness.calls(), ["stop", "set:ocean-calm", "start"]);
    }

    #[test]
    fn test_select_on_empty_results_reports() {
        let dir = TempDir::new().unwrap();
        let harness = Harness::new(None);
        let mut event_loop = EventLoop::new(session(&dir), harness.externals(dir.path()));

        for event in tap(KeyName::Char('z')) {
            assert_eq!(event_loop.handle_event(event), None);
        }
        for event in tap(KeyName::Enter) {
            assert_eq!(event_loop.handle_event(event), None);
        }

        let s = event_loop.session();
        assert_eq!(s.query(), "z");
        assert_eq!(s.notification().unwrap().level, NotificationLevel::Error);
        assert!(harness.calls().is_empty());
    }

    #[test]
    fn test_edit_keyword_and_interrupt_end_live_mode() {
        let dir = TempDir::new().unwrap();
        let harness = Harness::new(None);
        let mut event_loop = EventLoop::new(session(&dir), harness.externals(dir.path()));

        let mut outcome = None;
        for c in ['e', 'd', 'i', 't'] {
            for event in tap(KeyName::Char(c)) {
                outcome = event_loop.handle_event(event);
            }
        }
        assert_eq!(outcome, Some(LoopOutcome::EnterEditMode));

        assert_eq!(
            event_loop.handle_event(InputEvent::Interrupt),
            Some(LoopOutcome::Interrupted)
        );
    }

    #[tokio::test]
    async fn test_interrupt_stops_run() {
        let dir = TempDir::new().unwrap();
        let harness = Harness::new(None);
        let mut event_loop = EventLoop::new(session(&dir), harness.externals(dir.path()));

        let (tx, mut rx) = input_channel();
        tx.send(InputEvent::Interrupt).await.unwrap();
        let outcome = event_loop.run(&mut rx, |_| Ok(())).await.unwrap();
        assert_eq!(outcome, LoopOutcome::Interrupted);
    }
}
