//! src/controller/actions.rs
//! ============================================================================
//! # Actions: what a key stroke asks the session to do
//!
//! The key interpreter turns raw strokes into these; the event loop applies
//! them one at a time.

use crate::model::query::Direction;

/// How a selection picks its item from the result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionTrigger {
    /// Uniform random choice (TAB).
    Random,
    /// The highlighted row (ENTER / RETURN).
    Indexed(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The full, already-edited query.
    QueryChanged(String),

    MoveHighlight(Direction),

    Select(SelectionTrigger),

    /// The query became the `edit` keyword.
    EnterEditMode,

    NoOp,
}

impl Action {
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }
}
