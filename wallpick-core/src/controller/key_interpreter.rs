//! src/controller/key_interpreter.rs
//! ============================================================================
//! # KeyInterpreter: physical key strokes to query edits
//!
//! Strokes identify the physical key, not the character it produces, so the
//! interpreter tracks the shift key across press/release pairs and rebuilds
//! shifted characters from a fixed table. Only releases act; presses only
//! move the shift flag.

use tracing::trace;

use crate::{
    controller::actions::{Action, SelectionTrigger},
    model::query::{Direction, EDIT_KEYWORD},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPhase {
    Press,
    Release,
}

/// Physical key identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyName {
    Shift,
    Backspace,
    Delete,
    Enter,
    Return,
    Tab,
    Up,
    Down,
    /// A key that types a single character (unshifted glyph).
    Char(char),
    /// Modifiers, navigation other than up/down, function keys and any
    /// other key that does not type a character.
    Ignored(String),
}

impl KeyName {
    /// Parse a key-hook style name (`"shift"`, `"page up"`, `"f5"`, `"a"`).
    pub fn parse(name: &str) -> Self {
        let lower = name.to_lowercase();
        match lower.as_str() {
            "shift" | "left shift" | "right shift" => Self::Shift,
            "backspace" => Self::Backspace,
            "delete" => Self::Delete,
            "enter" => Self::Enter,
            "return" => Self::Return,
            "tab" => Self::Tab,
            "up" => Self::Up,
            "down" => Self::Down,
            "space" => Self::Char(' '),
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => Self::Ignored(lower),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawKey {
    pub name: KeyName,
    pub phase: KeyPhase,
}

impl RawKey {
    pub fn press(name: KeyName) -> Self {
        Self {
            name,
            phase: KeyPhase::Press,
        }
    }

    pub fn release(name: KeyName) -> Self {
        Self {
            name,
            phase: KeyPhase::Release,
        }
    }
}

/// Unshifted glyph and the glyph produced with shift held.
const SHIFT_TABLE: &[(char, char)] = &[
    ('1', '!'),
    ('2', '@'),
    ('3', '#'),
    ('4', '$'),
    ('5', '%'),
    ('6', '^'),
    ('7', '&'),
    ('8', '*'),
    ('9', '('),
    ('0', ')'),
    ('-', '_'),
    ('\u{2212}', '_'),
    ('=', '+'),
    ('[', '{'),
    (']', '}'),
    ('\\', '|'),
    (';', ':'),
    ('\'', '"'),
    (',', '<'),
    ('.', '>'),
    ('/', '?'),
    ('`', '~'),
];

/// The character a key types while shift is held. Letters go uppercase;
/// keys with no shifted form pass through.
pub fn shift_variant(c: char) -> char {
    if let Some(&(_, shifted)) = SHIFT_TABLE.iter().find(|(base, _)| *base == c) {
        return shifted;
    }
    if c.is_lowercase() {
        let mut upper = c.to_uppercase();
        if let (Some(u), None) = (upper.next(), upper.next()) {
            return u;
        }
    }
    c
}

/// Reverse of [`shift_variant`] for ASCII glyphs: which base key produces
/// `c` with shift held, if any.
pub fn unshifted_base(c: char) -> Option<char> {
    if c.is_ascii_uppercase() {
        return Some(c.to_ascii_lowercase());
    }
    SHIFT_TABLE
        .iter()
        .find(|(base, shifted)| *shifted == c && base.is_ascii())
        .map(|(base, _)| *base)
}

#[derive(Debug, Default)]
pub struct KeyInterpreter {
    shift_pressed: bool,
}

impl KeyInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shift_pressed(&self) -> bool {
        self.shift_pressed
    }

    /// Turn one stroke into an action against the current query and
    /// highlighted row.
    pub fn interpret(&mut self, key: RawKey, query: &str, highlight: usize) -> Action {
        trace!(
            "KeyInterpreter: {:?} {:?} (shift: {})",
            key.phase, key.name, self.shift_pressed
        );

        if let KeyName::Ignored(_) = key.name {
            return Action::NoOp;
        }

        if key.phase == KeyPhase::Press {
            if key.name == KeyName::Shift {
                self.shift_pressed = true;
            }
            return Action::NoOp;
        }

        match key.name {
            KeyName::Shift => {
                self.shift_pressed = false;
                Action::NoOp
            }
            KeyName::Backspace | KeyName::Delete => {
                let mut edited = query.to_string();
                edited.pop();
                query_action(edited)
            }
            KeyName::Enter | KeyName::Return => Action::Select(SelectionTrigger::Indexed(highlight)),
            KeyName::Tab => Action::Select(SelectionTrigger::Random),
            KeyName::Up => Action::MoveHighlight(Direction::Up),
            KeyName::Down => Action::MoveHighlight(Direction::Down),
            KeyName::Char(c) => {
                let c = if self.shift_pressed { shift_variant(c) } else { c };
                let mut edited = String::with_capacity(query.len() + c.len_utf8());
                edited.push_str(query);
                edited.push(c);
                query_action(edited)
            }
            KeyName::Ignored(_) => Action::NoOp,
        }
    }
}

fn query_action(query: String) -> Action {
    if query.eq_ignore_ascii_case(EDIT_KEYWORD) {
        Action::EnterEditMode
    } else {
        Action::QueryChanged(query)
    }
}
