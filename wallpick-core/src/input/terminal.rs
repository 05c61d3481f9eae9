//! src/input/terminal.rs
//! ============================================================================
//! # Terminal input: crossterm events onto the bounded input queue
//!
//! crossterm reports the character a key produced, not the physical key.
//! Each press is expanded back into physical strokes (shift down, key down,
//! key up, shift up) so the key interpreter's shift tracking rebuilds the
//! same character.

use crossterm::event::{Event as TerminalEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, trace, warn};

use crate::controller::key_interpreter::{KeyName, RawKey, unshifted_base};

/// Capacity of the queue between the reader task and the event loop.
pub const INPUT_QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(RawKey),
    Resize(u16, u16),
    /// Ctrl-C, SIGINT or SIGTERM.
    Interrupt,
}

pub fn input_channel() -> (mpsc::Sender<InputEvent>, mpsc::Receiver<InputEvent>) {
    mpsc::channel(INPUT_QUEUE_CAPACITY)
}

fn tap(name: KeyName) -> Vec<InputEvent> {
    vec![
        InputEvent::Key(RawKey::press(name.clone())),
        InputEvent::Key(RawKey::release(name)),
    ]
}

fn shifted_tap(name: KeyName) -> Vec<InputEvent> {
    let mut strokes = Vec::with_capacity(4);
    strokes.push(InputEvent::Key(RawKey::press(KeyName::Shift)));
    strokes.extend(tap(name));
    strokes.push(InputEvent::Key(RawKey::release(KeyName::Shift)));
    strokes
}

/// Physical strokes for one crossterm key event.
pub fn key_to_strokes(key: KeyEvent) -> Vec<InputEvent> {
    if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return Vec::new();
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C')) {
            return vec![InputEvent::Interrupt];
        }
        return tap(KeyName::Ignored("ctrl".into()));
    }
    if key.modifiers.intersects(KeyModifiers::ALT | KeyModifiers::SUPER | KeyModifiers::META) {
        return tap(KeyName::Ignored("alt".into()));
    }

    match key.code {
        KeyCode::Char(c) => match unshifted_base(c) {
            Some(base) => shifted_tap(KeyName::Char(base)),
            None => tap(KeyName::Char(c)),
        },
        KeyCode::Backspace => tap(KeyName::Backspace),
        KeyCode::Delete => tap(KeyName::Delete),
        KeyCode::Enter => tap(KeyName::Enter),
        KeyCode::Tab => tap(KeyName::Tab),
        KeyCode::BackTab => shifted_tap(KeyName::Tab),
        KeyCode::Up => tap(KeyName::Up),
        KeyCode::Down => tap(KeyName::Down),
        other => tap(KeyName::Ignored(ignored_name(other))),
    }
}

fn ignored_name(code: KeyCode) -> String {
    match code {
        KeyCode::Esc => "esc".into(),
        KeyCode::Left => "left".into(),
        KeyCode::Right => "right".into(),
        KeyCode::Home => "home".into(),
        KeyCode::End => "end".into(),
        KeyCode::PageUp => "page up".into(),
        KeyCode::PageDown => "page down".into(),
        KeyCode::Insert => "insert".into(),
        KeyCode::CapsLock => "caps lock".into(),
        KeyCode::F(n) => format!("f{n}"),
        other => format!("{other:?}").to_lowercase(),
    }
}

/// Read terminal events until the receiver goes away or the stream ends.
pub fn spawn_reader(tx: mpsc::Sender<InputEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut stream = EventStream::new();
        while let Some(event) = stream.next().await {
            let events = match event {
                Ok(TerminalEvent::Key(key)) => key_to_strokes(key),
                Ok(TerminalEvent::Resize(w, h)) => vec![InputEvent::Resize(w, h)],
                Ok(other) => {
                    trace!("Ignoring terminal event {:?}", other);
                    continue;
                }
                Err(e) => {
                    warn!("Terminal event stream failed: {}", e);
                    break;
                }
            };
            for event in events {
                if tx.send(event).await.is_err() {
                    debug!("Input queue closed, stopping reader");
                    return;
                }
            }
        }
        debug!("Terminal event stream ended");
    })
}

/// Turn SIGINT/SIGTERM into `InputEvent::Interrupt`.
pub fn spawn_signal_listener(tx: mpsc::Sender<InputEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            let (mut sigterm, mut sigint) =
                match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                    (Ok(term), Ok(int)) => (term, int),
                    (Err(e), _) | (_, Err(e)) => {
                        warn!("Failed to install signal handlers: {}", e);
                        return;
                    }
                };

            tokio::select! {
                _ = sigterm.recv() => info!("Received SIGTERM"),
                _ = sigint.recv() => info!("Received SIGINT"),
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {}", e);
                return;
            }
            info!("Received Ctrl+C");
        }

        if tx.send(InputEvent::Interrupt).await.is_err() {
            debug!("Input queue closed, interrupt dropped");
        }
    })
}
