//! Core event types and channel helpers for the editing session loop.
//!
//! Producers (the terminal input pump, a GUI shell) push `Event`s into one
//! bounded mpsc channel; the session loop is the single consumer. The spawned
//! reformat task reports back with `Event::ReformatCompleted` so applying a
//! result is serialized with user input on the loop thread.

use core_format::FormatKind;
use core_transport::TransportResult;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::{self, Receiver, Sender};

// -------------------------------------------------------------------------------------------------
// Channel Policy
// -------------------------------------------------------------------------------------------------
// Bounded channel sized by `EVENT_CHANNEL_CAP`. Input producers use `blocking_send` / `send().await`
// and are parked while the loop catches up; nothing is dropped. The loop polls reformat
// completions ahead of input so a burst of keys cannot delay applying a result.
// -------------------------------------------------------------------------------------------------
pub const EVENT_CHANNEL_CAP: usize = 1024;

// Telemetry: relaxed atomic counters, inspected by tests and logged at shutdown.
pub static CHANNEL_SEND_FAILURES: AtomicU64 = AtomicU64::new(0);
pub static KEYPRESS_TOTAL: AtomicU64 = AtomicU64::new(0);

/// Create the session event channel.
pub fn event_channel() -> (Sender<Event>, Receiver<Event>) {
    mpsc::channel(EVENT_CHANNEL_CAP)
}

/// Send helper that records failures (consumer dropped) instead of surfacing them.
pub async fn send_or_count(tx: &Sender<Event>, event: Event) -> bool {
    match tx.send(event).await {
        Ok(()) => true,
        Err(_) => {
            CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(target: "runtime.events", "send_failed_channel_closed");
            false
        }
    }
}

/// Top-level event enum consumed by the session loop.
#[derive(Debug)]
pub enum Event {
    Input(InputEvent),
    Command(CommandEvent),
    /// The spawned transport call for request `id` settled.
    ReformatCompleted {
        id: RequestId,
        result: TransportResult,
    },
    Shutdown,
}

/// Identifier handed out per issued reformat request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Key chord pressed inside the editor surface.
    Key(KeyEvent),
    /// The edit buffer content was changed by the user (typing, paste, cut).
    TextChanged(String),
}

/// Explicit UI commands (buttons, palette interaction) that do not go through
/// key resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandEvent {
    Format(FormatKind),
    PreviousVersion,
    NextVersion,
    /// Confirmed Clean. The confirmation dialog lives in the UI layer.
    Clean,
    PaletteOpen,
    PaletteClose,
    PaletteQuery(String),
    PaletteMove(isize),
    PaletteSelect(FormatKind),
    PaletteConfirm,
}

// -------------------------------------------------------------------------------------------------
// Key model
// -------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Normalized logical key, independent of the terminal/GUI toolkit that produced it.
/// Printable keys are stored lowercased when SHIFT is carried in `mods`.
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Tab,
    Space,
    Up,
    Down,
    Left,
    Right,
    F(u8),
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct KeyModifiers: u8 {
        const CTRL  = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const SHIFT = 0b0000_0100;
        const META  = 0b0000_1000;
        const SUPER = 0b0001_0000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyEvent {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self {
            code: normalize_keycode(code),
            mods,
        }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::empty())
    }
}

/// Fold toolkit variations into one canonical code: `' '` becomes `Space`,
/// letters are lowercased so `shift+G` and `shift+g` compare equal.
pub fn normalize_keycode(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(' ') => KeyCode::Space,
        KeyCode::Char(c) if c.is_ascii_uppercase() => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCode::Char(c) => write!(f, "{c}"),
            KeyCode::Enter => f.write_str("enter"),
            KeyCode::Esc => f.write_str("esc"),
            KeyCode::Backspace => f.write_str("backspace"),
            KeyCode::Tab => f.write_str("tab"),
            KeyCode::Space => f.write_str("space"),
            KeyCode::Up => f.write_str("up"),
            KeyCode::Down => f.write_str("down"),
            KeyCode::Left => f.write_str("left"),
            KeyCode::Right => f.write_str("right"),
            KeyCode::F(n) => write!(f, "f{n}"),
        }
    }
}

/// Renders in the same `ctrl+shift+g` grammar the keymap parser accepts.
impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const ORDER: [(KeyModifiers, &str); 5] = [
            (KeyModifiers::CTRL, "ctrl"),
            (KeyModifiers::ALT, "alt"),
            (KeyModifiers::SHIFT, "shift"),
            (KeyModifiers::META, "meta"),
            (KeyModifiers::SUPER, "super"),
        ];
        for (flag, name) in ORDER {
            if self.mods.contains(flag) {
                write!(f, "{name}+")?;
            }
        }
        write!(f, "{}", self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_transport::ReformatResponse;

    #[test]
    fn key_event_display_orders_modifiers() {
        let k = KeyEvent::new(
            KeyCode::Char('G'),
            KeyModifiers::SHIFT | KeyModifiers::CTRL,
        );
        assert_eq!(k.to_string(), "ctrl+shift+g");
    }

    #[test]
    fn normalize_folds_space_and_case() {
        assert_eq!(normalize_keycode(KeyCode::Char(' ')), KeyCode::Space);
        assert_eq!(normalize_keycode(KeyCode::Char('K')), KeyCode::Char('k'));
        assert_eq!(normalize_keycode(KeyCode::Char('1')), KeyCode::Char('1'));
        assert_eq!(normalize_keycode(KeyCode::F(5)), KeyCode::F(5));
    }

    #[test]
    fn plain_has_no_modifiers() {
        let k = KeyEvent::plain(KeyCode::Esc);
        assert!(k.mods.is_empty());
        assert_eq!(k.to_string(), "esc");
    }

    #[tokio::test]
    async fn send_or_count_records_closed_channel() {
        let (tx, rx) = event_channel();
        drop(rx);
        let before = CHANNEL_SEND_FAILURES.load(Ordering::Relaxed);
        let delivered = send_or_count(&tx, Event::Shutdown).await;
        assert!(!delivered);
        assert!(CHANNEL_SEND_FAILURES.load(Ordering::Relaxed) > before);
    }

    #[tokio::test]
    async fn completion_travels_through_channel() {
        let (tx, mut rx) = event_channel();
        assert!(
            send_or_count(
                &tx,
                Event::ReformatCompleted {
                    id: RequestId(7),
                    result: Ok(ReformatResponse::empty()),
                },
            )
            .await
        );
        match rx.recv().await {
            Some(Event::ReformatCompleted { id, result }) => {
                assert_eq!(id, RequestId(7));
                assert!(result.unwrap().payload().is_none());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
