//! core-keymap: trigger binding table.
//!
//! Maps key chords onto logical actions: one `LogicalAction::Format` per
//! catalog member plus the palette toggle. The chord strings come from the
//! user's shortcut settings; this crate parses them, rejects conflicts, and
//! resolves incoming key events.
//!
//! Design principles:
//! - Pure and deterministic: resolution depends only on the mounted table and
//!   the key event.
//! - Mounting is idempotent. A front end that re-mounts on every view refresh
//!   still ends up with exactly one binding per chord, so a chord never fires
//!   twice.
//! - No side effects beyond TRACE/DEBUG logging.

use core_config::{Platform, ShortcutSettings};
use core_events::KeyEvent;
use core_format::FormatKind;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, trace};

pub mod chord;

pub use chord::{ChordParseError, ChordSet, KeyChord, parse_chord, parse_chord_set};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalAction {
    Format(FormatKind),
    TogglePalette,
}

impl LogicalAction {
    /// Every bindable action in a stable order (catalog order, then palette).
    pub fn all() -> impl Iterator<Item = LogicalAction> {
        FormatKind::ALL
            .into_iter()
            .map(LogicalAction::Format)
            .chain(std::iter::once(LogicalAction::TogglePalette))
    }

    /// Settings key naming this action.
    pub fn name(self) -> &'static str {
        match self {
            LogicalAction::Format(kind) => kind.as_str(),
            LogicalAction::TogglePalette => "palette",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("shortcut for `{action}` is invalid: {source}")]
    Chord {
        action: &'static str,
        #[source]
        source: ChordParseError,
    },
    #[error("chord `{chord}` is bound to both `{first}` and `{second}`")]
    Conflict {
        chord: String,
        first: &'static str,
        second: &'static str,
    },
}

/// What the front end should do with the input event that produced a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A binding matched: suppress the toolkit's default handling and run it.
    PreventDefault(LogicalAction),
    /// No binding: let the key reach the text area untouched.
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct TriggerBindingTable {
    bindings: HashMap<KeyChord, LogicalAction>,
    mounted: bool,
}

impl TriggerBindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and mount a table in one step.
    pub fn from_settings(
        settings: &ShortcutSettings,
        platform: Platform,
    ) -> Result<Self, BindingError> {
        let mut table = Self::new();
        table.mount(settings, platform)?;
        Ok(table)
    }

    /// Replace every binding with the ones described by `settings`.
    ///
    /// Atomic: on error the previously mounted bindings stay in place.
    pub fn mount(
        &mut self,
        settings: &ShortcutSettings,
        platform: Platform,
    ) -> Result<(), BindingError> {
        let bindings = compile(settings, platform)?;
        debug!(
            target: "keymap",
            bindings = bindings.len(),
            remount = self.mounted,
            "bindings_mounted"
        );
        self.bindings = bindings;
        self.mounted = true;
        Ok(())
    }

    pub fn unmount(&mut self) {
        if self.mounted {
            debug!(target: "keymap", bindings = self.bindings.len(), "bindings_unmounted");
        }
        self.bindings.clear();
        self.mounted = false;
    }

    pub fn mounted(&self) -> bool {
        self.mounted
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn resolve(&self, key: &KeyEvent) -> Option<LogicalAction> {
        let hit = self.bindings.get(key).copied();
        trace!(target: "keymap", key = %key, hit = ?hit, "resolve");
        hit
    }

    /// Route a fired key. Matching keys must not reach the text area.
    pub fn fire(&self, key: &KeyEvent) -> TriggerOutcome {
        match self.resolve(key) {
            Some(action) => TriggerOutcome::PreventDefault(action),
            None => TriggerOutcome::Ignored,
        }
    }

    /// Chords bound to `action`, sorted for stable display.
    pub fn chords_for(&self, action: LogicalAction) -> Vec<KeyChord> {
        let mut out: Vec<_> = self
            .bindings
            .iter()
            .filter(|(_, bound)| **bound == action)
            .map(|(chord, _)| *chord)
            .collect();
        out.sort();
        out
    }
}

fn compile(
    settings: &ShortcutSettings,
    platform: Platform,
) -> Result<HashMap<KeyChord, LogicalAction>, BindingError> {
    let mut bindings = HashMap::new();
    for action in LogicalAction::all() {
        let spec = match action {
            LogicalAction::Format(kind) => settings.chord_for(kind),
            LogicalAction::TogglePalette => settings.palette.as_str(),
        };
        let chords = parse_chord_set(spec, platform).map_err(|source| BindingError::Chord {
            action: action.name(),
            source,
        })?;
        for chord in chords {
            if let Some(prev) = bindings.insert(chord, action) {
                return Err(BindingError::Conflict {
                    chord: chord.to_string(),
                    first: prev.name(),
                    second: action.name(),
                });
            }
        }
    }
    Ok(bindings)
}
