//! Key chord string grammar.
//!
//! `mod+shift+g`, alternatives separated by commas (`ctrl+k, meta+k`).
//! Tokens are case-insensitive and joined by `+`; the last token is the key,
//! every earlier one a modifier. `mod` is the platform primary modifier.
//!
//! `meta`, `cmd` and `super` all name the Command / Windows key, which
//! terminals report as the super modifier.

use core_config::Platform;
use core_events::{KeyCode, KeyEvent, KeyModifiers};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::trace;

/// One concrete chord. Equal to the `KeyEvent` it matches.
pub type KeyChord = KeyEvent;

/// Parsed chord spec: one or more alternative chords.
pub type ChordSet = SmallVec<[KeyChord; 2]>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChordParseError {
    #[error("empty chord")]
    Empty,
    #[error("unknown modifier `{0}`")]
    UnknownModifier(String),
    #[error("unknown key `{0}`")]
    UnknownKey(String),
    #[error("chord `{0}` has no key after its modifiers")]
    MissingKey(String),
}

/// Parse a full spec (possibly with `,` alternatives).
pub fn parse_chord_set(spec: &str, platform: Platform) -> Result<ChordSet, ChordParseError> {
    let mut out = ChordSet::new();
    for alt in spec.split(',') {
        let chord = parse_chord(alt, platform)?;
        if !out.contains(&chord) {
            out.push(chord);
        }
    }
    trace!(target: "keymap", spec, alternatives = out.len(), "chord_set_parsed");
    Ok(out)
}

/// Parse a single chord (`alt+shift+e`).
pub fn parse_chord(chord: &str, platform: Platform) -> Result<KeyChord, ChordParseError> {
    let chord = chord.trim();
    if chord.is_empty() {
        return Err(ChordParseError::Empty);
    }
    // "ctrl++" binds the plus key itself
    let (head, key_token) = match chord.strip_suffix("++") {
        Some(head) => (head, "+"),
        None => match chord.rsplit_once('+') {
            Some((head, key)) => (head, key),
            None => ("", chord),
        },
    };
    let key_token = key_token.trim();
    if key_token.is_empty() {
        return Err(ChordParseError::MissingKey(chord.to_string()));
    }

    let mut mods = KeyModifiers::empty();
    for token in head.split('+').map(str::trim).filter(|t| !t.is_empty()) {
        mods |= parse_modifier(token, platform)?;
    }
    let code = parse_key(key_token)?;
    Ok(KeyEvent::new(code, mods))
}

fn parse_modifier(token: &str, platform: Platform) -> Result<KeyModifiers, ChordParseError> {
    let m = match token.to_ascii_lowercase().as_str() {
        "ctrl" | "control" => KeyModifiers::CTRL,
        "alt" | "option" => KeyModifiers::ALT,
        "shift" => KeyModifiers::SHIFT,
        "meta" | "cmd" | "command" | "super" | "win" => KeyModifiers::SUPER,
        "mod" => primary_modifier(platform),
        _ => return Err(ChordParseError::UnknownModifier(token.to_string())),
    };
    Ok(m)
}

fn parse_key(token: &str) -> Result<KeyCode, ChordParseError> {
    let lower = token.to_ascii_lowercase();
    let code = match lower.as_str() {
        "enter" | "return" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "space" => KeyCode::Space,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        _ => {
            if let Some(n) = lower
                .strip_prefix('f')
                .and_then(|digits| digits.parse::<u8>().ok())
                .filter(|n| (1..=24).contains(n))
            {
                KeyCode::F(n)
            } else {
                let mut chars = token.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return Err(ChordParseError::UnknownKey(token.to_string())),
                }
            }
        }
    };
    Ok(code)
}

/// Modifier `mod` stands for: command (super) on macOS, control elsewhere.
pub fn primary_modifier(platform: Platform) -> KeyModifiers {
    match platform {
        Platform::MacOs => KeyModifiers::SUPER,
        Platform::Windows | Platform::Linux => KeyModifiers::CTRL,
    }
}
