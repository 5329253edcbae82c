//! core-format: the closed catalog of reformatting operations.
//!
//! Every format the engine can dispatch is a `FormatKind`. The set is closed:
//! adding a member means touching the shortcut settings, the palette, and the
//! wire contract with the transport, so it is modelled as a plain enum rather
//! than a registry. The "identity" state of the untouched original text is not
//! a member; history entries carry `Option<FormatKind>` and use `None` for it.
//!
//! Wire representation is the lowercase name (`"grammar"`), shared by the
//! transport request/response and the `[shortcuts]` table keys in config.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    Translate,
    Grammar,
    Condense,
    Formality,
    Emoji,
    Improve,
}

/// Raised when a wire name does not match any catalog member.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown format `{0}`")]
pub struct UnknownFormat(pub String);

impl FormatKind {
    /// Catalog order. Used for palette listing and binding table construction.
    pub const ALL: [FormatKind; 6] = [
        FormatKind::Translate,
        FormatKind::Grammar,
        FormatKind::Condense,
        FormatKind::Formality,
        FormatKind::Emoji,
        FormatKind::Improve,
    ];

    /// Wire name (also the config key).
    pub const fn as_str(self) -> &'static str {
        match self {
            FormatKind::Translate => "translate",
            FormatKind::Grammar => "grammar",
            FormatKind::Condense => "condense",
            FormatKind::Formality => "formality",
            FormatKind::Emoji => "emoji",
            FormatKind::Improve => "improve",
        }
    }

    /// Human facing label shown in the palette and the "format applied" badge.
    pub const fn label(self) -> &'static str {
        match self {
            FormatKind::Translate => "Translate",
            FormatKind::Grammar => "Fix grammar",
            FormatKind::Condense => "Condense",
            FormatKind::Formality => "Change formality",
            FormatKind::Emoji => "Add emoji",
            FormatKind::Improve => "Improve",
        }
    }

    /// One-line hint shown under the label in the palette.
    pub const fn description(self) -> &'static str {
        match self {
            FormatKind::Translate => "Translate the text to English",
            FormatKind::Grammar => "Fix spelling and grammar mistakes",
            FormatKind::Condense => "Make the text shorter",
            FormatKind::Formality => "Switch between a casual and a formal tone",
            FormatKind::Emoji => "Sprinkle fitting emoji into the text",
            FormatKind::Improve => "Improve clarity and flow",
        }
    }

}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatKind {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        FormatKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}
