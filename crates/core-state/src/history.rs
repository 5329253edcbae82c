use core_format::FormatKind;
use std::fmt;
use thiserror::Error;
use tracing::trace;

/// An immutable snapshot of text plus the format that produced it.
///
/// `format` is `None` only for the untouched original at index 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextVersion {
    text: String,
    format: Option<FormatKind>,
}

impl TextVersion {
    pub fn original(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: None,
        }
    }

    pub fn formatted(text: impl Into<String>, format: FormatKind) -> Self {
        Self {
            text: text.into(),
            format: Some(format),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn format(&self) -> Option<FormatKind> {
        self.format
    }
}

/// Contract violations of the two append shapes. These indicate a caller bug,
/// not a user-facing condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("bootstrap append on a history that already has {len} versions")]
    NotEmpty { len: usize },
    #[error("result append on an empty history")]
    Empty,
}

/// 1-based position for the `v{n}` counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionCounter {
    pub position: usize,
    pub total: usize,
}

impl fmt::Display for VersionCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.position)
    }
}

/// Append-only, branch-free sequence of versions with a cursor.
///
/// Invariants:
/// * entries are only removed by `reset`, and then all of them;
/// * `cursor` is `None` or a valid index;
/// * appends move the cursor to the new last entry;
/// * navigation only moves the cursor, clamped to `[0, len-1]`.
#[derive(Debug, Clone, Default)]
pub struct VersionHistory {
    versions: Vec<TextVersion>,
    cursor: Option<usize>,
}

impl VersionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn versions(&self) -> &[TextVersion] {
        &self.versions
    }

    pub fn current_index(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&TextVersion> {
        self.cursor.and_then(|i| self.versions.get(i))
    }

    pub fn counter(&self) -> Option<VersionCounter> {
        self.cursor.map(|i| VersionCounter {
            position: i + 1,
            total: self.versions.len(),
        })
    }

    /// First successful format: record the original and the result together.
    pub fn append_original_and_result(
        &mut self,
        original: impl Into<String>,
        result: TextVersion,
    ) -> Result<usize, HistoryError> {
        if !self.versions.is_empty() {
            return Err(HistoryError::NotEmpty {
                len: self.versions.len(),
            });
        }
        self.versions.reserve(2);
        self.versions.push(TextVersion::original(original));
        self.versions.push(result);
        self.cursor = Some(1);
        trace!(target: "state.history", len = 2, "bootstrap_append");
        Ok(1)
    }

    pub fn append_result(&mut self, result: TextVersion) -> Result<usize, HistoryError> {
        if self.versions.is_empty() {
            return Err(HistoryError::Empty);
        }
        self.versions.push(result);
        let last = self.versions.len() - 1;
        self.cursor = Some(last);
        trace!(target: "state.history", len = self.versions.len(), "append");
        Ok(last)
    }

    pub fn can_go_previous(&self) -> bool {
        matches!(self.cursor, Some(i) if i > 0)
    }

    pub fn can_go_next(&self) -> bool {
        matches!(self.cursor, Some(i) if i + 1 < self.versions.len())
    }

    /// Step back one version. `None` means stay (no cursor or already at 0).
    pub fn previous(&mut self) -> Option<&TextVersion> {
        if !self.can_go_previous() {
            return None;
        }
        let target = self.cursor? - 1;
        self.cursor = Some(target);
        trace!(target: "state.history", cursor = target, "previous");
        self.versions.get(target)
    }

    /// Step forward one version. `None` means stay (no cursor or already last).
    pub fn next(&mut self) -> Option<&TextVersion> {
        if !self.can_go_next() {
            return None;
        }
        let target = self.cursor? + 1;
        self.cursor = Some(target);
        trace!(target: "state.history", cursor = target, "next");
        self.versions.get(target)
    }

    /// The displayed text no longer corresponds to any version.
    pub fn invalidate_cursor(&mut self) {
        if self.cursor.take().is_some() {
            trace!(target: "state.history", "cursor_invalidated");
        }
    }

    pub fn reset(&mut self) {
        trace!(target: "state.history", dropped = self.versions.len(), "reset");
        self.versions.clear();
        self.cursor = None;
    }
}
