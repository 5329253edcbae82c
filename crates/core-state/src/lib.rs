//! Session state: edit buffer, version history, dispatch status, palette.
//!
//! One `SessionState` lives as long as one open editor instance. It is the
//! only mutable state of a session and is owned by the session loop; the
//! dispatcher and the action handlers borrow it mutably for the duration of a
//! single synchronous step, never across an await.
//!
//! Cursor model:
//! - The history cursor is an explicit index, not derived by searching the
//!   versions for the displayed text. Appends and navigation move it; a hand
//!   edit of the buffer invalidates it, which disables previous/next until
//!   the next successful format.
//!
//! Reset model:
//! - `reset()` (Clean) empties buffer, history, palette and the last error in
//!   one step and bumps `generation`. The pending flag survives: a request
//!   still in flight keeps the single-flight slot until it settles, and its
//!   result is dropped because its generation no longer matches.

use core_format::FormatKind;
use tracing::{debug, trace};

pub mod history;
pub mod palette;

pub use history::{HistoryError, TextVersion, VersionCounter, VersionHistory};
pub use palette::{PaletteEntry, PaletteState};

/// Transport failure recorded for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub requested: FormatKind,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchStatus {
    pub pending: bool,
    pub last_error: Option<ErrorInfo>,
}

/// Buffer state captured when a dispatch begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSnapshot {
    /// Buffer text sent to the transport; becomes version 0 on bootstrap.
    pub text: String,
    pub history_was_empty: bool,
    pub generation: u64,
}

#[derive(Debug, Default)]
pub struct SessionState {
    buffer: String,
    history: VersionHistory,
    status: DispatchStatus,
    palette: PaletteState,
    generation: u64,
}

/// Read-only projection handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub buffer: String,
    pub pending: bool,
    pub last_error: Option<ErrorInfo>,
    pub counter: Option<VersionCounter>,
    pub history_len: usize,
    pub current_format: Option<FormatKind>,
    pub can_previous: bool,
    pub can_next: bool,
    pub palette_open: bool,
    /// Rows of the open palette, empty while closed.
    pub palette_entries: Vec<PaletteEntry>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn history(&self) -> &VersionHistory {
        &self.history
    }

    pub fn status(&self) -> &DispatchStatus {
        &self.status
    }

    pub fn palette(&self) -> &PaletteState {
        &self.palette
    }

    pub fn palette_mut(&mut self) -> &mut PaletteState {
        &mut self.palette
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_pending(&self) -> bool {
        self.status.pending
    }

    /// Hand edit of the buffer. Returns true when the text actually changed.
    pub fn set_buffer(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text == self.buffer {
            return false;
        }
        trace!(target: "state.session", size_bytes = text.len(), "buffer_edit");
        self.buffer = text;
        self.history.invalidate_cursor();
        true
    }

    pub fn previous_version(&mut self) -> bool {
        match self.history.previous() {
            Some(version) => {
                self.buffer = version.text().to_string();
                true
            }
            None => false,
        }
    }

    pub fn next_version(&mut self) -> bool {
        match self.history.next() {
            Some(version) => {
                self.buffer = version.text().to_string();
                true
            }
            None => false,
        }
    }

    /// Format tag of the displayed version, `None` for the original or when
    /// the buffer no longer matches a version.
    pub fn current_format(&self) -> Option<FormatKind> {
        self.history.current().and_then(TextVersion::format)
    }

    /// Claim the single-flight slot and capture what the dispatch is based on.
    /// Returns `None` when a dispatch is already pending.
    pub fn begin_dispatch(&mut self) -> Option<DispatchSnapshot> {
        if self.status.pending {
            return None;
        }
        self.status.pending = true;
        self.status.last_error = None;
        Some(DispatchSnapshot {
            text: self.buffer.clone(),
            history_was_empty: self.history.is_empty(),
            generation: self.generation,
        })
    }

    /// Release the single-flight slot.
    pub fn finish_dispatch(&mut self) {
        self.status.pending = false;
    }

    pub fn record_error(&mut self, error: ErrorInfo) {
        self.status.last_error = Some(error);
    }

    /// Reconcile a successful result into history and make it current.
    ///
    /// All-or-nothing: on a shape violation neither history nor buffer change.
    pub fn apply_result(
        &mut self,
        snapshot: &DispatchSnapshot,
        version: TextVersion,
    ) -> Result<usize, HistoryError> {
        let text = version.text().to_string();
        let index = if snapshot.history_was_empty {
            self.history
                .append_original_and_result(snapshot.text.clone(), version)?
        } else {
            self.history.append_result(version)?
        };
        self.buffer = text;
        Ok(index)
    }

    /// Clean: clear buffer, history, palette query/selection and last error.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.history.reset();
        self.palette.close();
        self.status.last_error = None;
        self.generation += 1;
        debug!(
            target: "state.session",
            generation = self.generation,
            pending = self.status.pending,
            "session_reset"
        );
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            buffer: self.buffer.clone(),
            pending: self.status.pending,
            last_error: self.status.last_error.clone(),
            counter: self.history.counter(),
            history_len: self.history.len(),
            current_format: self.current_format(),
            can_previous: self.history.can_go_previous(),
            can_next: self.history.can_go_next(),
            palette_open: self.palette.is_open(),
            palette_entries: self.palette.entries(),
        }
    }
}
