//! Command palette model.
//!
//! The palette is the second trigger surface next to key chords: it lists the
//! catalog, narrows it with a free-text query, and hands the chosen
//! `FormatKind` back to the caller. Selecting an item closes the palette; the
//! caller then dispatches exactly as a chord would.

use core_format::FormatKind;
use tracing::trace;

/// One row of the open palette as the front end renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub kind: FormatKind,
    pub label: &'static str,
    pub description: &'static str,
    pub highlighted: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PaletteState {
    open: bool,
    query: String,
    selected: usize,
}

impl PaletteState {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        if !self.open {
            trace!(target: "state.palette", "open");
        }
        self.open = true;
    }

    /// Close and forget the query so the next open starts from the full list.
    pub fn close(&mut self) {
        if self.open {
            trace!(target: "state.palette", "close");
        }
        self.open = false;
        self.clear();
    }

    pub fn toggle(&mut self) {
        if self.open { self.close() } else { self.open() }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        let len = self.items().len();
        self.selected = self.selected.min(len.saturating_sub(1));
        trace!(target: "state.palette", query_len = self.query.len(), matches = len, "query");
    }

    /// Catalog items matching the query, in catalog order. Matches the label or
    /// the wire name, case-insensitively.
    pub fn items(&self) -> Vec<FormatKind> {
        let needle = self.query.trim().to_lowercase();
        FormatKind::ALL
            .into_iter()
            .filter(|kind| {
                needle.is_empty()
                    || kind.label().to_lowercase().contains(&needle)
                    || kind.as_str().contains(&needle)
            })
            .collect()
    }

    /// Move the highlight by `delta`, clamped to the filtered list.
    pub fn move_selection(&mut self, delta: isize) {
        let len = self.items().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let max = (len - 1) as isize;
        self.selected = (self.selected as isize).saturating_add(delta).clamp(0, max) as usize;
    }

    /// Rows to render; empty while closed.
    pub fn entries(&self) -> Vec<PaletteEntry> {
        if !self.open {
            return Vec::new();
        }
        self.items()
            .into_iter()
            .enumerate()
            .map(|(i, kind)| PaletteEntry {
                kind,
                label: kind.label(),
                description: kind.description(),
                highlighted: i == self.selected,
            })
            .collect()
    }

    pub fn highlighted(&self) -> Option<FormatKind> {
        self.items().get(self.selected).copied()
    }

    /// Reset query and highlight, leaving the open flag alone.
    pub fn clear(&mut self) {
        self.query.clear();
        self.selected = 0;
    }
}
