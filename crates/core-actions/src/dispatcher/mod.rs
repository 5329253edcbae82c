//! Dispatcher applying `Action` to mutable session state.
//!
//! Decomposed into focused sub-modules:
//! * `navigation` - previous / next over the version history
//! * `edit`       - hand edits of the buffer and Clean
//! * `palette`    - command palette interaction
//! * `format`     - the single-flight reformat dispatcher
//!
//! Everything here except `format` is synchronous and completes within one
//! call; `format` owns the only suspension point of a session.

use crate::{Action, ActionObserver};
use core_format::FormatKind;
use core_state::SessionState;

mod edit;
pub mod format;
mod navigation;
mod palette;

/// Result of dispatching a single `Action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionResult {
    /// Something visible changed; the view should be refreshed.
    pub dirty: bool,
    /// A format was requested through this action and must now go through
    /// `FormatDispatcher::begin`.
    pub request: Option<FormatKind>,
}

impl ActionResult {
    pub fn dirty() -> Self {
        Self {
            dirty: true,
            request: None,
        }
    }
    pub fn clean() -> Self {
        Self {
            dirty: false,
            request: None,
        }
    }
    pub fn request(kind: FormatKind, dirty: bool) -> Self {
        Self {
            dirty,
            request: Some(kind),
        }
    }
    pub(crate) fn from_changed(changed: bool) -> Self {
        if changed { Self::dirty() } else { Self::clean() }
    }
}

/// Apply an action to session state.
pub fn dispatch_action(
    action: Action,
    state: &mut SessionState,
    observers: &[Box<dyn ActionObserver>],
) -> ActionResult {
    for obs in observers {
        obs.on_action(&action);
    }

    match action {
        Action::Format(kind) => {
            tracing::trace!(target: "actions.dispatch", op = "format", kind = kind.as_str(), "trigger");
            ActionResult::request(kind, false)
        }
        Action::PreviousVersion => navigation::handle_previous(state),
        Action::NextVersion => navigation::handle_next(state),
        Action::Edit(text) => edit::handle_edit(text, state),
        Action::Clean => edit::handle_clean(state),
        Action::PaletteOpen
        | Action::PaletteClose
        | Action::PaletteToggle
        | Action::PaletteQuery(_)
        | Action::PaletteMove(_)
        | Action::PaletteSelect(_)
        | Action::PaletteConfirm => palette::handle_palette_action(action, state),
    }
}
