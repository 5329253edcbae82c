//! Hand edits and Clean.

use super::ActionResult;
use core_state::SessionState;

pub(crate) fn handle_edit(text: String, state: &mut SessionState) -> ActionResult {
    let size_bytes = text.len();
    let changed = state.set_buffer(text);
    tracing::trace!(target: "actions.dispatch", op = "edit", size_bytes, changed, "edit");
    ActionResult::from_changed(changed)
}

/// Atomic reset entry point; the confirmation step happens before this in the UI.
pub(crate) fn handle_clean(state: &mut SessionState) -> ActionResult {
    state.reset();
    tracing::debug!(target: "actions.dispatch", op = "clean", pending = state.is_pending(), "clean");
    ActionResult::dirty()
}
