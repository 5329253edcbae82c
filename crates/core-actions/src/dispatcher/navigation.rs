//! Previous / next version handling.
//!
//! Thin delegation into `SessionState`, which moves the history cursor and
//! copies the newly current version into the buffer. Boundaries and a missing
//! cursor (after a hand edit) are silent no-ops.

use super::ActionResult;
use core_state::SessionState;

pub(crate) fn handle_previous(state: &mut SessionState) -> ActionResult {
    let moved = state.previous_version();
    tracing::trace!(
        target: "actions.dispatch",
        op = "previous",
        moved,
        cursor = ?state.history().current_index(),
        "navigate"
    );
    ActionResult::from_changed(moved)
}

pub(crate) fn handle_next(state: &mut SessionState) -> ActionResult {
    let moved = state.next_version();
    tracing::trace!(
        target: "actions.dispatch",
        op = "next",
        moved,
        cursor = ?state.history().current_index(),
        "navigate"
    );
    ActionResult::from_changed(moved)
}
