//! Command palette interaction.
//!
//! Selecting an item closes the palette and yields the same format request a
//! key chord would, so the two trigger surfaces are interchangeable.

use super::ActionResult;
use crate::Action;
use core_state::SessionState;

pub(crate) fn handle_palette_action(action: Action, state: &mut SessionState) -> ActionResult {
    let palette = state.palette_mut();
    match action {
        Action::PaletteOpen => {
            let was_open = palette.is_open();
            palette.open();
            ActionResult::from_changed(!was_open)
        }
        Action::PaletteClose => {
            let was_open = palette.is_open();
            palette.close();
            ActionResult::from_changed(was_open)
        }
        Action::PaletteToggle => {
            palette.toggle();
            ActionResult::dirty()
        }
        Action::PaletteQuery(q) => {
            palette.set_query(q);
            ActionResult::dirty()
        }
        Action::PaletteMove(delta) => {
            palette.move_selection(delta);
            ActionResult::dirty()
        }
        Action::PaletteSelect(kind) => {
            palette.close();
            tracing::trace!(target: "actions.dispatch", op = "palette_select", kind = kind.as_str(), "trigger");
            ActionResult::request(kind, true)
        }
        Action::PaletteConfirm => match palette.highlighted() {
            Some(kind) => {
                palette.close();
                tracing::trace!(target: "actions.dispatch", op = "palette_confirm", kind = kind.as_str(), "trigger");
                ActionResult::request(kind, true)
            }
            None => ActionResult::clean(),
        },
        other => {
            tracing::debug!(target: "actions.dispatch", action = ?other, "not_a_palette_action");
            ActionResult::clean()
        }
    }
}
