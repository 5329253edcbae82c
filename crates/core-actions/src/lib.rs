//! Actions applied to a session and the format dispatcher.
//!
//! `Action` is the synchronous vocabulary of the UI surface (navigate, edit,
//! clean, palette). Format requests are the exception: applying
//! `Action::Format` or a palette selection only *names* the requested kind in
//! `ActionResult::request`; the caller then goes through
//! `FormatDispatcher::begin`, so both trigger surfaces share the single-flight
//! gate.

use core_events::CommandEvent;
use core_format::FormatKind;

pub mod dispatcher;

pub use dispatcher::format::{
    DispatchError, DispatchOutcome, DispatchTelemetry, DispatchTicket, FormatDispatcher,
};
pub use dispatcher::{ActionResult, dispatch_action};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Format(FormatKind),
    PreviousVersion,
    NextVersion,
    /// Hand edit of the buffer.
    Edit(String),
    /// Confirmed reset of buffer, history and palette.
    Clean,
    PaletteOpen,
    PaletteClose,
    PaletteToggle,
    PaletteQuery(String),
    PaletteMove(isize),
    PaletteSelect(FormatKind),
    /// Select the highlighted palette item.
    PaletteConfirm,
}

impl From<CommandEvent> for Action {
    fn from(cmd: CommandEvent) -> Self {
        match cmd {
            CommandEvent::Format(kind) => Action::Format(kind),
            CommandEvent::PreviousVersion => Action::PreviousVersion,
            CommandEvent::NextVersion => Action::NextVersion,
            CommandEvent::Clean => Action::Clean,
            CommandEvent::PaletteOpen => Action::PaletteOpen,
            CommandEvent::PaletteClose => Action::PaletteClose,
            CommandEvent::PaletteQuery(q) => Action::PaletteQuery(q),
            CommandEvent::PaletteMove(d) => Action::PaletteMove(d),
            CommandEvent::PaletteSelect(kind) => Action::PaletteSelect(kind),
            CommandEvent::PaletteConfirm => Action::PaletteConfirm,
        }
    }
}

/// Observer notified before each action is applied (logging, analytics,
/// test probes). Must not block.
pub trait ActionObserver: Send + Sync {
    fn on_action(&self, action: &Action);
}
