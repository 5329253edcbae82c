//! One editing session: state, dispatcher, key bindings and the event loop.
//!
//! The synchronous surface (`edit`, `previous`, `next`, `clean`, `handle_key`,
//! `handle_action`) is what a front end calls from its UI thread. Format
//! requests go either through `dispatch(kind).await`, which holds the session
//! for the duration of the call, or through `run`, which spawns the transport
//! call and keeps consuming events until the completion comes back.

use anyhow::{Context, Result};
use core_actions::{
    Action, ActionObserver, ActionResult, DispatchOutcome, DispatchTelemetry, DispatchTicket,
    FormatDispatcher, dispatch_action,
};
use core_config::{Config, Platform, ShortcutSettings};
use core_events::{Event, InputEvent, KeyCode, KeyEvent, RequestId};
use core_format::FormatKind;
use core_keymap::{LogicalAction, TriggerBindingTable, TriggerOutcome};
use core_state::{SessionState, SessionView};
use core_transport::{ReformatTransport, TimeoutTransport, TransportResult};
use std::sync::Arc;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, info, warn};

pub mod logging;

/// What the front end should do with a key it forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// A binding or the open palette consumed the key; suppress default
    /// handling. `request` names a format that must now be dispatched.
    Consumed(ActionResult),
    /// Not ours: let it reach the text area.
    PassThrough,
}

impl KeyDisposition {
    pub fn request(&self) -> Option<FormatKind> {
        match self {
            KeyDisposition::Consumed(res) => res.request,
            KeyDisposition::PassThrough => None,
        }
    }
}

pub struct Session<T> {
    state: SessionState,
    dispatcher: FormatDispatcher,
    bindings: TriggerBindingTable,
    platform: Platform,
    transport: Arc<TimeoutTransport<T>>,
    observers: Vec<Box<dyn ActionObserver>>,
}

impl<T: ReformatTransport + 'static> Session<T> {
    /// Build a session. Shortcuts that fail to bind are replaced by the
    /// defaults; failing to bind those is an error.
    pub fn new(config: &Config, transport: T) -> Result<Self> {
        let platform = config.platform();
        let bindings = match TriggerBindingTable::from_settings(config.shortcuts(), platform) {
            Ok(table) => table,
            Err(err) => {
                warn!(target: "runtime.session", error = %err, "shortcuts_invalid_using_defaults");
                TriggerBindingTable::from_settings(&ShortcutSettings::default(), platform)
                    .context("default shortcuts failed to bind")?
            }
        };
        let transport = TimeoutTransport::from_limit(transport, config.file.transport.timeout());
        info!(
            target: "runtime.session",
            platform = ?platform,
            bindings = bindings.len(),
            timeout_ms = transport.limit().map(|d| d.as_millis() as u64),
            "session_created"
        );
        Ok(Self {
            state: SessionState::new(),
            dispatcher: FormatDispatcher::new(),
            bindings,
            platform,
            transport: Arc::new(transport),
            observers: Vec::new(),
        })
    }
}

impl<T> Session<T> {
    pub fn add_observer(&mut self, observer: Box<dyn ActionObserver>) {
        self.observers.push(observer);
    }

    pub fn view(&self) -> SessionView {
        self.state.view()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn bindings(&self) -> &TriggerBindingTable {
        &self.bindings
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn telemetry(&self) -> DispatchTelemetry {
        self.dispatcher.telemetry()
    }

    /// Text to put on the clipboard for "copy".
    pub fn copy_text(&self) -> &str {
        self.state.buffer()
    }

    pub fn edit(&mut self, text: impl Into<String>) -> ActionResult {
        self.handle_action(Action::Edit(text.into()))
    }

    pub fn previous(&mut self) -> ActionResult {
        self.handle_action(Action::PreviousVersion)
    }

    pub fn next(&mut self) -> ActionResult {
        self.handle_action(Action::NextVersion)
    }

    /// Confirmed reset of buffer, history and palette.
    pub fn clean(&mut self) -> ActionResult {
        self.handle_action(Action::Clean)
    }

    pub fn handle_action(&mut self, action: Action) -> ActionResult {
        dispatch_action(action, &mut self.state, &self.observers)
    }

    /// Route a key: bindings first, then palette navigation while it is open.
    pub fn handle_key(&mut self, key: &KeyEvent) -> KeyDisposition {
        if let TriggerOutcome::PreventDefault(action) = self.bindings.fire(key) {
            let action = match action {
                LogicalAction::Format(kind) => Action::Format(kind),
                LogicalAction::TogglePalette => Action::PaletteToggle,
            };
            return KeyDisposition::Consumed(self.handle_action(action));
        }
        if !self.state.palette().is_open() {
            return KeyDisposition::PassThrough;
        }
        match self.palette_key(key) {
            Some(action) => KeyDisposition::Consumed(self.handle_action(action)),
            None => KeyDisposition::PassThrough,
        }
    }

    fn palette_key(&self, key: &KeyEvent) -> Option<Action> {
        let plain = key.mods.is_empty() || key.mods == core_events::KeyModifiers::SHIFT;
        let action = match key.code {
            KeyCode::Esc => Action::PaletteClose,
            KeyCode::Enter => Action::PaletteConfirm,
            KeyCode::Up => Action::PaletteMove(-1),
            KeyCode::Down => Action::PaletteMove(1),
            KeyCode::Backspace => {
                let mut query = self.state.palette().query().to_string();
                query.pop();
                Action::PaletteQuery(query)
            }
            KeyCode::Space if plain => {
                Action::PaletteQuery(format!("{} ", self.state.palette().query()))
            }
            KeyCode::Char(c) if plain => {
                let c = if key.mods.contains(core_events::KeyModifiers::SHIFT) {
                    c.to_ascii_uppercase()
                } else {
                    c
                };
                Action::PaletteQuery(format!("{}{}", self.state.palette().query(), c))
            }
            _ => return None,
        };
        Some(action)
    }
}

impl<T: ReformatTransport + 'static> Session<T> {
    /// One-shot dispatch holding the session across the transport call.
    pub async fn dispatch(&mut self, kind: FormatKind) -> DispatchOutcome {
        self.dispatcher
            .dispatch(&mut self.state, &*self.transport, kind)
            .await
    }

    /// Consume events until `Shutdown` or until every sender is gone.
    ///
    /// Transport calls are spawned; their results come back as
    /// `Event::ReformatCompleted` so input keeps flowing while one is out.
    pub async fn run(mut self, mut rx: Receiver<Event>) -> SessionView {
        let (done_tx, mut done_rx) = mpsc::channel::<Event>(1);
        let mut in_flight: Option<DispatchTicket> = None;
        info!(target: "runtime.session", "session_loop_started");

        loop {
            let event = tokio::select! {
                biased;
                Some(done) = done_rx.recv() => done,
                next = rx.recv() => match next {
                    Some(event) => event,
                    None => {
                        debug!(target: "runtime.session", "event_channel_closed");
                        break;
                    }
                },
            };

            let request = match event {
                Event::Shutdown => break,
                Event::Input(InputEvent::Key(key)) => self.handle_key(&key).request(),
                Event::Input(InputEvent::TextChanged(text)) => {
                    self.edit(text);
                    None
                }
                Event::Command(cmd) => self.handle_action(Action::from(cmd)).request,
                Event::ReformatCompleted { id, result } => {
                    self.settle(&mut in_flight, id, result);
                    None
                }
            };

            if let Some(kind) = request {
                self.spawn_dispatch(kind, &mut in_flight, &done_tx);
            }
        }

        let view = self.state.view();
        let telemetry = self.dispatcher.telemetry();
        info!(
            target: "runtime.session",
            pending = view.pending,
            versions = view.history_len,
            issued = telemetry.issued,
            applied = telemetry.applied,
            failed = telemetry.failed,
            "session_loop_stopped"
        );
        view
    }

    fn spawn_dispatch(
        &mut self,
        kind: FormatKind,
        in_flight: &mut Option<DispatchTicket>,
        done_tx: &Sender<Event>,
    ) {
        let Ok(ticket) = self.dispatcher.begin(&mut self.state, kind) else {
            return;
        };
        let id = ticket.id;
        let request = ticket.request.clone();
        *in_flight = Some(ticket);
        let transport = Arc::clone(&self.transport);
        let done_tx = done_tx.clone();
        tokio::spawn(async move {
            let result = transport.reformat(request).await;
            if done_tx
                .send(Event::ReformatCompleted { id, result })
                .await
                .is_err()
            {
                debug!(target: "runtime.session", %id, "completion_dropped_loop_stopped");
            }
        });
    }

    fn settle(
        &mut self,
        in_flight: &mut Option<DispatchTicket>,
        id: RequestId,
        result: TransportResult,
    ) {
        match in_flight.take() {
            Some(ticket) if ticket.id == id => {
                let outcome = self.dispatcher.complete(&mut self.state, ticket, result);
                debug!(target: "runtime.session", %id, outcome = ?outcome, "completion_settled");
            }
            other => {
                warn!(target: "runtime.session", %id, "completion_unknown_request");
                *in_flight = other;
            }
        }
    }
}
