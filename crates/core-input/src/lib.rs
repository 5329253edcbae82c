//! Terminal input for the session loop.
//!
//! `key_token` translates crossterm key events into the session key model;
//! `InputPump` forwards a crossterm event stream into the session channel
//! until the stream ends, the channel closes or shutdown is signalled.
//!
//! Forwarded events:
//! - key presses and repeats: `InputEvent::Key`
//! - bracketed paste: `InputEvent::TextChanged` (the paste replaces the draft)
//! - ctrl+c: `Event::Shutdown`

mod key_token;

pub use key_token::{map_key_event, map_mod_mask};

use core_events::{Event, InputEvent, KEYPRESS_TOTAL, send_or_count};
use crossterm::event::{
    Event as CEvent, EventStream, KeyCode as CKeyCode, KeyEventKind as CKind,
    KeyModifiers as CMods,
};
use std::io;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::sync::{Notify, mpsc::Sender};
use tokio::task::JoinHandle;
use tokio_stream::{Stream, StreamExt};
use tracing::{info, trace, warn};

#[derive(Clone, Debug, Default)]
pub struct InputShutdown {
    notify: Arc<Notify>,
}

impl InputShutdown {
    pub fn signal(&self) {
        self.notify.notify_one();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    ShutdownSignal,
    ChannelClosed,
    StreamEnded,
    StreamError,
    Interrupted,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::ShutdownSignal => "shutdown_signal",
            StopReason::ChannelClosed => "channel_closed",
            StopReason::StreamEnded => "stream_ended",
            StopReason::StreamError => "stream_error",
            StopReason::Interrupted => "interrupted",
        }
    }
}

pub struct InputPump<S> {
    sender: Sender<Event>,
    stream: S,
    shutdown: InputShutdown,
}

impl<S> InputPump<S>
where
    S: Stream<Item = io::Result<CEvent>> + Send + Unpin,
{
    pub fn new(sender: Sender<Event>, stream: S) -> (Self, InputShutdown) {
        let shutdown = InputShutdown::default();
        (
            Self {
                sender,
                stream,
                shutdown: shutdown.clone(),
            },
            shutdown,
        )
    }

    pub async fn run(mut self) -> StopReason {
        info!(target: "input.thread", "input_pump_started");
        let reason = loop {
            let next = tokio::select! {
                biased;
                _ = self.shutdown.notify.notified() => break StopReason::ShutdownSignal,
                next = self.stream.next() => next,
            };
            let event = match next {
                None => break StopReason::StreamEnded,
                Some(Err(err)) => {
                    warn!(target: "input.thread", error_kind = ?err.kind(), "input_stream_error");
                    break StopReason::StreamError;
                }
                Some(Ok(event)) => event,
            };
            let Some(forward) = translate(event) else {
                continue;
            };
            let interrupt = matches!(forward, Event::Shutdown);
            if !send_or_count(&self.sender, forward).await {
                break StopReason::ChannelClosed;
            }
            if interrupt {
                break StopReason::Interrupted;
            }
        };
        info!(target: "input.thread", reason = reason.as_str(), "input_pump_stopped");
        reason
    }
}

fn translate(event: CEvent) -> Option<Event> {
    match event {
        CEvent::Key(key) => {
            if key.kind == CKind::Press
                && key.code == CKeyCode::Char('c')
                && key.modifiers.contains(CMods::CONTROL)
            {
                return Some(Event::Shutdown);
            }
            let mapped = map_key_event(&key)?;
            KEYPRESS_TOTAL.fetch_add(1, Ordering::Relaxed);
            trace!(target: "input.event", kind = "keypress", mods = ?mapped.mods);
            Some(Event::Input(InputEvent::Key(mapped)))
        }
        CEvent::Paste(data) => {
            trace!(target: "input.paste", len = data.len(), "paste_event");
            Some(Event::Input(InputEvent::TextChanged(data)))
        }
        _ => None,
    }
}

/// Spawn the pump over the process terminal.
pub fn spawn_terminal_input(sender: Sender<Event>) -> (JoinHandle<StopReason>, InputShutdown) {
    let (pump, shutdown) = InputPump::new(sender, EventStream::new());
    (tokio::spawn(pump.run()), shutdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::{KeyCode, KeyEvent};
    use crossterm::event::{KeyEvent as CKeyEvent, KeyEventState};

    fn press(code: CKeyCode, modifiers: CMods) -> io::Result<CEvent> {
        Ok(CEvent::Key(CKeyEvent {
            code,
            modifiers,
            kind: CKind::Press,
            state: KeyEventState::empty(),
        }))
    }

    #[tokio::test]
    async fn forwards_keys_and_paste_until_stream_ends() {
        let (tx, mut rx) = core_events::event_channel();
        let stream = tokio_stream::iter(vec![
            press(CKeyCode::Char('k'), CMods::CONTROL),
            Ok(CEvent::FocusGained),
            Ok(CEvent::Paste("pasted".to_string())),
        ]);
        let (pump, _shutdown) = InputPump::new(tx, stream);
        assert_eq!(pump.run().await, StopReason::StreamEnded);

        match rx.recv().await {
            Some(Event::Input(InputEvent::Key(k))) => {
                assert_eq!(k, KeyEvent::new(KeyCode::Char('k'), core_events::KeyModifiers::CTRL))
            }
            other => panic!("unexpected {other:?}"),
        }
        match rx.recv().await {
            Some(Event::Input(InputEvent::TextChanged(t))) => assert_eq!(t, "pasted"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn ctrl_c_sends_shutdown_and_stops() {
        let (tx, mut rx) = core_events::event_channel();
        let stream = tokio_stream::iter(vec![
            press(CKeyCode::Char('c'), CMods::CONTROL),
            press(CKeyCode::Char('x'), CMods::NONE),
        ]);
        let (pump, _shutdown) = InputPump::new(tx, stream);
        assert_eq!(pump.run().await, StopReason::Interrupted);
        assert!(matches!(rx.recv().await, Some(Event::Shutdown)));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn closed_channel_stops_pump() {
        let (tx, rx) = core_events::event_channel();
        drop(rx);
        let stream = tokio_stream::iter(vec![press(CKeyCode::Char('a'), CMods::NONE)]);
        let (pump, _shutdown) = InputPump::new(tx, stream);
        assert_eq!(pump.run().await, StopReason::ChannelClosed);
    }

    #[tokio::test]
    async fn shutdown_signal_wins_over_pending_stream() {
        let (tx, _rx) = core_events::event_channel();
        let stream = tokio_stream::pending::<io::Result<CEvent>>();
        let (pump, shutdown) = InputPump::new(tx, stream);
        shutdown.signal();
        assert_eq!(pump.run().await, StopReason::ShutdownSignal);
    }
}
