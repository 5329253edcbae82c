//! Single-flight reformat dispatcher.
//!
//! Scope:
//! - Two phases so the caller keeps processing input while a request is out:
//!   `begin` claims the pending slot and builds the request, `complete`
//!   reconciles whatever the transport returned into session state.
//! - `dispatch` chains both around one transport call for callers that can
//!   afford to hold the state across the await (tests, scripted sessions).
//!
//! Reconciliation rules:
//! - The format in the response is authoritative and is what gets tagged on
//!   the appended version, whatever was requested.
//! - A first successful dispatch appends the snapshot text as the untagged
//!   original and then the result; later ones append the result only.
//! - A completion whose generation predates a Clean, or whose id is not the
//!   one in flight, is discarded without touching history or buffer.
//! - Transport failures never propagate: they are recorded on the session as
//!   `last_error` and the slot is released.

use core_events::RequestId;
use core_format::FormatKind;
use core_state::{DispatchSnapshot, ErrorInfo, HistoryError, SessionState, TextVersion};
use core_transport::{ReformatRequest, ReformatTransport, TransportResult};
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("a reformat is already pending")]
    Busy,
}

/// Everything `complete` needs to reconcile one request.
#[derive(Debug, Clone)]
pub struct DispatchTicket {
    pub id: RequestId,
    pub request: ReformatRequest,
    pub snapshot: DispatchSnapshot,
}

impl DispatchTicket {
    pub fn requested(&self) -> FormatKind {
        self.request.requested()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Result appended at `index` and made current.
    Applied { format: FormatKind, index: usize },
    /// Transport succeeded without a usable payload; nothing changed.
    Empty,
    Failed(ErrorInfo),
    /// Result arrived for a session that was reset, or for a request that is
    /// no longer in flight.
    Discarded,
    /// Never issued: another dispatch was pending.
    Rejected,
    /// History refused the append shape; nothing changed.
    Invalid(HistoryError),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchTelemetry {
    pub issued: u64,
    pub applied: u64,
    pub empty: u64,
    pub failed: u64,
    pub rejected: u64,
    pub discarded: u64,
}

#[derive(Debug, Default)]
pub struct FormatDispatcher {
    next_id: u64,
    in_flight: Option<RequestId>,
    telemetry: DispatchTelemetry,
}

impl FormatDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn telemetry(&self) -> DispatchTelemetry {
        self.telemetry
    }

    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight
    }

    /// Claim the single-flight slot for `requested`.
    pub fn begin(
        &mut self,
        state: &mut SessionState,
        requested: FormatKind,
    ) -> Result<DispatchTicket, DispatchError> {
        let Some(snapshot) = state.begin_dispatch() else {
            self.telemetry.rejected += 1;
            debug!(
                target: "actions.format",
                requested = requested.as_str(),
                in_flight = ?self.in_flight,
                "dispatch_rejected_busy"
            );
            return Err(DispatchError::Busy);
        };
        self.next_id += 1;
        let id = RequestId(self.next_id);
        self.in_flight = Some(id);
        self.telemetry.issued += 1;
        info!(
            target: "actions.format",
            %id,
            requested = requested.as_str(),
            size_bytes = snapshot.text.len(),
            bootstrap = snapshot.history_was_empty,
            "dispatch_begin"
        );
        let request = ReformatRequest::new(snapshot.text.clone(), requested);
        Ok(DispatchTicket {
            id,
            request,
            snapshot,
        })
    }

    /// Reconcile a transport result. Never panics on transport errors.
    pub fn complete(
        &mut self,
        state: &mut SessionState,
        ticket: DispatchTicket,
        result: TransportResult,
    ) -> DispatchOutcome {
        if self.in_flight != Some(ticket.id) {
            self.telemetry.discarded += 1;
            warn!(target: "actions.format", id = %ticket.id, in_flight = ?self.in_flight, "completion_not_in_flight");
            return DispatchOutcome::Discarded;
        }
        self.in_flight = None;
        state.finish_dispatch();

        if ticket.snapshot.generation != state.generation() {
            self.telemetry.discarded += 1;
            info!(
                target: "actions.format",
                id = %ticket.id,
                issued_generation = ticket.snapshot.generation,
                generation = state.generation(),
                "completion_discarded_after_reset"
            );
            return DispatchOutcome::Discarded;
        }

        let requested = ticket.requested();
        match result {
            Ok(response) => match response.into_payload() {
                Some(payload) => {
                    let format = payload.format;
                    let size_bytes = payload.formatted_text.len();
                    let version = TextVersion::formatted(payload.formatted_text, format);
                    match state.apply_result(&ticket.snapshot, version) {
                        Ok(index) => {
                            self.telemetry.applied += 1;
                            info!(
                                target: "actions.format",
                                id = %ticket.id,
                                requested = requested.as_str(),
                                format = format.as_str(),
                                index,
                                size_bytes,
                                "dispatch_applied"
                            );
                            DispatchOutcome::Applied { format, index }
                        }
                        Err(err) => {
                            error!(target: "actions.format", id = %ticket.id, error = %err, "history_shape_violation");
                            debug_assert!(false, "history shape violation: {err}");
                            DispatchOutcome::Invalid(err)
                        }
                    }
                }
                None => {
                    self.telemetry.empty += 1;
                    warn!(
                        target: "actions.format",
                        id = %ticket.id,
                        requested = requested.as_str(),
                        "dispatch_empty_payload"
                    );
                    DispatchOutcome::Empty
                }
            },
            Err(err) => {
                self.telemetry.failed += 1;
                error!(
                    target: "actions.format",
                    id = %ticket.id,
                    requested = requested.as_str(),
                    kind = err.kind(),
                    error = %err,
                    "dispatch_failed"
                );
                let info = ErrorInfo {
                    requested,
                    message: err.to_string(),
                };
                state.record_error(info.clone());
                DispatchOutcome::Failed(info)
            }
        }
    }

    /// `begin`, one transport call, `complete`.
    pub async fn dispatch<T: ReformatTransport>(
        &mut self,
        state: &mut SessionState,
        transport: &T,
        requested: FormatKind,
    ) -> DispatchOutcome {
        let ticket = match self.begin(state, requested) {
            Ok(ticket) => ticket,
            Err(DispatchError::Busy) => return DispatchOutcome::Rejected,
        };
        let result = transport.reformat(ticket.request.clone()).await;
        self.complete(state, ticket, result)
    }
}
