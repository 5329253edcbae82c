//! Reformat transport seam.
//!
//! The engine never performs a reformat itself. It hands a `ReformatRequest`
//! to whatever implements `ReformatTransport` (an HTTP client, an RPC bridge,
//! a test double) and consumes the `ReformatResponse`. The `format` carried in
//! the response is authoritative: it may differ from the requested kind and
//! is what ends up tagged on the history entry.
//!
//! `wire` holds the JSON shapes and codec, `timeout` an optional wrapper that
//! turns a slow transport into a `TransportError::TimedOut`. There are no
//! retries at this layer.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub mod timeout;
pub mod wire;

pub use timeout::TimeoutTransport;
pub use wire::{
    FormattedText, ReformatRequest, ReformatResponse, SelectedFormat, WireError, decode_response,
    encode_request,
};

#[derive(Debug, Error)]
pub enum TransportError {
    /// The remote procedure answered with an error envelope or rejected the call.
    #[error("reformat rejected: {message}")]
    Rejected {
        message: String,
        code: Option<String>,
    },
    #[error("reformat timed out after {0:?}")]
    TimedOut(Duration),
    /// Transport could not be reached at all (connection refused, worker gone).
    #[error("transport unavailable: {0}")]
    Unavailable(String),
    #[error("malformed reformat payload")]
    Codec(#[source] serde_json::Error),
}

impl TransportError {
    /// Short stable discriminant for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Rejected { .. } => "rejected",
            TransportError::TimedOut(_) => "timed_out",
            TransportError::Unavailable(_) => "unavailable",
            TransportError::Codec(_) => "codec",
        }
    }
}

pub type TransportResult = Result<ReformatResponse, TransportError>;

/// Anything able to run one reformat request to completion.
///
/// Implementors must settle every request (success or error); the dispatcher
/// has no cancellation and keeps its single-flight slot occupied until the
/// returned future resolves.
pub trait ReformatTransport: Send + Sync {
    fn reformat(&self, request: ReformatRequest) -> impl Future<Output = TransportResult> + Send;
}

impl<T: ReformatTransport> ReformatTransport for Arc<T> {
    fn reformat(&self, request: ReformatRequest) -> impl Future<Output = TransportResult> + Send {
        (**self).reformat(request)
    }
}

impl<T: ReformatTransport> ReformatTransport for &T {
    fn reformat(&self, request: ReformatRequest) -> impl Future<Output = TransportResult> + Send {
        (**self).reformat(request)
    }
}
