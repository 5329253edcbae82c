use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::{ReformatRequest, ReformatTransport, TransportError, TransportResult};

/// Bounds every request of the wrapped transport. The dispatcher itself has no
/// timeout; a request cut short here surfaces as an ordinary failure.
#[derive(Debug, Clone)]
pub struct TimeoutTransport<T> {
    inner: T,
    limit: Option<Duration>,
}

impl<T> TimeoutTransport<T> {
    pub fn new(inner: T, limit: Duration) -> Self {
        Self {
            inner,
            limit: Some(limit),
        }
    }

    /// `None` makes the wrapper a pass-through (timeout disabled in config).
    pub fn from_limit(inner: T, limit: Option<Duration>) -> Self {
        Self { inner, limit }
    }

    pub fn limit(&self) -> Option<Duration> {
        self.limit
    }
}

impl<T: ReformatTransport> ReformatTransport for TimeoutTransport<T> {
    fn reformat(&self, request: ReformatRequest) -> impl Future<Output = TransportResult> + Send {
        let limit = self.limit;
        let requested = request.requested();
        let call = self.inner.reformat(request);
        async move {
            let Some(limit) = limit else {
                return call.await;
            };
            match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_elapsed) => {
                    warn!(
                        target: "transport",
                        requested = requested.as_str(),
                        limit_ms = limit.as_millis() as u64,
                        "reformat_timeout"
                    );
                    Err(TransportError::TimedOut(limit))
                }
            }
        }
    }
}
