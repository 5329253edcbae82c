#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_format::FormatKind;
use core_transport::{
    ReformatRequest, ReformatResponse, ReformatTransport, TransportError, TransportResult,
};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Transport answering from a script, recording every request it sees.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<TransportResult>>,
    seen: Mutex<Vec<ReformatRequest>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_ok(self, text: &str, format: FormatKind) -> Self {
        self.push(Ok(ReformatResponse::formatted(text, format)))
    }

    pub fn then_empty(self) -> Self {
        self.push(Ok(ReformatResponse::empty()))
    }

    pub fn then_err(self, err: TransportError) -> Self {
        self.push(Err(err))
    }

    fn push(self, result: TransportResult) -> Self {
        self.script.lock().unwrap().push_back(result);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<ReformatRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl ReformatTransport for ScriptedTransport {
    async fn reformat(&self, request: ReformatRequest) -> TransportResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(request);
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(TransportError::Unavailable("script exhausted".into())))
    }
}

/// Echo transport: returns the request text upper-cased, tagged with the
/// requested format.
pub struct Shouting;

impl ReformatTransport for Shouting {
    async fn reformat(&self, request: ReformatRequest) -> TransportResult {
        let kind = request.requested();
        Ok(ReformatResponse::formatted(request.text.to_uppercase(), kind))
    }
}
