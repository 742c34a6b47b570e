//! Per-request trace context.
//!
//! Every service call opens a [`Trace`] carrying a random trace ID. Stages of
//! the call open [`Span`]s that record their duration when dropped. When the
//! call ends the trace is logged at `debug` as one JSON line, and failures
//! are logged at `warn` with the trace ID so they can be correlated.

use std::{
    cell::RefCell,
    time::{Duration, Instant},
};

use log::{debug, log_enabled, warn, Level};
use rand::{distributions::Alphanumeric, Rng};
use serde::Serialize;

use crate::error::Result;

const TRACE_ID_LEN: usize = 16;

/// Timing of one stage of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpanRecord {
    pub name: &'static str,
    pub elapsed_us: u128,
}

/// What a finished trace logs.
#[derive(Debug, Clone, Serialize)]
pub struct TraceSummary<'a> {
    pub trace_id: &'a str,
    pub op: &'static str,
    pub ok: bool,
    pub elapsed_us: u128,
    pub spans: Vec<SpanRecord>,
}

/// Trace context for a single service call.
pub struct Trace {
    id: String,
    op: &'static str,
    started: Instant,
    spans: RefCell<Vec<SpanRecord>>,
}

impl Trace {
    pub fn new(op: &'static str) -> Self {
        let id = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TRACE_ID_LEN)
            .map(char::from)
            .collect();
        Self {
            id,
            op,
            started: Instant::now(),
            spans: RefCell::new(Vec::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn op(&self) -> &'static str {
        self.op
    }

    /// Open a span; its duration is recorded when the guard drops.
    pub fn span(&self, name: &'static str) -> Span<'_> {
        Span {
            trace: self,
            name,
            started: Instant::now(),
        }
    }

    /// Spans recorded so far.
    pub fn spans(&self) -> Vec<SpanRecord> {
        self.spans.borrow().clone()
    }

    fn record(&self, name: &'static str, elapsed: Duration) {
        self.spans.borrow_mut().push(SpanRecord {
            name,
            elapsed_us: elapsed.as_micros(),
        });
    }

    /// Close the trace, logging the outcome, and hand back `result`.
    pub fn finish<T>(self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            warn!("trace={} op={} failed: {e}", self.id, self.op);
        }
        if log_enabled!(Level::Debug) {
            let summary = TraceSummary {
                trace_id: &self.id,
                op: self.op,
                ok: result.is_ok(),
                elapsed_us: self.started.elapsed().as_micros(),
                spans: self.spans(),
            };
            match serde_json::to_string(&summary) {
                Ok(line) => debug!("{line}"),
                Err(e) => debug!("trace={} summary unavailable: {e}", self.id),
            }
        }
        result
    }
}

/// Guard timing one stage of a [`Trace`].
pub struct Span<'a> {
    trace: &'a Trace,
    name: &'static str,
    started: Instant,
}

impl Drop for Span<'_> {
    fn drop(&mut self) {
        self.trace.record(self.name, self.started.elapsed());
    }
}
