//! Sinks for allocation events.

use crate::random::RandomSource;
use crate::session::SessionHandle;
use banditry_core::config::EventSinkKind;
use banditry_core::{AllocationEvent, BanditResult, EventKind};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;
use tracing::info;

const LINE_PREFIX: &str = "[banditry]";

/// Receives one event per counter write. Failures propagate to the caller.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &AllocationEvent) -> BanditResult<()>;
}

/// Writes each event as a JSON line through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &AllocationEvent) -> BanditResult<()> {
        let line = event.to_line()?;
        info!(target: "banditry::events", "{LINE_PREFIX} {line}");
        Ok(())
    }
}

/// Writes each event as a JSON line on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl EventSink for StdoutSink {
    fn emit(&self, event: &AllocationEvent) -> BanditResult<()> {
        let line = event.to_line()?;
        let mut out = std::io::stdout().lock();
        writeln!(out, "{LINE_PREFIX} {line}")?;
        Ok(())
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<AllocationEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AllocationEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.events.lock().iter().filter(|e| e.kind == kind).count()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &AllocationEvent) -> BanditResult<()> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

pub fn sink_for(kind: EventSinkKind) -> Arc<dyn EventSink> {
    match kind {
        EventSinkKind::Tracing => Arc::new(TracingSink),
        EventSinkKind::Stdout => Arc::new(StdoutSink),
    }
}

/// Correlation nonce: session id plus a random tiebreaker.
pub fn nonce<S: SessionHandle + ?Sized>(session: &mut S, random: &dyn RandomSource) -> String {
    format!("{}_{}", session.identifier(), random.unit())
}

/// Build an event for `session` and hand it to `sink`.
pub(crate) fn emit_for<S: SessionHandle + ?Sized>(
    sink: &dyn EventSink,
    random: &dyn RandomSource,
    kind: EventKind,
    test: &str,
    choice: &str,
    session: &mut S,
) -> BanditResult<()> {
    let event = AllocationEvent::new(kind, nonce(session, random), test, choice);
    sink.emit(&event)
}
