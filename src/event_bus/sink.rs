//! Pluggable event sinks.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use crate::telemetry::{PlainFormatter, TranscriptFormatter};

use super::event::Event;

/// Destination for events drained off the bus.
///
/// Sinks are driven by the bus listener task, one event at a time, in the
/// order the events were emitted.
pub trait EventSink: Send {
    fn handle(&mut self, event: &Event) -> io::Result<()>;
}

/// Sink that renders each event to standard output.
pub struct StdOutSink<F: TranscriptFormatter = PlainFormatter> {
    formatter: F,
}

impl StdOutSink<PlainFormatter> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            formatter: PlainFormatter::default(),
        }
    }
}

impl Default for StdOutSink<PlainFormatter> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: TranscriptFormatter> StdOutSink<F> {
    #[must_use]
    pub fn with_formatter(formatter: F) -> Self {
        Self { formatter }
    }
}

impl<F: TranscriptFormatter + Send> EventSink for StdOutSink<F> {
    fn handle(&mut self, event: &Event) -> io::Result<()> {
        let rendered = self.formatter.render_event(event);
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{rendered}")?;
        stdout.flush()
    }
}

/// Sink that buffers events in memory, for tests and inspection.
#[derive(Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<Event>>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies out everything captured so far.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Event> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl EventSink for MemorySink {
    fn handle(&mut self, event: &Event) -> io::Result<()> {
        self.events
            .lock()
            .map_err(|_| io::Error::other("memory sink mutex poisoned"))?
            .push(event.clone());
        Ok(())
    }
}
