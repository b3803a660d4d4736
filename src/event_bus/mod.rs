//! Observation channel for conversation runs.
//!
//! Producers (the driver, agents) emit [`Event`]s through a cloned flume
//! sender; a background listener drains the channel into pluggable
//! [`EventSink`]s. Event delivery is ordered and best-effort: a slow or
//! failing sink never blocks or aborts the run.

mod bus;
mod event;
mod sink;

pub use bus::EventBus;
pub use event::{DiagnosticEvent, Event, TurnEvent};
pub use sink::{EventSink, MemorySink, StdOutSink};
