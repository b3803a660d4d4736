//! Event types emitted during a conversation run.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single observable occurrence inside a run.
///
/// Turn events carry accepted transcript messages; diagnostic events carry
/// out-of-band notes (retries, timeouts, guard failures) that never enter
/// the transcript.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum Event {
    Turn(TurnEvent),
    Diagnostic(DiagnosticEvent),
}

/// A message accepted into the transcript.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TurnEvent {
    pub speaker: String,
    pub round: u64,
    pub content: String,
}

/// An out-of-band note about the run itself.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DiagnosticEvent {
    pub scope: String,
    pub message: String,
    pub when: DateTime<Utc>,
}

impl Event {
    /// Creates a turn event for an accepted message.
    #[must_use]
    pub fn turn(speaker: impl Into<String>, round: u64, content: impl Into<String>) -> Self {
        Self::Turn(TurnEvent {
            speaker: speaker.into(),
            round,
            content: content.into(),
        })
    }

    /// Creates a diagnostic event stamped with the current time.
    #[must_use]
    pub fn diagnostic(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Diagnostic(DiagnosticEvent {
            scope: scope.into(),
            message: message.into(),
            when: Utc::now(),
        })
    }

    /// Short label identifying the event source, used by plain formatters.
    #[must_use]
    pub fn scope(&self) -> &str {
        match self {
            Self::Turn(turn) => &turn.speaker,
            Self::Diagnostic(diag) => &diag.scope,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Turn(turn) => {
                write!(f, "[{} @ round {}] {}", turn.speaker, turn.round, turn.content)
            }
            Self::Diagnostic(diag) => write!(f, "[{}] {}", diag.scope, diag.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_event_display() {
        let event = Event::turn("coder", 3, "done");
        assert_eq!(event.to_string(), "[coder @ round 3] done");
        assert_eq!(event.scope(), "coder");
    }

    #[test]
    fn diagnostic_event_scope() {
        let event = Event::diagnostic("driver", "retrying turn");
        assert_eq!(event.scope(), "driver");
    }
}
