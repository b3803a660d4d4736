//! Guard predicates for workflow edges.
//!
//! A guard is a pure, side-effect-free predicate over a transcript snapshot.
//! Guards take the transcript as an explicit parameter (no captured agent
//! references) so each one is independently testable. A guard that returns
//! an error is treated by the router as "edge does not match"; the error is
//! logged as a warning and never aborts the run.

use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

use crate::transcript::TranscriptSnapshot;

/// Predicate deciding whether a guarded edge is currently eligible.
///
/// Must be pure: evaluation depends only on the snapshot contents, never on
/// prior evaluations or external state.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use colloquy::graphs::guards::Guard;
///
/// let at_least_two: Guard = Arc::new(|snapshot| Ok(snapshot.len() >= 2));
/// ```
pub type Guard = Arc<dyn Fn(&TranscriptSnapshot) -> Result<bool, GuardError> + Send + Sync>;

/// Error raised by a guard predicate.
///
/// The router downgrades this to a non-match, so it only ever surfaces as a
/// warning in the logs.
#[derive(Debug, Error, Diagnostic)]
#[error("guard evaluation failed: {reason}")]
#[diagnostic(
    code(colloquy::graphs::guard),
    help("A failing guard counts as non-matching; check the guard's inputs.")
)]
pub struct GuardError {
    pub reason: String,
}

impl GuardError {
    pub fn msg(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Guard that passes when the most recent message was sent by `name`.
///
/// # Examples
///
/// ```
/// use colloquy::graphs::guards::last_sender_is;
/// use colloquy::message::Message;
/// use colloquy::transcript::Transcript;
///
/// let guard = last_sender_is("admin");
/// let mut t = Transcript::new();
/// t.append(Message::new("admin", "coder, your turn"));
/// assert!(guard(&t.snapshot()).unwrap());
/// ```
#[must_use]
pub fn last_sender_is(name: impl Into<String>) -> Guard {
    let name = name.into();
    Arc::new(move |snapshot| Ok(snapshot.last_sender() == Some(name.as_str())))
}

/// Guard that passes when any message in the transcript was sent by `name`.
#[must_use]
pub fn has_spoken(name: impl Into<String>) -> Guard {
    let name = name.into();
    Arc::new(move |snapshot| Ok(snapshot.has_sender(&name)))
}

/// Guard that passes only when every inner guard passes.
///
/// Evaluation short-circuits on the first non-match; an inner guard error
/// propagates so the router can log it.
#[must_use]
pub fn all_of(guards: Vec<Guard>) -> Guard {
    Arc::new(move |snapshot| {
        for guard in &guards {
            if !guard(snapshot)? {
                return Ok(false);
            }
        }
        Ok(true)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::transcript::Transcript;

    fn snapshot_of(senders: &[&str]) -> TranscriptSnapshot {
        let mut t = Transcript::new();
        for s in senders {
            t.append(Message::new(s, "..."));
        }
        t.snapshot()
    }

    #[test]
    fn last_sender_matches_only_tail() {
        let guard = last_sender_is("admin");
        assert!(guard(&snapshot_of(&["user", "admin"])).unwrap());
        assert!(!guard(&snapshot_of(&["admin", "coder"])).unwrap());
        assert!(!guard(&snapshot_of(&[])).unwrap());
    }

    #[test]
    fn has_spoken_scans_whole_transcript() {
        let guard = has_spoken("coder");
        assert!(guard(&snapshot_of(&["admin", "coder", "admin"])).unwrap());
        assert!(!guard(&snapshot_of(&["admin", "user"])).unwrap());
    }

    #[test]
    fn all_of_requires_every_guard() {
        let guard = all_of(vec![last_sender_is("admin"), has_spoken("coder")]);
        assert!(guard(&snapshot_of(&["coder", "admin"])).unwrap());
        assert!(!guard(&snapshot_of(&["admin", "coder"])).unwrap());
        assert!(!guard(&snapshot_of(&["user", "admin"])).unwrap());
    }

    #[test]
    fn all_of_propagates_inner_errors() {
        let failing: Guard = Arc::new(|_| Err(GuardError::msg("boom")));
        let guard = all_of(vec![Arc::new(|_| Ok(true)), failing]);
        assert!(guard(&snapshot_of(&["admin"])).is_err());
    }

    #[test]
    fn guards_are_pure_across_repeated_evaluation() {
        let guard = last_sender_is("admin");
        let snap = snapshot_of(&["user", "admin"]);
        let first = guard(&snap).unwrap();
        let second = guard(&snap).unwrap();
        assert_eq!(first, second);
    }
}
