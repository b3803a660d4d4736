//! Directed, optionally guarded edges between participants.

use std::fmt;

use super::guards::Guard;

/// A directed edge from one participant to another.
///
/// An edge without a guard is always eligible when its `from` participant
/// just spoke. Parallel edges (several edges sharing a `from`) encode
/// first-match-wins routing: the graph preserves declaration order and the
/// router returns passing targets in that order.
///
/// # Examples
///
/// ```
/// use colloquy::graphs::Edge;
/// use colloquy::graphs::guards::last_sender_is;
///
/// let unconditional = Edge::new("coder", "reviewer");
/// let guarded = Edge::guarded("admin", "coder", last_sender_is("admin"));
/// assert!(unconditional.guard().is_none());
/// assert!(guarded.guard().is_some());
/// ```
#[derive(Clone)]
pub struct Edge {
    from: String,
    to: String,
    guard: Option<Guard>,
}

impl Edge {
    /// Creates an unguarded (always eligible) edge.
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            guard: None,
        }
    }

    /// Creates an edge guarded by a transcript predicate.
    #[must_use]
    pub fn guarded(from: impl Into<String>, to: impl Into<String>, guard: Guard) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            guard: Some(guard),
        }
    }

    /// Source participant name.
    #[must_use]
    pub fn from(&self) -> &str {
        &self.from
    }

    /// Target participant name.
    #[must_use]
    pub fn to(&self) -> &str {
        &self.to
    }

    /// The guard predicate, if any.
    #[must_use]
    pub fn guard(&self) -> Option<&Guard> {
        self.guard.as_ref()
    }
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Edge")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("guarded", &self.guard.is_some())
            .finish()
    }
}
