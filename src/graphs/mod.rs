//! Workflow graph definition: participants, guarded edges, and the builder.
//!
//! A [`WorkflowGraph`] is constructed once before a conversation run and is
//! immutable for the run's duration. It holds the declared participant set
//! and an ordered edge list; order encodes routing priority. Graphs are not
//! required to be acyclic; conversations legitimately loop.

mod builder;
mod edges;
pub mod guards;

pub use builder::{GraphBuilder, GraphError};
pub use edges::Edge;
pub use guards::{Guard, GuardError};

use rustc_hash::FxHashSet;

/// An immutable participant topology with guarded transition edges.
///
/// Built through [`GraphBuilder`]; every edge endpoint is guaranteed to name
/// a declared participant.
#[derive(Clone, Debug)]
pub struct WorkflowGraph {
    participants: Vec<String>,
    index: FxHashSet<String>,
    edges: Vec<Edge>,
}

impl WorkflowGraph {
    pub(crate) fn from_parts(
        participants: Vec<String>,
        index: FxHashSet<String>,
        edges: Vec<Edge>,
    ) -> Self {
        Self {
            participants,
            index,
            edges,
        }
    }

    /// Declared participant names, in declaration order.
    #[must_use]
    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    /// All edges, in declaration (priority) order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns true if `name` is a declared participant.
    #[must_use]
    pub fn is_participant(&self, name: &str) -> bool {
        self.index.contains(name)
    }

    /// Edges originating at `from`, preserving declaration order.
    pub fn edges_from<'a>(&'a self, from: &'a str) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().filter(move |e| e.from() == from)
    }
}
