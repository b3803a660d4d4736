//! GraphBuilder implementation for constructing workflow graphs.

use miette::Diagnostic;
use rustc_hash::FxHashSet;
use thiserror::Error;

use super::WorkflowGraph;
use super::edges::Edge;
use super::guards::Guard;

/// Builder for constructing workflow graphs with a fluent API.
///
/// Participants are declared by name; edges reference declared names only.
/// Edge declaration order is significant: it is the priority order used by
/// the router when several edges from the same source pass at once.
///
/// # Examples
///
/// ```
/// use colloquy::graphs::{GraphBuilder, guards};
///
/// let graph = GraphBuilder::new()
///     .add_participant("admin")
///     .add_participant("coder")
///     .add_participant("reviewer")
///     .add_guarded_edge("admin", "coder", guards::last_sender_is("admin"))
///     .add_edge("coder", "reviewer")
///     .add_edge("reviewer", "admin")
///     .build()
///     .unwrap();
///
/// assert_eq!(graph.participants().len(), 3);
/// assert_eq!(graph.edges().len(), 3);
/// ```
#[derive(Default)]
pub struct GraphBuilder {
    participants: Vec<String>,
    edges: Vec<Edge>,
}

/// Errors detected while assembling a workflow graph.
///
/// These are configuration errors: fatal at construction time, before any
/// conversation starts.
#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    /// An edge references a participant name that was never declared.
    #[error("edge {from} -> {to} references undeclared participant '{name}'")]
    #[diagnostic(
        code(colloquy::graphs::unknown_participant),
        help("Declare every participant with add_participant before adding edges.")
    )]
    UnknownParticipant {
        name: String,
        from: String,
        to: String,
    },
}

impl GraphBuilder {
    /// Creates a new, empty graph builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a participant by name.
    ///
    /// Duplicate declarations are ignored with a warning; participant names
    /// must be unique within a graph.
    #[must_use]
    pub fn add_participant(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if self.participants.contains(&name) {
            tracing::warn!(%name, "ignoring duplicate participant declaration");
            return self;
        }
        self.participants.push(name);
        self
    }

    /// Adds an unguarded edge: `to` is always eligible after `from` speaks.
    #[must_use]
    pub fn add_edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.edges.push(Edge::new(from, to));
        self
    }

    /// Adds an edge whose eligibility is decided by `guard` against the
    /// full transcript snapshot.
    #[must_use]
    pub fn add_guarded_edge(
        mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        guard: Guard,
    ) -> Self {
        self.edges.push(Edge::guarded(from, to, guard));
        self
    }

    /// Validates the configuration and produces an immutable graph.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownParticipant`] when any edge endpoint
    /// names a participant that was never declared.
    pub fn build(self) -> Result<WorkflowGraph, GraphError> {
        let index: FxHashSet<String> = self.participants.iter().cloned().collect();
        for edge in &self.edges {
            for endpoint in [edge.from(), edge.to()] {
                if !index.contains(endpoint) {
                    return Err(GraphError::UnknownParticipant {
                        name: endpoint.to_string(),
                        from: edge.from().to_string(),
                        to: edge.to().to_string(),
                    });
                }
            }
        }
        Ok(WorkflowGraph::from_parts(self.participants, index, self.edges))
    }
}
