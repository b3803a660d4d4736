//! Turn routing: deciding who may speak next.
//!
//! The router is a pure function of the graph and a transcript snapshot. It
//! never mutates anything and never picks a speaker itself; it reports the
//! ordered eligible set and leaves selection policy to the driver.

use tracing::{instrument, warn};

use crate::graphs::WorkflowGraph;
use crate::transcript::TranscriptSnapshot;

/// Evaluates edge guards to produce the eligible next speakers.
///
/// Eligibility is computed by scanning edges whose source is the current
/// speaker, in declaration order. Unguarded edges always match; guarded
/// edges match when the guard returns `Ok(true)`. A guard error is logged
/// and counts as a non-match.
///
/// # Examples
///
/// ```
/// use colloquy::graphs::{GraphBuilder, guards};
/// use colloquy::message::Message;
/// use colloquy::router::TurnRouter;
/// use colloquy::transcript::Transcript;
///
/// let graph = GraphBuilder::new()
///     .add_participant("admin")
///     .add_participant("coder")
///     .add_guarded_edge("admin", "coder", guards::last_sender_is("admin"))
///     .add_edge("coder", "admin")
///     .build()
///     .unwrap();
/// let router = TurnRouter::new(graph);
///
/// let mut transcript = Transcript::new();
/// transcript.append(Message::new("admin", "coder, your turn"));
/// let targets = router.eligible_targets("admin", &transcript.snapshot());
/// assert_eq!(targets, vec!["coder".to_string()]);
/// ```
#[derive(Clone, Debug)]
pub struct TurnRouter {
    graph: WorkflowGraph,
}

impl TurnRouter {
    #[must_use]
    pub fn new(graph: WorkflowGraph) -> Self {
        Self { graph }
    }

    /// The graph this router consults.
    #[must_use]
    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    /// Computes the eligible next speakers after `current_speaker`.
    ///
    /// Returns edge targets in edge declaration order, without deduplication.
    /// An unknown speaker (no outgoing edges) yields an empty set; what to do
    /// about an empty set is the caller's policy decision.
    #[instrument(skip(self, transcript), fields(speaker = current_speaker, version = transcript.version()))]
    #[must_use]
    pub fn eligible_targets(
        &self,
        current_speaker: &str,
        transcript: &TranscriptSnapshot,
    ) -> Vec<String> {
        let mut targets = Vec::new();
        for edge in self.graph.edges_from(current_speaker) {
            match edge.guard() {
                None => targets.push(edge.to().to_string()),
                Some(guard) => match guard(transcript) {
                    Ok(true) => targets.push(edge.to().to_string()),
                    Ok(false) => {}
                    Err(err) => {
                        warn!(
                            from = edge.from(),
                            to = edge.to(),
                            error = %err,
                            "guard failed; treating edge as non-matching"
                        );
                    }
                },
            }
        }
        targets
    }
}
