//! # Colloquy: Turn-Routed Multi-Agent Group Chat
//!
//! Colloquy drives a group conversation between named participants over a
//! fixed workflow graph. Each directed edge in the graph may carry a guard
//! predicate over the transcript so far; after every accepted message the
//! [`TurnRouter`](router::TurnRouter) scans the edges in declaration order
//! and reports which participants are eligible to speak next.
//!
//! ## Core Concepts
//!
//! - **Participants**: named actors (LLM-backed agents, a code runner, a
//!   human proxy) identified only by their unique name
//! - **Transcript**: the append-only ordered message history of one run
//! - **Workflow Graph**: directed, optionally guarded edges between
//!   participants; declaration order is routing priority
//! - **Turn Router**: computes eligible next speakers from the transcript
//! - **Chat Driver**: the sequential loop that picks a speaker, collects a
//!   reply, and appends it until the conversation terminates
//!
//! ## Quick Start
//!
//! ```
//! use colloquy::graphs::{GraphBuilder, guards};
//! use colloquy::message::Message;
//! use colloquy::router::TurnRouter;
//! use colloquy::transcript::Transcript;
//!
//! let graph = GraphBuilder::new()
//!     .add_participant("admin")
//!     .add_participant("coder")
//!     .add_guarded_edge("admin", "coder", guards::last_sender_is("admin"))
//!     .add_edge("coder", "admin")
//!     .build()
//!     .unwrap();
//!
//! let router = TurnRouter::new(graph);
//!
//! let mut transcript = Transcript::new();
//! transcript.append(Message::new("admin", "coder, please write the program"));
//!
//! let targets = router.eligible_targets("admin", &transcript.snapshot());
//! assert_eq!(targets, vec!["coder".to_string()]);
//! ```
//!
//! ## Module Guide
//!
//! - [`message`] - Message record and construction utilities
//! - [`transcript`] - Append-only transcript with immutable snapshots
//! - [`graphs`] - Workflow graph, builder, and guard predicates
//! - [`router`] - Eligible-next-speaker computation
//! - [`agents`] - The `Agent` trait and the built-in agent kinds
//! - [`clients`] - Chat model backends (scripted, OpenAI-compatible)
//! - [`exec`] - Fenced code block extraction and process execution
//! - [`driver`] - The sequential conversation loop and its configuration
//! - [`event_bus`] - Flume-backed event fan-out to pluggable sinks
//! - [`fixtures`] - Seed file loading for the bundled scenario
//! - [`scenario`] - The PL/SQL conversion group-chat wiring

pub mod agents;
pub mod clients;
pub mod driver;
pub mod event_bus;
pub mod exec;
pub mod fixtures;
pub mod graphs;
pub mod message;
pub mod router;
pub mod scenario;
pub mod telemetry;
pub mod transcript;
