//! Conversation participants.
//!
//! An [`Agent`] produces exactly one reply per granted turn, given an
//! immutable transcript snapshot. Agents never touch the live transcript and
//! never talk to each other directly; all coordination flows through the
//! driver.

mod assistant;
mod code_runner;
mod user_proxy;

pub use assistant::AssistantAgent;
pub use code_runner::CodeRunnerAgent;
pub use user_proxy::{HumanInputMode, UserProxyAgent};

use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;

use crate::clients::ClientError;
use crate::event_bus::Event;
use crate::exec::ExecError;
use crate::message::Message;
use crate::transcript::TranscriptSnapshot;

/// A participant that can hold a turn in the conversation.
#[async_trait]
pub trait Agent: Send + Sync {
    /// The participant name this agent answers to. Must match a graph
    /// participant exactly.
    fn name(&self) -> &str;

    /// Produces this agent's reply for the current turn.
    ///
    /// # Errors
    ///
    /// Errors are retryable from the driver's point of view; only after the
    /// retry budget is exhausted does the driver fall back to a synthetic
    /// failure message.
    async fn generate_reply(
        &self,
        transcript: TranscriptSnapshot,
        ctx: AgentContext,
    ) -> Result<Message, AgentError>;
}

/// Per-turn context handed to an agent.
///
/// Carries the agent's identity, the current round number, and a handle for
/// emitting diagnostic events.
#[derive(Clone, Debug)]
pub struct AgentContext {
    pub agent_id: String,
    pub round: u64,
    pub event_sender: flume::Sender<Event>,
}

impl AgentContext {
    /// Emits a diagnostic event scoped to this agent.
    ///
    /// # Errors
    ///
    /// Fails only when the bus receiver has been dropped.
    pub fn emit(&self, message: impl Into<String>) -> Result<(), AgentError> {
        self.event_sender
            .send(Event::diagnostic(self.agent_id.clone(), message))
            .map_err(|_| AgentError::EventBus {
                agent: self.agent_id.clone(),
            })
    }
}

/// Static persona configuration shared by model-backed agents.
#[derive(Clone, Debug)]
pub struct AgentProfile {
    pub name: String,
    pub system_prompt: String,
    pub temperature: f32,
}

impl AgentProfile {
    #[must_use]
    pub fn new(name: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system_prompt: system_prompt.into(),
            temperature: 0.0,
        }
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Errors raised while generating a reply.
#[derive(Debug, Error, Diagnostic)]
pub enum AgentError {
    /// The agent could not produce a reply for a domain reason.
    #[error("agent '{agent}' failed to generate a reply: {message}")]
    #[diagnostic(code(colloquy::agents::generation))]
    Generation { agent: String, message: String },

    /// The chat backend failed.
    #[error("chat backend failure")]
    #[diagnostic(code(colloquy::agents::client))]
    Client(#[from] ClientError),

    /// Code execution failed before producing an outcome.
    #[error("code execution failure")]
    #[diagnostic(code(colloquy::agents::exec))]
    Exec(#[from] ExecError),

    /// Reading human input failed.
    #[error("failed to read human input")]
    #[diagnostic(code(colloquy::agents::stdin))]
    Stdin(#[from] std::io::Error),

    /// The event bus receiver is gone.
    #[error("agent '{agent}' could not emit an event")]
    #[diagnostic(code(colloquy::agents::event_bus))]
    EventBus { agent: String },
}
