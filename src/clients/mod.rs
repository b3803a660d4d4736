//! Chat completion backends.
//!
//! Assistant agents delegate text generation to a [`ChatModel`]. The crate
//! ships a deterministic [`ScriptedModel`] for tests and offline runs; the
//! `openai` feature adds an HTTP-backed client for OpenAI-compatible
//! endpoints.

mod scripted;

#[cfg(feature = "openai")]
mod openai;

pub use scripted::ScriptedModel;

#[cfg(feature = "openai")]
pub use openai::OpenAiModel;

use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;

use crate::transcript::TranscriptSnapshot;

/// One completion request: the requesting agent's identity and persona plus
/// the full conversation so far.
#[derive(Clone, Debug)]
pub struct ChatRequest {
    pub agent_name: String,
    pub system_prompt: String,
    pub temperature: f32,
    pub transcript: TranscriptSnapshot,
}

/// A backend capable of producing a chat completion.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Produces the reply text for `request`.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] when the backend cannot produce text; the
    /// driver treats these as retryable.
    async fn complete(&self, request: ChatRequest) -> Result<String, ClientError>;
}

/// Errors from chat completion backends.
#[derive(Debug, Error, Diagnostic)]
pub enum ClientError {
    /// The endpoint rejected the request or returned a non-success status.
    #[error("completion endpoint error: {0}")]
    #[diagnostic(
        code(colloquy::clients::endpoint),
        help("Check the endpoint URL, model name, and API key.")
    )]
    Endpoint(String),

    /// The endpoint responded, but not with a usable completion.
    #[error("malformed completion response: {0}")]
    #[diagnostic(code(colloquy::clients::malformed_response))]
    MalformedResponse(String),

    /// A scripted model ran out of replies and has nothing to repeat.
    #[error("scripted model exhausted after serving {served} replies")]
    #[diagnostic(
        code(colloquy::clients::script_exhausted),
        help("Provide enough scripted replies for the run, or rely on last-reply repetition.")
    )]
    ScriptExhausted { served: usize },

    /// Transport-level failure talking to an HTTP endpoint.
    #[cfg(feature = "openai")]
    #[error("http transport error")]
    #[diagnostic(code(colloquy::clients::http))]
    Http(#[from] reqwest::Error),
}
