//! HTTP client for OpenAI-compatible chat completion endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ChatModel, ChatRequest, ClientError};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Chat model backed by an OpenAI-compatible `/chat/completions` endpoint.
///
/// Transcript messages from the requesting agent itself are sent with the
/// `assistant` role; everything else becomes a `user` message prefixed with
/// the sender's name, so the model can follow who said what.
pub struct OpenAiModel {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<WireMessage>,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiModel {
    #[must_use]
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Builds a client from `OPENAI_API_KEY`, `OPENAI_MODEL`, and
    /// `OPENAI_BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Endpoint`] when `OPENAI_API_KEY` is unset.
    pub fn from_env() -> Result<Self, ClientError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ClientError::Endpoint("OPENAI_API_KEY is not set".into()))?;
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            model,
            api_key,
        })
    }

    /// Overrides the endpoint base URL, for compatible local servers.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn wire_messages(request: &ChatRequest) -> Vec<WireMessage> {
        let mut messages = vec![WireMessage {
            role: "system",
            content: request.system_prompt.clone(),
        }];
        for msg in &request.transcript {
            if msg.is_from(&request.agent_name) {
                messages.push(WireMessage {
                    role: "assistant",
                    content: msg.content.clone(),
                });
            } else {
                messages.push(WireMessage {
                    role: "user",
                    content: format!("{}: {}", msg.sender, msg.content),
                });
            }
        }
        messages
    }
}

#[async_trait]
impl ChatModel for OpenAiModel {
    async fn complete(&self, request: ChatRequest) -> Result<String, ClientError> {
        let body = CompletionRequest {
            model: &self.model,
            temperature: request.temperature,
            messages: Self::wire_messages(&request),
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(ClientError::Endpoint(format!("{status}: {detail}")));
        }

        let parsed: CompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ClientError::MalformedResponse("response carried no choices".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::transcript::Transcript;

    #[test]
    fn wire_mapping_distinguishes_self_from_others() {
        let mut transcript = Transcript::new();
        transcript.append(Message::new("user", "convert this"));
        transcript.append(Message::new("coder", "draft one"));

        let request = ChatRequest {
            agent_name: "coder".into(),
            system_prompt: "you write code".into(),
            temperature: 0.0,
            transcript: transcript.snapshot(),
        };

        let wire = OpenAiModel::wire_messages(&request);
        assert_eq!(wire.len(), 3);
        assert_eq!(wire[0].role, "system");
        assert_eq!(wire[1].role, "user");
        assert_eq!(wire[1].content, "user: convert this");
        assert_eq!(wire[2].role, "assistant");
        assert_eq!(wire[2].content, "draft one");
    }
}
