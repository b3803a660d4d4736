//! Stand-in for the human user.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::instrument;

use crate::message::Message;
use crate::transcript::TranscriptSnapshot;

use super::{Agent, AgentContext, AgentError};

/// Whether the user proxy actually asks a human.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HumanInputMode {
    /// Always answer with the configured default reply. Suits unattended
    /// runs, where the default reply is typically the termination signal.
    #[default]
    Never,
    /// Prompt on stdin each turn; an empty line falls back to the default
    /// reply.
    Always,
}

/// Agent speaking on the human user's behalf.
pub struct UserProxyAgent {
    name: String,
    default_reply: String,
    mode: HumanInputMode,
}

impl UserProxyAgent {
    #[must_use]
    pub fn new(name: impl Into<String>, default_reply: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_reply: default_reply.into(),
            mode: HumanInputMode::Never,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: HumanInputMode) -> Self {
        self.mode = mode;
        self
    }

    async fn read_line(&self) -> Result<String, AgentError> {
        let mut line = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        reader.read_line(&mut line).await?;
        Ok(line.trim().to_string())
    }
}

#[async_trait]
impl Agent for UserProxyAgent {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, _transcript, ctx), fields(agent = %self.name, mode = ?self.mode))]
    async fn generate_reply(
        &self,
        _transcript: TranscriptSnapshot,
        ctx: AgentContext,
    ) -> Result<Message, AgentError> {
        let content = match self.mode {
            HumanInputMode::Never => self.default_reply.clone(),
            HumanInputMode::Always => {
                ctx.emit("waiting for human input")?;
                let line = self.read_line().await?;
                if line.is_empty() {
                    self.default_reply.clone()
                } else {
                    line
                }
            }
        };
        Ok(Message::new(&self.name, &content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::EventBus;
    use crate::transcript::Transcript;

    #[tokio::test]
    async fn never_mode_returns_default_reply() {
        let agent = UserProxyAgent::new("user", "TERMINATE");
        let bus = EventBus::default();
        let ctx = AgentContext {
            agent_id: "user".into(),
            round: 5,
            event_sender: bus.get_sender(),
        };

        let reply = agent
            .generate_reply(Transcript::new().snapshot(), ctx)
            .await
            .unwrap();
        assert_eq!(reply.sender, "user");
        assert_eq!(reply.content, "TERMINATE");
    }
}
