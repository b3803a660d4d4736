//! Model-backed assistant agent.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::clients::{ChatModel, ChatRequest};
use crate::message::Message;
use crate::transcript::TranscriptSnapshot;

use super::{Agent, AgentContext, AgentError, AgentProfile};

/// An agent whose replies come from a chat model, steered by a persona
/// system prompt.
pub struct AssistantAgent {
    profile: AgentProfile,
    model: Arc<dyn ChatModel>,
}

impl AssistantAgent {
    #[must_use]
    pub fn new(profile: AgentProfile, model: Arc<dyn ChatModel>) -> Self {
        Self { profile, model }
    }

    #[must_use]
    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }
}

#[async_trait]
impl Agent for AssistantAgent {
    fn name(&self) -> &str {
        &self.profile.name
    }

    #[instrument(skip(self, transcript, _ctx), fields(agent = %self.profile.name))]
    async fn generate_reply(
        &self,
        transcript: TranscriptSnapshot,
        _ctx: AgentContext,
    ) -> Result<Message, AgentError> {
        let request = ChatRequest {
            agent_name: self.profile.name.clone(),
            system_prompt: self.profile.system_prompt.clone(),
            temperature: self.profile.temperature,
            transcript,
        };
        let text = self.model.complete(request).await?;
        Ok(Message::new(&self.profile.name, &text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ScriptedModel;
    use crate::event_bus::EventBus;
    use crate::transcript::Transcript;

    #[tokio::test]
    async fn reply_carries_agent_name() {
        let model = Arc::new(ScriptedModel::new(["here is the plan"]));
        let agent = AssistantAgent::new(AgentProfile::new("admin", "you coordinate"), model);
        let bus = EventBus::default();
        let ctx = AgentContext {
            agent_id: "admin".into(),
            round: 1,
            event_sender: bus.get_sender(),
        };

        let reply = agent
            .generate_reply(Transcript::new().snapshot(), ctx)
            .await
            .unwrap();
        assert_eq!(reply.sender, "admin");
        assert_eq!(reply.content, "here is the plan");
    }
}
