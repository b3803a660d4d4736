//! Agent that executes code blocks authored by another participant.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::exec::{CodeExecutor, extract_code_blocks};
use crate::message::Message;
use crate::transcript::TranscriptSnapshot;

use super::{Agent, AgentContext, AgentError};

/// Runs the most recent code blocks from a designated source participant.
///
/// The runner deliberately ignores everything except the source
/// participant's latest message; intermediate chatter from other agents
/// never reaches the executor.
pub struct CodeRunnerAgent {
    name: String,
    source_participant: String,
    languages: Vec<String>,
    executor: Arc<dyn CodeExecutor>,
    default_reply: String,
}

impl CodeRunnerAgent {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        source_participant: impl Into<String>,
        executor: Arc<dyn CodeExecutor>,
    ) -> Self {
        Self {
            name: name.into(),
            source_participant: source_participant.into(),
            languages: Vec::new(),
            executor,
            default_reply: "No code available, coder, please write code".to_string(),
        }
    }

    /// Restricts execution to blocks tagged with one of `languages`
    /// (compared case-insensitively). Empty means run every block.
    #[must_use]
    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages
            .into_iter()
            .map(|l| l.into().to_lowercase())
            .collect();
        self
    }

    #[must_use]
    pub fn with_default_reply(mut self, reply: impl Into<String>) -> Self {
        self.default_reply = reply.into();
        self
    }

    fn accepts(&self, language: &str) -> bool {
        self.languages.is_empty() || self.languages.iter().any(|l| l == language)
    }
}

#[async_trait]
impl Agent for CodeRunnerAgent {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, transcript, ctx), fields(agent = %self.name, source = %self.source_participant))]
    async fn generate_reply(
        &self,
        transcript: TranscriptSnapshot,
        ctx: AgentContext,
    ) -> Result<Message, AgentError> {
        let Some(source) = transcript.last_from(&self.source_participant) else {
            return Ok(Message::new(&self.name, &self.default_reply));
        };

        let blocks: Vec<_> = extract_code_blocks(&source.content)
            .into_iter()
            .filter(|b| self.accepts(&b.language))
            .collect();
        if blocks.is_empty() {
            return Ok(Message::new(&self.name, &self.default_reply));
        }

        let mut sections = Vec::with_capacity(blocks.len());
        for block in &blocks {
            ctx.emit(format!("executing {} block", displayed_language(block)))?;
            let outcome = self.executor.execute(block).await?;
            sections.push(outcome.render());
        }
        Ok(Message::new(&self.name, &sections.join("\n\n")))
    }
}

fn displayed_language(block: &crate::exec::CodeBlock) -> &str {
    if block.language.is_empty() {
        "untagged"
    } else {
        &block.language
    }
}
