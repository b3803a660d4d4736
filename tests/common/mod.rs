#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use colloquy::agents::{Agent, AgentContext, AgentError};
use colloquy::exec::{CodeBlock, CodeExecutor, ExecError, ExecOutcome};
use colloquy::message::Message;
use colloquy::transcript::{Transcript, TranscriptSnapshot};

/// Builds a transcript from (sender, content) pairs.
pub fn transcript_of(entries: &[(&str, &str)]) -> Transcript {
    let mut transcript = Transcript::new();
    for (sender, content) in entries {
        transcript.append(Message::new(*sender, content));
    }
    transcript
}

pub fn snapshot_of(senders: &[&str]) -> TranscriptSnapshot {
    let mut transcript = Transcript::new();
    for sender in senders {
        transcript.append(Message::new(*sender, "..."));
    }
    transcript.snapshot()
}

/// Agent that replays canned replies, repeating the last one when exhausted.
pub struct EchoAgent {
    name: String,
    replies: Mutex<VecDeque<String>>,
    last: Mutex<Option<String>>,
}

impl EchoAgent {
    pub fn new<I, S>(name: &str, replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            name: name.to_string(),
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            last: Mutex::new(None),
        })
    }
}

#[async_trait]
impl Agent for EchoAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_reply(
        &self,
        _transcript: TranscriptSnapshot,
        _ctx: AgentContext,
    ) -> Result<Message, AgentError> {
        let next = self.replies.lock().unwrap().pop_front();
        let content = match next {
            Some(reply) => {
                *self.last.lock().unwrap() = Some(reply.clone());
                reply
            }
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| "ok".to_string()),
        };
        Ok(Message::new(&self.name, &content))
    }
}

/// Agent that fails every turn.
pub struct FailingAgent {
    name: String,
}

impl FailingAgent {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
        })
    }
}

#[async_trait]
impl Agent for FailingAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_reply(
        &self,
        _transcript: TranscriptSnapshot,
        _ctx: AgentContext,
    ) -> Result<Message, AgentError> {
        Err(AgentError::Generation {
            agent: self.name.clone(),
            message: "simulated failure".to_string(),
        })
    }
}

/// Executor that never touches a real process.
pub struct StaticExecutor {
    pub stdout: String,
}

impl StaticExecutor {
    pub fn new(stdout: &str) -> Arc<Self> {
        Arc::new(Self {
            stdout: stdout.to_string(),
        })
    }
}

#[async_trait]
impl CodeExecutor for StaticExecutor {
    async fn execute(&self, _block: &CodeBlock) -> Result<ExecOutcome, ExecError> {
        Ok(ExecOutcome {
            stdout: self.stdout.clone(),
            stderr: String::new(),
            exit_status: 0,
        })
    }
}
