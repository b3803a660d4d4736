//! Deterministic scripted chat model for tests and offline demos.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ChatModel, ChatRequest, ClientError};

/// Serves canned replies in order.
///
/// When the queue runs dry the model repeats its most recent reply rather
/// than failing, so a long run against a short script stays quiet until the
/// round cap ends it. A model constructed with no replies at all errors on
/// first use.
///
/// # Examples
///
/// ```
/// use colloquy::clients::ScriptedModel;
///
/// let model = ScriptedModel::new(["first", "second"]);
/// ```
pub struct ScriptedModel {
    state: Mutex<ScriptState>,
}

struct ScriptState {
    queue: VecDeque<String>,
    last: Option<String>,
    served: usize,
}

impl ScriptedModel {
    #[must_use]
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            state: Mutex::new(ScriptState {
                queue: replies.into_iter().map(Into::into).collect(),
                last: None,
                served: 0,
            }),
        }
    }

    /// Number of replies served so far, including repeats.
    #[must_use]
    pub fn served(&self) -> usize {
        self.state.lock().map(|s| s.served).unwrap_or(0)
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, _request: ChatRequest) -> Result<String, ClientError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| ClientError::Endpoint("scripted model mutex poisoned".into()))?;
        let reply = match state.queue.pop_front() {
            Some(next) => {
                state.last = Some(next.clone());
                next
            }
            None => state
                .last
                .clone()
                .ok_or(ClientError::ScriptExhausted { served: state.served })?,
        };
        state.served += 1;
        Ok(reply)
    }
}
