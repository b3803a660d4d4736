//! Sequential conversation driver.
//!
//! The driver owns the transcript and runs the turn loop: snapshot, route,
//! grant the turn, append the reply, check termination. Exactly one turn is
//! in flight at any time. Once a run starts it always produces a
//! [`RunReport`]; mid-run faults are downgraded to diagnostics or synthetic
//! messages rather than surfaced as errors.

use std::sync::Arc;
use std::time::Duration;

use miette::Diagnostic;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::agents::{Agent, AgentContext};
use crate::event_bus::Event;
use crate::message::Message;
use crate::router::TurnRouter;
use crate::transcript::Transcript;

/// Tunable run policy.
#[derive(Clone, Debug)]
pub struct DriverConfig {
    /// Hard cap on accepted messages, the seed included.
    pub max_rounds: u64,
    /// Retries granted to a failing turn before a synthetic failure message
    /// is injected.
    pub max_retries: u32,
    /// Wall-clock budget for a single turn; a timeout counts as a failed
    /// attempt.
    pub turn_timeout: Duration,
    /// Substring that ends the run when it appears in a message from the
    /// terminal sender.
    pub termination_signal: String,
    /// The participant whose messages are checked for the signal.
    pub terminal_sender: String,
    /// Participant granted the turn when no edge matches; `None` ends the
    /// run instead.
    pub fallback_speaker: Option<String>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_rounds: 30,
            max_retries: 2,
            turn_timeout: Duration::from_secs(120),
            termination_signal: "TERMINATE".to_string(),
            terminal_sender: "user".to_string(),
            fallback_speaker: None,
        }
    }
}

impl DriverConfig {
    #[must_use]
    pub fn with_max_rounds(mut self, max_rounds: u64) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_turn_timeout(mut self, turn_timeout: Duration) -> Self {
        self.turn_timeout = turn_timeout;
        self
    }

    #[must_use]
    pub fn with_termination_signal(mut self, signal: impl Into<String>) -> Self {
        self.termination_signal = signal.into();
        self
    }

    #[must_use]
    pub fn with_terminal_sender(mut self, sender: impl Into<String>) -> Self {
        self.terminal_sender = sender.into();
        self
    }

    #[must_use]
    pub fn with_fallback_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.fallback_speaker = Some(speaker.into());
        self
    }
}

/// Why a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The terminal sender uttered the termination signal.
    Terminated,
    /// The transcript reached the round cap.
    MaxRounds,
    /// No edge matched and no fallback speaker was configured.
    NoEligibleSpeaker,
    /// Cancellation was requested.
    Cancelled,
}

/// Final state of a completed run.
#[derive(Debug)]
pub struct RunReport {
    pub transcript: Transcript,
    pub rounds: u64,
    pub outcome: RunOutcome,
}

/// Configuration errors detected before any turn is taken.
#[derive(Debug, Error, Diagnostic)]
pub enum DriverError {
    /// A graph participant has no registered agent.
    #[error("participant '{name}' has no registered agent")]
    #[diagnostic(
        code(colloquy::driver::missing_agent),
        help("Register one agent per graph participant.")
    )]
    MissingAgent { name: String },

    /// Two agents claim the same participant name.
    #[error("duplicate agent registered for '{name}'")]
    #[diagnostic(code(colloquy::driver::duplicate_agent))]
    DuplicateAgent { name: String },

    /// The configured fallback speaker is not a graph participant.
    #[error("fallback speaker '{name}' is not a graph participant")]
    #[diagnostic(code(colloquy::driver::unknown_fallback))]
    UnknownFallback { name: String },
}

/// Drives one conversation from seed message to outcome.
pub struct ChatDriver {
    router: TurnRouter,
    agents: FxHashMap<String, Arc<dyn Agent>>,
    config: DriverConfig,
    events: flume::Sender<Event>,
}

impl std::fmt::Debug for ChatDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatDriver")
            .field("router", &self.router)
            .field("agents", &self.agents.keys().collect::<Vec<_>>())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ChatDriver {
    /// Builds a driver, validating that every graph participant has exactly
    /// one agent and the fallback speaker (if any) is a participant.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverError`] describing the first configuration problem
    /// found.
    pub fn new(
        router: TurnRouter,
        agents: Vec<Arc<dyn Agent>>,
        config: DriverConfig,
        events: flume::Sender<Event>,
    ) -> Result<Self, DriverError> {
        let mut by_name: FxHashMap<String, Arc<dyn Agent>> = FxHashMap::default();
        for agent in agents {
            let name = agent.name().to_string();
            if by_name.insert(name.clone(), agent).is_some() {
                return Err(DriverError::DuplicateAgent { name });
            }
        }
        for participant in router.graph().participants() {
            if !by_name.contains_key(participant) {
                return Err(DriverError::MissingAgent {
                    name: participant.clone(),
                });
            }
        }
        if let Some(fallback) = &config.fallback_speaker {
            if !router.graph().is_participant(fallback) {
                return Err(DriverError::UnknownFallback {
                    name: fallback.clone(),
                });
            }
        }
        Ok(Self {
            router,
            agents: by_name,
            config,
            events,
        })
    }

    /// Runs to completion without external cancellation.
    pub async fn run(&self, initial: Message) -> RunReport {
        self.run_with_cancel(initial, None).await
    }

    /// Runs to completion, checking `cancel` between turns.
    ///
    /// When the watch value flips to `true` the run stops after the turn in
    /// flight, keeping the transcript accepted so far.
    #[instrument(skip_all, fields(seed_sender = %initial.sender))]
    pub async fn run_with_cancel(
        &self,
        initial: Message,
        cancel: Option<watch::Receiver<bool>>,
    ) -> RunReport {
        let mut transcript = Transcript::new();
        let mut round: u64 = 1;
        let mut speaker = initial.sender.clone();

        self.emit_turn(&initial, round);
        transcript.append(initial);

        let outcome = loop {
            if cancel.as_ref().is_some_and(|c| *c.borrow()) {
                info!(round, "run cancelled");
                break RunOutcome::Cancelled;
            }
            if round >= self.config.max_rounds {
                info!(round, "round cap reached");
                break RunOutcome::MaxRounds;
            }

            let snapshot = transcript.snapshot();
            let targets = self.router.eligible_targets(&speaker, &snapshot);
            let Some(next) = targets
                .first()
                .cloned()
                .or_else(|| self.config.fallback_speaker.clone())
            else {
                warn!(%speaker, "no eligible speaker and no fallback");
                break RunOutcome::NoEligibleSpeaker;
            };

            let reply = self.take_turn(&next, &transcript, round + 1).await;
            round += 1;
            self.emit_turn(&reply, round);

            let terminated = reply.is_from(&self.config.terminal_sender)
                && reply.content.contains(&self.config.termination_signal);
            transcript.append(reply);
            if terminated {
                info!(round, "termination signal observed");
                break RunOutcome::Terminated;
            }

            speaker = next;
        };

        RunReport {
            transcript,
            rounds: round,
            outcome,
        }
    }

    /// Grants the turn to `name`, retrying per the configured budget.
    ///
    /// After the budget is exhausted a synthetic failure message from the
    /// system sender is returned; routing continues from the participant who
    /// held the turn, not from the system sender.
    async fn take_turn(&self, name: &str, transcript: &Transcript, round: u64) -> Message {
        let agent = self
            .agents
            .get(name)
            .expect("agents validated at construction");
        let attempts = 1 + self.config.max_retries;

        let mut last_error = String::new();
        for attempt in 1..=attempts {
            let ctx = AgentContext {
                agent_id: name.to_string(),
                round,
                event_sender: self.events.clone(),
            };
            let turn = agent.generate_reply(transcript.snapshot(), ctx);
            match tokio::time::timeout(self.config.turn_timeout, turn).await {
                Ok(Ok(reply)) => return reply,
                Ok(Err(err)) => {
                    warn!(%name, attempt, error = %err, "turn failed");
                    last_error = err.to_string();
                }
                Err(_) => {
                    warn!(%name, attempt, "turn timed out");
                    last_error = format!(
                        "timed out after {}s",
                        self.config.turn_timeout.as_secs()
                    );
                }
            }
            self.emit_diagnostic(format!(
                "turn attempt {attempt}/{attempts} for '{name}' failed: {last_error}"
            ));
        }

        Message::system(&format!(
            "reply generation failed for '{name}': {last_error}"
        ))
    }

    fn emit_turn(&self, message: &Message, round: u64) {
        let event = Event::turn(message.sender.clone(), round, message.content.clone());
        if self.events.send(event).is_err() {
            warn!("event bus receiver dropped; turn event lost");
        }
    }

    fn emit_diagnostic(&self, text: String) {
        if self.events.send(Event::diagnostic("driver", text)).is_err() {
            warn!("event bus receiver dropped; diagnostic lost");
        }
    }
}
