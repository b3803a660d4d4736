mod common;
use common::*;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use colloquy::agents::Agent;
use colloquy::driver::{ChatDriver, DriverConfig, DriverError, RunOutcome};
use colloquy::event_bus::{Event, EventBus, MemorySink};
use colloquy::graphs::{GraphBuilder, WorkflowGraph, guards};
use colloquy::message::Message;
use colloquy::router::TurnRouter;

fn ping_pong_graph() -> WorkflowGraph {
    GraphBuilder::new()
        .add_participant("user")
        .add_participant("admin")
        .add_edge("user", "admin")
        .add_edge("admin", "user")
        .build()
        .unwrap()
}

fn driver_with(
    graph: WorkflowGraph,
    agents: Vec<Arc<dyn Agent>>,
    config: DriverConfig,
) -> (ChatDriver, EventBus, MemorySink) {
    let sink = MemorySink::new();
    let bus = EventBus::with_sink(sink.clone());
    bus.listen_for_events();
    let driver = ChatDriver::new(TurnRouter::new(graph), agents, config, bus.get_sender())
        .expect("valid driver configuration");
    (driver, bus, sink)
}

#[tokio::test]
async fn run_terminates_on_signal_from_terminal_sender() {
    let agents: Vec<Arc<dyn Agent>> = vec![
        EchoAgent::new("admin", ["summary: all done"]),
        EchoAgent::new("user", ["TERMINATE"]),
    ];
    let (driver, bus, sink) = driver_with(ping_pong_graph(), agents, DriverConfig::default());

    let report = driver.run(Message::new("user", "please do the thing")).await;

    assert_eq!(report.outcome, RunOutcome::Terminated);
    assert_eq!(report.transcript.len(), 3);
    assert_eq!(report.rounds, 3);
    let senders: Vec<&str> = report
        .transcript
        .messages()
        .iter()
        .map(|m| m.sender.as_str())
        .collect();
    assert_eq!(senders, ["user", "admin", "user"]);

    tokio::time::sleep(Duration::from_millis(50)).await;
    bus.stop_listener().await;
    let turns = sink
        .snapshot()
        .into_iter()
        .filter(|e| matches!(e, Event::Turn(_)))
        .count();
    assert_eq!(turns, 3);
}

#[tokio::test]
async fn run_stops_at_round_cap() {
    let agents: Vec<Arc<dyn Agent>> = vec![
        EchoAgent::new("admin", ["more work"]),
        EchoAgent::new("user", ["keep going"]),
    ];
    let config = DriverConfig::default().with_max_rounds(6);
    let (driver, bus, _sink) = driver_with(ping_pong_graph(), agents, config);

    let report = driver.run(Message::new("user", "start")).await;

    assert_eq!(report.outcome, RunOutcome::MaxRounds);
    assert_eq!(report.transcript.len(), 6);
    assert_eq!(report.rounds, 6);
    bus.stop_listener().await;
}

#[tokio::test]
async fn exhausted_retries_inject_system_message_and_run_continues() {
    let agents: Vec<Arc<dyn Agent>> = vec![
        FailingAgent::new("admin"),
        EchoAgent::new("user", ["TERMINATE"]),
    ];
    let config = DriverConfig::default().with_max_retries(1);
    let (driver, bus, sink) = driver_with(ping_pong_graph(), agents, config);

    let report = driver.run(Message::new("user", "start")).await;

    // Seed, synthetic failure for admin, then user terminates.
    assert_eq!(report.outcome, RunOutcome::Terminated);
    let messages = report.transcript.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].sender, Message::SYSTEM);
    assert!(messages[1]
        .content
        .contains("reply generation failed for 'admin'"));
    assert_eq!(messages[2].content, "TERMINATE");

    tokio::time::sleep(Duration::from_millis(50)).await;
    bus.stop_listener().await;
    let retry_diagnostics = sink
        .snapshot()
        .into_iter()
        .filter(|e| matches!(e, Event::Diagnostic(d) if d.message.contains("attempt")))
        .count();
    assert_eq!(retry_diagnostics, 2);
}

#[tokio::test]
async fn turn_timeout_counts_as_failed_attempt() {
    struct SlowAgent;

    #[async_trait::async_trait]
    impl Agent for SlowAgent {
        fn name(&self) -> &str {
            "admin"
        }

        async fn generate_reply(
            &self,
            _transcript: colloquy::transcript::TranscriptSnapshot,
            _ctx: colloquy::agents::AgentContext,
        ) -> Result<Message, colloquy::agents::AgentError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Message::new("admin", "too late"))
        }
    }

    let agents: Vec<Arc<dyn Agent>> = vec![
        Arc::new(SlowAgent),
        EchoAgent::new("user", ["TERMINATE"]),
    ];
    let config = DriverConfig::default()
        .with_max_retries(0)
        .with_turn_timeout(Duration::from_millis(50));
    let (driver, bus, _sink) = driver_with(ping_pong_graph(), agents, config);

    let report = driver.run(Message::new("user", "start")).await;

    let messages = report.transcript.messages();
    assert_eq!(messages[1].sender, Message::SYSTEM);
    assert!(messages[1].content.contains("timed out"));
    bus.stop_listener().await;
}

#[tokio::test]
async fn pre_cancelled_run_keeps_only_the_seed() {
    let agents: Vec<Arc<dyn Agent>> = vec![
        EchoAgent::new("admin", ["never spoken"]),
        EchoAgent::new("user", ["never spoken"]),
    ];
    let (driver, bus, _sink) = driver_with(ping_pong_graph(), agents, DriverConfig::default());

    let (tx, rx) = watch::channel(true);
    let report = driver
        .run_with_cancel(Message::new("user", "start"), Some(rx))
        .await;
    drop(tx);

    assert_eq!(report.outcome, RunOutcome::Cancelled);
    assert_eq!(report.transcript.len(), 1);
    bus.stop_listener().await;
}

#[tokio::test]
async fn dead_end_without_fallback_ends_the_run() {
    let graph = GraphBuilder::new()
        .add_participant("user")
        .add_participant("admin")
        .add_edge("user", "admin")
        .add_guarded_edge("admin", "user", guards::has_spoken("nobody"))
        .build()
        .unwrap();
    let agents: Vec<Arc<dyn Agent>> = vec![
        EchoAgent::new("admin", ["working on it"]),
        EchoAgent::new("user", ["TERMINATE"]),
    ];
    let (driver, bus, _sink) = driver_with(graph, agents, DriverConfig::default());

    let report = driver.run(Message::new("user", "start")).await;

    assert_eq!(report.outcome, RunOutcome::NoEligibleSpeaker);
    assert_eq!(report.transcript.len(), 2);
    bus.stop_listener().await;
}

#[tokio::test]
async fn dead_end_with_fallback_grants_the_fallback_speaker() {
    let graph = GraphBuilder::new()
        .add_participant("user")
        .add_participant("admin")
        .add_edge("user", "admin")
        .add_guarded_edge("admin", "user", guards::has_spoken("nobody"))
        .build()
        .unwrap();
    let agents: Vec<Arc<dyn Agent>> = vec![
        EchoAgent::new("admin", ["working on it"]),
        EchoAgent::new("user", ["TERMINATE"]),
    ];
    let config = DriverConfig::default().with_fallback_speaker("user");
    let (driver, bus, _sink) = driver_with(graph, agents, config);

    let report = driver.run(Message::new("user", "start")).await;

    assert_eq!(report.outcome, RunOutcome::Terminated);
    assert_eq!(report.transcript.len(), 3);
    assert_eq!(report.transcript.messages()[2].sender, "user");
    bus.stop_listener().await;
}

#[tokio::test]
async fn construction_rejects_missing_and_duplicate_agents() {
    let bus = EventBus::default();

    let only_user: Vec<Arc<dyn Agent>> = vec![EchoAgent::new("user", ["x"])];
    let missing = ChatDriver::new(
        TurnRouter::new(ping_pong_graph()),
        only_user,
        DriverConfig::default(),
        bus.get_sender(),
    );
    assert!(matches!(
        missing.unwrap_err(),
        DriverError::MissingAgent { name } if name == "admin"
    ));

    let two_admins: Vec<Arc<dyn Agent>> = vec![
        EchoAgent::new("user", ["x"]),
        EchoAgent::new("admin", ["x"]),
        EchoAgent::new("admin", ["y"]),
    ];
    let duplicate = ChatDriver::new(
        TurnRouter::new(ping_pong_graph()),
        two_admins,
        DriverConfig::default(),
        bus.get_sender(),
    );
    assert!(matches!(
        duplicate.unwrap_err(),
        DriverError::DuplicateAgent { name } if name == "admin"
    ));

    let complete: Vec<Arc<dyn Agent>> = vec![
        EchoAgent::new("user", ["x"]),
        EchoAgent::new("admin", ["x"]),
    ];
    let unknown_fallback = ChatDriver::new(
        TurnRouter::new(ping_pong_graph()),
        complete,
        DriverConfig::default().with_fallback_speaker("ghost"),
        bus.get_sender(),
    );
    assert!(matches!(
        unknown_fallback.unwrap_err(),
        DriverError::UnknownFallback { name } if name == "ghost"
    ));
}
