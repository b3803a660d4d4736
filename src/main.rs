use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use colloquy::clients::{ChatModel, ScriptedModel};
use colloquy::driver::ChatDriver;
use colloquy::event_bus::EventBus;
use colloquy::exec::ProcessExecutor;
use colloquy::fixtures::ScenarioFixtures;
use colloquy::router::TurnRouter;
use colloquy::scenario;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let fixtures_dir =
        std::env::var("COLLOQUY_FIXTURES_DIR").unwrap_or_else(|_| "fixtures".to_string());
    let fixtures = ScenarioFixtures::load(&fixtures_dir)?;
    info!(dir = %fixtures_dir, "loaded scenario fixtures");

    let model = chat_model();
    let executor = Arc::new(
        ProcessExecutor::new(
            std::env::var("COLLOQUY_RUNNER_PROGRAM").unwrap_or_else(|_| "dotnet-script".into()),
            "csx",
        )
        .with_timeout(Duration::from_secs(120)),
    );

    let graph = scenario::workflow()?;
    let router = TurnRouter::new(graph);
    let agents = scenario::agents(model, executor);

    let bus = EventBus::default();
    bus.listen_for_events();

    let driver = ChatDriver::new(router, agents, scenario::driver_config(), bus.get_sender())?;

    let (cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = cancel_tx.send(true);
        }
    });

    let report = driver
        .run_with_cancel(scenario::seed_message(&fixtures), Some(cancel_rx))
        .await;

    info!(
        outcome = ?report.outcome,
        rounds = report.rounds,
        messages = report.transcript.len(),
        "run finished"
    );

    bus.stop_listener().await;
    Ok(())
}

#[cfg(feature = "openai")]
fn chat_model() -> Arc<dyn ChatModel> {
    match colloquy::clients::OpenAiModel::from_env() {
        Ok(model) => Arc::new(model),
        Err(err) => {
            tracing::warn!(error = %err, "falling back to scripted replies");
            scripted_model()
        }
    }
}

#[cfg(not(feature = "openai"))]
fn chat_model() -> Arc<dyn ChatModel> {
    scripted_model()
}

fn scripted_model() -> Arc<dyn ChatModel> {
    Arc::new(ScriptedModel::new([
        "```task\n{\n    \"to\": \"coder\",\n    \"task\": \"Rewrite the PL/SQL procedure as a single dotnet program\",\n    \"context\": \"User supplied the procedure, table DDL, and CSV data\"\n}\n```",
        "```csharp\nvar total = 50000m + 5000m + 55000m + 5500m;\nConsole.WriteLine($\"Total Salary for Department 1: {total}\");\n```",
        "```review\ncomment: The code satisfies all conditions.\nresult: APPROVED\n```",
    ]))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(ErrorLayer::default())
        .init();
}
