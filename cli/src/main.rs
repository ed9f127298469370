//! Adorable agent runtime: command-line interface
//!
//! Runs the reference scenarios against the in-memory sandbox, drives a
//! single run against a real model endpoint, or checks a config file.
//!
//! Usage:
//!   cargo run -p adorable-cli -- scenario all
//!   cargo run -p adorable-cli -- scenario c
//!   cargo run -p adorable-cli -- run --value "Build a counter" --config adorable.toml
//!   cargo run -p adorable-cli -- config-check adorable.toml

use std::{path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use adorable_config::AdorableConfig;
use adorable_contracts::error::{AdorableError, AdorableResult};
use adorable_core::{submit_message, Orchestrator};
use adorable_model::{ModelEndpoint, OpenAiChatModel};
use adorable_sim::{
    scenarios::{command_failure, counter_app, exhaustion, partial_write, provision_failure},
    InMemoryProvisioner,
};
use adorable_store::{InMemoryMessageStore, InMemoryStepJournal};
use adorable_verify::engine::SchemaValidator;

// ── CLI definition ────────────────────────────────────────────────────────────

/// Adorable: natural language in, previewable UI fragment out.
#[derive(Parser)]
#[command(
    name = "adorable",
    about = "Adorable agent orchestration runtime",
    long_about = "Runs the bounded, checkpointed agent loop: provision a sandbox,\n\
                  iterate the code agent, and persist exactly one terminal record."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run reference scenarios against the simulated sandbox and a scripted model.
    Scenario {
        #[arg(value_enum)]
        which: Scenario,
    },
    /// Run one instruction against the configured model endpoint.
    Run {
        /// The instruction to build.
        #[arg(long)]
        value: String,
        /// Project UUID. A fresh one is generated when omitted.
        #[arg(long)]
        project_id: Option<String>,
        /// TOML config file. Built-in defaults are used when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Parse and validate a config file.
    ConfigCheck { file: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum Scenario {
    /// Counter app, completes on iteration 2.
    A,
    /// Never completes, stopped at the iteration cap.
    B,
    /// Second file of a batch rejected by the sandbox.
    C,
    /// Sandbox creation fails.
    D,
    /// A command fails with output on both streams.
    E,
    All,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Scenario { which } => {
            print_banner();
            run_scenarios(which).await
        }
        Command::Run {
            value,
            project_id,
            config,
        } => run_once(&value, project_id, config).await,
        Command::ConfigCheck { file } => config_check(&file),
    };

    if let Err(e) = result {
        eprintln!("adorable: {e}");
        std::process::exit(1);
    }
}

// ── Scenario dispatch ─────────────────────────────────────────────────────────

async fn run_scenarios(which: Scenario) -> AdorableResult<()> {
    match which {
        Scenario::A => counter_app::run_scenario().await?,
        Scenario::B => exhaustion::run_scenario().await?,
        Scenario::C => partial_write::run_scenario().await?,
        Scenario::D => provision_failure::run_scenario().await?,
        Scenario::E => command_failure::run_scenario().await?,
        Scenario::All => {
            counter_app::run_scenario().await?;
            exhaustion::run_scenario().await?;
            partial_write::run_scenario().await?;
            provision_failure::run_scenario().await?;
            command_failure::run_scenario().await?;
        }
    }
    println!("All selected scenarios completed.");
    Ok(())
}

// ── Single run ────────────────────────────────────────────────────────────────

fn load_config(path: Option<PathBuf>) -> AdorableResult<AdorableConfig> {
    match path {
        Some(path) => AdorableConfig::from_file(&path),
        None => Ok(AdorableConfig::default()),
    }
}

async fn run_once(value: &str, project_id: Option<String>, config: Option<PathBuf>) -> AdorableResult<()> {
    let config = load_config(config)?;
    let endpoint = ModelEndpoint {
        model: config.model.name.clone(),
        base_url: config.model.base_url.clone(),
        api_key: config.model.resolve_api_key()?,
    };
    let model = Arc::new(OpenAiChatModel::new(endpoint)?);

    let store = InMemoryMessageStore::new();
    let journal = InMemoryStepJournal::new();
    let provisioner = InMemoryProvisioner::new();
    let orchestrator = Arc::new(Orchestrator::new(
        config.run_settings(),
        model,
        Box::new(SchemaValidator::new()),
        Arc::new(provisioner),
        Arc::new(store.clone()),
        Arc::new(journal.clone()),
    ));

    let project_id = project_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let submission = submit_message(&store, &orchestrator, value, &project_id).await?;
    info!(run_id = %submission.run_id, project_id = %project_id, "waiting for run");

    let outcome = submission
        .handle
        .await
        .map_err(|e| AdorableError::StateMachineError {
            reason: format!("run task failed: {e}"),
        })??;

    let rendered = serde_json::to_string_pretty(&outcome).map_err(|e| AdorableError::SchemaValidation {
        reason: format!("failed to render outcome: {e}"),
    })?;
    println!("{rendered}");
    eprintln!(
        "journal: {} step(s), chain {}",
        journal.len(),
        if journal.verify_integrity() { "verified" } else { "BROKEN" }
    );
    Ok(())
}

// ── Config check ──────────────────────────────────────────────────────────────

fn config_check(file: &std::path::Path) -> AdorableResult<()> {
    let config = AdorableConfig::from_file(file)?;
    println!("{}: ok", file.display());
    println!("  model:          {} @ {}", config.model.name, config.model.base_url);
    println!("  api key:        {}", config.model.api_key_source());
    println!(
        "  sandbox:        {} (preview port {})",
        config.sandbox.template, config.sandbox.preview_port
    );
    println!(
        "  run:            max {} iteration(s), title '{}'",
        config.run.max_iterations, config.run.fragment_title
    );
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("Adorable Agent Runtime");
    println!("Reference Scenarios (simulated sandbox, scripted model)");
    println!("======================================================");
    println!();
    println!("Pipeline per run:");
    println!("  [1] create-sandbox      provision once, recorded in the step journal");
    println!("  [2] iteration-n/model   one model call per iteration, tool calls in order");
    println!("  [3] router              halt on a task summary or at the iteration cap");
    println!("  [4] get-sandbox-url     resolve the preview host");
    println!("  [5] save-result         persist exactly one terminal record");
    println!();
}
