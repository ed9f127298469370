//! Reference scenarios.
//!
//! Each scenario wires the real orchestrator, validator, message store, and
//! step journal to the in-memory sandbox and a scripted model, then drives
//! one run and reports what it persisted.

use std::sync::Arc;

use adorable_contracts::{
    error::AdorableResult,
    model::ModelResponse,
    record::{MessageRecord, RunOutcome},
    run::{ProjectId, RunId, RunRequest},
    sandbox::SandboxId,
};
use adorable_core::orchestrator::{Orchestrator, RunSettings};
use adorable_store::{InMemoryMessageStore, InMemoryStepJournal};
use adorable_verify::engine::SchemaValidator;

use crate::{model::ScriptedModel, sandbox::InMemoryProvisioner};

pub mod command_failure;
pub mod counter_app;
pub mod exhaustion;
pub mod partial_write;
pub mod provision_failure;

/// Project every scenario runs under.
pub const DEMO_PROJECT: &str = "6f1c2b9e-4d3a-4e8b-9a51-2c7d0e8f4b13";

/// Everything a scenario needs to drive and then inspect one run.
pub struct Harness {
    pub orchestrator: Arc<Orchestrator>,
    pub provisioner: InMemoryProvisioner,
    pub store: InMemoryMessageStore,
    pub journal: InMemoryStepJournal,
    pub model: Arc<ScriptedModel>,
}

impl Harness {
    pub fn new(script: Vec<ModelResponse>, provisioner: InMemoryProvisioner) -> Self {
        let store = InMemoryMessageStore::new();
        let journal = InMemoryStepJournal::new();
        let model = Arc::new(ScriptedModel::new(script));
        let orchestrator = Arc::new(Orchestrator::new(
            RunSettings::default(),
            model.clone(),
            Box::new(SchemaValidator::new()),
            Arc::new(provisioner.clone()),
            Arc::new(store.clone()),
            Arc::new(journal.clone()),
        ));
        Self {
            orchestrator,
            provisioner,
            store,
            journal,
            model,
        }
    }

    /// A request for `value` under `DEMO_PROJECT`.
    pub fn request(&self, value: &str) -> AdorableResult<RunRequest> {
        RunRequest::new(value, ProjectId::parse(DEMO_PROJECT)?)
    }

    /// Run `value` to completion under a fresh `RunId`.
    pub async fn run(&self, value: &str) -> AdorableResult<Played> {
        let request = self.request(value)?;
        let run_id = RunId::new();
        let result = self.orchestrator.run(&run_id, &request).await;
        Ok(Played { run_id, result })
    }

    /// Messages persisted so far, in save order.
    pub fn messages(&self) -> Vec<MessageRecord> {
        self.store.records()
    }

    /// The sandbox of the first run.
    pub fn first_sandbox(&self) -> SandboxId {
        SandboxId::new("sbx-1")
    }
}

/// One finished run.
pub struct Played {
    pub run_id: RunId,
    pub result: AdorableResult<RunOutcome>,
}

pub(crate) fn print_outcome(outcome: &RunOutcome) {
    println!("  Iterations:             {}", outcome.iterations);
    println!("  is_error:               {}", outcome.is_error);
    println!(
        "  Summary:                {}",
        outcome.summary.as_deref().unwrap_or("<none>")
    );
    println!("  Files:                  {}", outcome.files.len());
    for path in outcome.files.keys() {
        println!("    - {path}");
    }
    println!(
        "  Preview URL:            {}",
        if outcome.url.is_empty() { "<none>" } else { outcome.url.as_str() }
    );
}

pub(crate) fn print_journal(harness: &Harness, run_id: &RunId) {
    let entries = harness.journal.entries_for(run_id);
    println!(
        "  Journal chain:          {} ({} step(s))",
        if harness.journal.verify_integrity() { "VERIFIED" } else { "FAILED" },
        entries.len()
    );
}
