//! The orchestrator: owns the collaborators and drives one run end to end.
//!
//! Pipeline:
//!
//!   create-sandbox → network (iterations) → get-sandbox-url → save-result
//!
//! When `create-sandbox` fails the run never iterates: the generic error
//! record is persisted in `save-provision-failure` and the provisioning
//! error is returned.
//!
//! Each stage is a durable step, so `run` may be called again with the same
//! `RunId` after a crash and will resume from the last recorded step.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use adorable_contracts::{
    error::{AdorableError, AdorableResult},
    record::{MessageRecord, RunOutcome, TerminalRecord},
    run::{ProjectId, Run, RunId, RunRequest},
    sandbox::SandboxId,
    state::AgentState,
};

use crate::{
    agent::CodeAgent,
    durable::{DurableSteps, RunContext, CREATE_SANDBOX, SAVE_PROVISION_FAILURE},
    finalizer::Finalizer,
    network::{Network, DEFAULT_MAX_ITERATIONS},
    prompt::system_prompt,
    tools::ToolRegistry,
    traits::{ArgumentValidator, LanguageModel, MessageStore, SandboxProvisioner, StepJournal},
};

/// Name of the only agent in the network.
pub const AGENT_NAME: &str = "code-agent";

/// Per-deployment knobs for every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub sandbox_template: String,
    pub preview_port: u16,
    pub max_iterations: u32,
    pub fragment_title: String,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            sandbox_template: "adorable-nextjs".to_string(),
            preview_port: 3000,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            fragment_title: "Fragment".to_string(),
        }
    }
}

pub struct Orchestrator {
    settings: RunSettings,
    network: Network,
    finalizer: Finalizer,
    provisioner: Arc<dyn SandboxProvisioner>,
    store: Arc<dyn MessageStore>,
    journal: Arc<dyn StepJournal>,
}

impl Orchestrator {
    pub fn new(
        settings: RunSettings,
        model: Arc<dyn LanguageModel>,
        validator: Box<dyn ArgumentValidator>,
        provisioner: Arc<dyn SandboxProvisioner>,
        store: Arc<dyn MessageStore>,
        journal: Arc<dyn StepJournal>,
    ) -> Self {
        let agent = CodeAgent::new(
            AGENT_NAME,
            system_prompt(settings.preview_port),
            model,
            ToolRegistry::new(validator),
        );
        let network = Network::new(agent, settings.max_iterations);
        let finalizer = Finalizer::new(store.clone(), settings.preview_port, settings.fragment_title.clone());
        Self {
            settings,
            network,
            finalizer,
            provisioner,
            store,
            journal,
        }
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Execute (or resume) the run `run_id` for `request`.
    ///
    /// # Errors
    ///
    /// `SandboxProvisioning` when the sandbox cannot be created, after the
    /// generic error record has been persisted; model,
    /// journal, and persistence failures as raised. Every error is logged
    /// before it is returned.
    pub async fn run(&self, run_id: &RunId, request: &RunRequest) -> AdorableResult<RunOutcome> {
        match self.execute(run_id, request).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!(run_id = %run_id, project_id = %request.project_id, error = %e, "run failed");
                Err(e)
            }
        }
    }

    /// Spawn the run on the tokio runtime under a fresh `RunId`.
    pub fn dispatch(self: &Arc<Self>, request: RunRequest) -> (RunId, JoinHandle<AdorableResult<RunOutcome>>) {
        let run_id = RunId::new();
        let orchestrator = Arc::clone(self);
        let task_run_id = run_id.clone();
        let handle = tokio::spawn(async move { orchestrator.run(&task_run_id, &request).await });
        (run_id, handle)
    }

    async fn execute(&self, run_id: &RunId, request: &RunRequest) -> AdorableResult<RunOutcome> {
        request.validate()?;
        let mut run = Run::new(run_id.clone(), request.clone());
        let steps = DurableSteps::new(self.journal.clone(), run_id.clone());

        let created: AdorableResult<SandboxId> = steps
            .step(CREATE_SANDBOX, || async {
                self.provisioner
                    .create(&self.settings.sandbox_template)
                    .await
                    .map_err(|e| match e {
                        AdorableError::SandboxProvisioning { .. } => e,
                        other => AdorableError::SandboxProvisioning {
                            reason: other.to_string(),
                        },
                    })
            })
            .await;
        let sandbox_id = match created {
            Ok(sandbox_id) => sandbox_id,
            Err(e @ AdorableError::SandboxProvisioning { .. }) => {
                match self.save_provision_failure(&steps, request.project_id).await {
                    Ok(saved) => {
                        run.finish(0, true)?;
                        info!(run_id = %run_id, message_id = %saved.id, "provisioning failure recorded");
                    }
                    Err(save_err) => {
                        warn!(run_id = %run_id, error = %save_err, "could not persist provisioning failure");
                    }
                }
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        run.assign_sandbox(sandbox_id.clone())?;
        info!(run_id = %run_id, sandbox_id = %sandbox_id, "sandbox ready");

        let ctx = RunContext {
            steps: &steps,
            provisioner: self.provisioner.as_ref(),
            sandbox_id: &sandbox_id,
        };

        let network = self.network.run(&ctx, &request.value, AgentState::default()).await?;
        let outcome = self
            .finalizer
            .finalize(&ctx, request.project_id, &network.state, network.iterations)
            .await?;

        run.finish(outcome.iterations, outcome.is_error)?;
        info!(
            run_id = %run_id,
            status = ?run.status,
            iterations = run.iterations,
            halt = ?network.halt,
            "run complete"
        );
        Ok(outcome)
    }

    async fn save_provision_failure(&self, steps: &DurableSteps, project_id: ProjectId) -> AdorableResult<MessageRecord> {
        steps
            .step(SAVE_PROVISION_FAILURE, || async {
                let message = TerminalRecord::error().into_message(project_id);
                self.store.save(&message).await?;
                Ok(message)
            })
            .await
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use adorable_contracts::{
        error::AdorableError,
        model::ModelResponse,
        record::{MessageRole, MessageType, ERROR_MESSAGE},
        run::{ProjectId, RunId, RunRequest},
    };

    use crate::test_support::{
        calls, tool_call, AcceptAll, FakeProvisioner, MemoryJournal, MemoryStore, ScriptedModel,
    };

    use super::{Orchestrator, RunSettings};

    struct Harness {
        orchestrator: Arc<Orchestrator>,
        provisioner: Arc<FakeProvisioner>,
        store: Arc<MemoryStore>,
        model: Arc<ScriptedModel>,
    }

    fn harness(responses: Vec<ModelResponse>, provisioner: FakeProvisioner, journal: Arc<MemoryJournal>) -> Harness {
        let provisioner = Arc::new(provisioner);
        let store = Arc::new(MemoryStore::default());
        let model = Arc::new(ScriptedModel::new(responses));
        let orchestrator = Arc::new(Orchestrator::new(
            RunSettings::default(),
            model.clone(),
            Box::new(AcceptAll),
            provisioner.clone(),
            store.clone(),
            journal,
        ));
        Harness {
            orchestrator,
            provisioner,
            store,
            model,
        }
    }

    fn counter_script() -> Vec<ModelResponse> {
        vec![
            calls(vec![tool_call(
                "c1",
                "createOrUpdateFile",
                json!({ "files": [{ "path": "app/page.tsx", "content": "counter" }] }),
            )]),
            ModelResponse::text("<task_summary>Built a counter.</task_summary>"),
        ]
    }

    fn request() -> RunRequest {
        RunRequest::new("Build a counter", ProjectId(RunId::new().0)).unwrap()
    }

    #[test]
    fn test_default_settings() {
        let settings = RunSettings::default();
        assert_eq!(settings.preview_port, 3000);
        assert_eq!(settings.max_iterations, 10);
        assert_eq!(settings.fragment_title, "Fragment");
    }

    #[tokio::test]
    async fn test_run_success_end_to_end() {
        let h = harness(counter_script(), FakeProvisioner::default(), Arc::new(MemoryJournal::default()));

        let outcome = h.orchestrator.run(&RunId::new(), &request()).await.unwrap();

        assert!(!outcome.is_error);
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.summary.as_deref(), Some("Built a counter."));
        assert_eq!(outcome.url, "https://3000-sbx-test.sandbox.test");
        assert_eq!(h.provisioner.sandbox.lock().unwrap().creates, 1);

        let records = h.store.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, MessageType::Result);
    }

    /// Provisioning failure: no model call, one error record, error returned.
    #[tokio::test]
    async fn test_provision_failure_is_fatal() {
        let h = harness(counter_script(), FakeProvisioner::failing(), Arc::new(MemoryJournal::default()));

        let err = h.orchestrator.run(&RunId::new(), &request()).await.unwrap_err();

        assert!(matches!(err, AdorableError::SandboxProvisioning { .. }));
        assert!(h.model.requests.lock().unwrap().is_empty());
        let records = h.store.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].role, MessageRole::Assistant);
        assert_eq!(records[0].kind, MessageType::Error);
        assert_eq!(records[0].content, ERROR_MESSAGE);
        assert!(records[0].fragment.is_none());
    }

    /// Re-entering a run whose provisioning failed does not write a second
    /// error record.
    #[tokio::test]
    async fn test_provision_failure_record_written_once() {
        let journal = Arc::new(MemoryJournal::default());
        let h = harness(counter_script(), FakeProvisioner::failing(), journal);
        let run_id = RunId::new();
        let request = request();

        assert!(h.orchestrator.run(&run_id, &request).await.is_err());
        assert!(h.orchestrator.run(&run_id, &request).await.is_err());

        assert_eq!(h.store.records.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_prompt_carries_configured_port() {
        let provisioner = Arc::new(FakeProvisioner::default());
        let model = Arc::new(ScriptedModel::new(counter_script()));
        let settings = RunSettings {
            preview_port: 5173,
            ..RunSettings::default()
        };
        let orchestrator = Orchestrator::new(
            settings,
            model.clone(),
            Box::new(AcceptAll),
            provisioner,
            Arc::new(MemoryStore::default()),
            Arc::new(MemoryJournal::default()),
        );

        orchestrator.run(&RunId::new(), &request()).await.unwrap();

        let requests = model.requests.lock().unwrap();
        assert!(requests[0].system.contains("port 5173"));
    }

    #[tokio::test]
    async fn test_exhaustion_persists_error_record() {
        let h = harness(vec![], FakeProvisioner::default(), Arc::new(MemoryJournal::default()));

        let outcome = h.orchestrator.run(&RunId::new(), &request()).await.unwrap();

        assert!(outcome.is_error);
        assert_eq!(outcome.iterations, 10);
        let records = h.store.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, ERROR_MESSAGE);
    }

    /// Re-entering a finished run replays every step: one sandbox, one
    /// record, no further model calls.
    #[tokio::test]
    async fn test_reentry_replays_recorded_steps() {
        let journal = Arc::new(MemoryJournal::default());
        let h = harness(counter_script(), FakeProvisioner::default(), journal);
        let run_id = RunId::new();
        let request = request();

        let first = h.orchestrator.run(&run_id, &request).await.unwrap();
        let second = h.orchestrator.run(&run_id, &request).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(h.provisioner.sandbox.lock().unwrap().creates, 1);
        assert_eq!(h.model.requests.lock().unwrap().len(), 2);
        assert_eq!(h.store.records.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_runs_on_runtime() {
        let h = harness(counter_script(), FakeProvisioner::default(), Arc::new(MemoryJournal::default()));

        let (_run_id, handle) = h.orchestrator.dispatch(request());
        let outcome = handle.await.unwrap().unwrap();

        assert!(!outcome.is_error);
        assert_eq!(h.store.records.lock().unwrap().len(), 1);
    }
}
