//! Durable step boundaries.
//!
//! Every side-effecting operation of a run executes inside a named step.
//! `DurableSteps::step` checks the journal first: a recorded result is
//! decoded and returned without running the step again; otherwise the step
//! runs and its result is recorded before control returns. A step that fails
//! records nothing, so re-entering the run retries it.

use std::{future::Future, sync::Arc};

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use adorable_contracts::{
    error::{AdorableError, AdorableResult},
    run::RunId,
    sandbox::SandboxId,
};

use crate::traits::{SandboxProvisioner, StepJournal};

/// Step that provisions the run's sandbox.
pub const CREATE_SANDBOX: &str = "create-sandbox";
/// Step that resolves the sandbox's public preview URL.
pub const GET_SANDBOX_URL: &str = "get-sandbox-url";
/// Step that persists the terminal record.
pub const SAVE_RESULT: &str = "save-result";
/// Step that persists the error record of a run whose sandbox could not be
/// created.
pub const SAVE_PROVISION_FAILURE: &str = "save-provision-failure";

/// Step name of the model call in `iteration` (1-based).
pub fn model_step(iteration: u32) -> String {
    format!("iteration-{iteration}/model")
}

/// Step name of the `index`-th tool call in `iteration`.
pub fn tool_step(iteration: u32, index: usize, tool: &str) -> String {
    format!("iteration-{iteration}/tool-{index}/{tool}")
}

/// Runs named steps of one run against a journal.
pub struct DurableSteps {
    journal: Arc<dyn StepJournal>,
    run_id: RunId,
}

impl DurableSteps {
    pub fn new(journal: Arc<dyn StepJournal>, run_id: RunId) -> Self {
        Self { journal, run_id }
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Execute `f` as the step `name`, or replay its recorded result.
    pub async fn step<T, F, Fut>(&self, name: &str, f: F) -> AdorableResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AdorableResult<T>>,
    {
        if let Some(recorded) = self.journal.load(&self.run_id, name).await? {
            debug!(run_id = %self.run_id, step = name, "replaying recorded step");
            return serde_json::from_value(recorded).map_err(|e| AdorableError::JournalFailed {
                reason: format!("recorded result of step '{name}' does not decode: {e}"),
            });
        }

        let value = f().await?;

        let encoded = serde_json::to_value(&value).map_err(|e| AdorableError::JournalFailed {
            reason: format!("result of step '{name}' does not encode: {e}"),
        })?;
        self.journal.record(&self.run_id, name, &encoded).await?;
        debug!(run_id = %self.run_id, step = name, "step recorded");

        Ok(value)
    }
}

/// Everything a step of one run needs: its journal, the sandbox backend, and
/// the id of the run's sandbox.
pub struct RunContext<'a> {
    pub steps: &'a DurableSteps,
    pub provisioner: &'a dyn SandboxProvisioner,
    pub sandbox_id: &'a SandboxId,
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use adorable_contracts::{error::AdorableError, run::RunId};

    use crate::test_support::MemoryJournal;

    use super::DurableSteps;

    #[tokio::test]
    async fn test_step_runs_once_and_replays() {
        let journal = Arc::new(MemoryJournal::default());
        let run_id = RunId::new();
        let calls = Arc::new(Mutex::new(0u32));

        for _ in 0..3 {
            let steps = DurableSteps::new(journal.clone(), run_id.clone());
            let calls = calls.clone();
            let value: String = steps
                .step("create-sandbox", || async move {
                    *calls.lock().unwrap() += 1;
                    Ok("sbx-1".to_string())
                })
                .await
                .unwrap();
            assert_eq!(value, "sbx-1");
        }

        assert_eq!(*calls.lock().unwrap(), 1, "a recorded step must not execute again");
    }

    #[tokio::test]
    async fn test_failed_step_is_not_recorded() {
        let journal = Arc::new(MemoryJournal::default());
        let steps = DurableSteps::new(journal.clone(), RunId::new());

        let first: Result<u32, _> = steps
            .step("flaky", || async {
                Err(AdorableError::SandboxOperation {
                    reason: "connection reset".to_string(),
                })
            })
            .await;
        assert!(first.is_err());

        let second: u32 = steps.step("flaky", || async { Ok(7) }).await.unwrap();
        assert_eq!(second, 7, "a failed step must be retried on re-entry");
    }

    #[tokio::test]
    async fn test_steps_are_scoped_by_run() {
        let journal = Arc::new(MemoryJournal::default());
        let a = DurableSteps::new(journal.clone(), RunId::new());
        let b = DurableSteps::new(journal.clone(), RunId::new());

        let va: u32 = a.step("s", || async { Ok(1) }).await.unwrap();
        let vb: u32 = b.step("s", || async { Ok(2) }).await.unwrap();

        assert_eq!((va, vb), (1, 2));
    }

    #[tokio::test]
    async fn test_unit_step_replays() {
        let journal = Arc::new(MemoryJournal::default());
        let steps = DurableSteps::new(journal, RunId::new());
        let calls = Arc::new(Mutex::new(0u32));

        for _ in 0..2 {
            let calls = calls.clone();
            steps
                .step("save-result", || async move {
                    *calls.lock().unwrap() += 1;
                    Ok(())
                })
                .await
                .unwrap();
        }

        assert_eq!(*calls.lock().unwrap(), 1);
    }
}
