//! Entry point: accept a user message and start a run for it.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use adorable_contracts::{
    error::AdorableResult,
    record::{MessageRecord, RunOutcome},
    run::{ProjectId, RunId, RunRequest},
};

use crate::{orchestrator::Orchestrator, traits::MessageStore};

/// What the caller gets back immediately after submitting.
pub struct Submission {
    /// The persisted user message.
    pub message: MessageRecord,
    pub run_id: RunId,
    /// Resolves when the run finishes.
    pub handle: JoinHandle<AdorableResult<RunOutcome>>,
}

/// Validate `{ value, projectId }`, persist the user's message, and dispatch
/// a run for it.
///
/// `value` is stored and handed to the run exactly as typed; only the
/// validation looks at its trimmed form.
///
/// The user message is saved before the run starts, so it is never lost to a
/// run that fails to provision.
///
/// # Errors
///
/// `InvalidRequest` for a blank or oversized value or a malformed project id;
/// persistence failures as raised. No run is started on error.
pub async fn submit_message(
    store: &dyn MessageStore,
    orchestrator: &Arc<Orchestrator>,
    value: &str,
    project_id: &str,
) -> AdorableResult<Submission> {
    let project_id = ProjectId::parse(project_id)?;
    let request = RunRequest::new(value, project_id)?;

    let message = MessageRecord::user(project_id, request.value.clone());
    store.save(&message).await?;

    let (run_id, handle) = orchestrator.dispatch(request);
    info!(run_id = %run_id, project_id = %project_id, message_id = %message.id, "run dispatched");

    Ok(Submission {
        message,
        run_id,
        handle,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use adorable_contracts::{
        error::AdorableError,
        model::ModelResponse,
        record::{MessageRole, MessageType},
        run::MAX_INSTRUCTION_CHARS,
    };

    use crate::{
        orchestrator::{Orchestrator, RunSettings},
        test_support::{AcceptAll, FakeProvisioner, MemoryJournal, MemoryStore, ScriptedModel},
    };

    use super::submit_message;

    const PROJECT: &str = "0b9a2d3e-7a41-4c55-8f0e-5d2b1c6a9e77";

    fn orchestrator(store: Arc<MemoryStore>, provisioner: FakeProvisioner) -> Arc<Orchestrator> {
        Arc::new(Orchestrator::new(
            RunSettings::default(),
            Arc::new(ScriptedModel::new(vec![ModelResponse::text("<task_summary>x</task_summary>")])),
            Box::new(AcceptAll),
            Arc::new(provisioner),
            store,
            Arc::new(MemoryJournal::default()),
        ))
    }

    #[tokio::test]
    async fn test_user_message_persisted_before_run() {
        let store = Arc::new(MemoryStore::default());
        let orchestrator = orchestrator(store.clone(), FakeProvisioner::default());

        let submission = submit_message(store.as_ref(), &orchestrator, "  Build a counter\n", PROJECT)
            .await
            .unwrap();

        assert_eq!(submission.message.content, "  Build a counter\n");
        assert_eq!(submission.message.role, MessageRole::User);
        assert_eq!(submission.message.kind, MessageType::Result);

        submission.handle.await.unwrap().unwrap();
        let records = store.records.lock().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].role, MessageRole::User);
        assert_eq!(records[1].role, MessageRole::Assistant);
    }

    /// The user message survives a run that fails to provision and is
    /// followed by the error record.
    #[tokio::test]
    async fn test_user_message_kept_when_provisioning_fails() {
        let store = Arc::new(MemoryStore::default());
        let orchestrator = orchestrator(store.clone(), FakeProvisioner::failing());

        let submission = submit_message(store.as_ref(), &orchestrator, "Build a counter", PROJECT)
            .await
            .unwrap();
        let result = submission.handle.await.unwrap();

        assert!(matches!(result, Err(AdorableError::SandboxProvisioning { .. })));
        let records = store.records.lock().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].role, MessageRole::User);
        assert_eq!(records[1].role, MessageRole::Assistant);
        assert_eq!(records[1].kind, MessageType::Error);
    }

    #[tokio::test]
    async fn test_rejects_blank_value() {
        let store = Arc::new(MemoryStore::default());
        let orchestrator = orchestrator(store.clone(), FakeProvisioner::default());

        let result = submit_message(store.as_ref(), &orchestrator, "   ", PROJECT).await;

        assert!(matches!(result, Err(AdorableError::InvalidRequest { .. })));
        assert!(store.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_oversized_value() {
        let store = Arc::new(MemoryStore::default());
        let orchestrator = orchestrator(store.clone(), FakeProvisioner::default());
        let value = "a".repeat(MAX_INSTRUCTION_CHARS + 1);

        let result = submit_message(store.as_ref(), &orchestrator, &value, PROJECT).await;

        assert!(matches!(result, Err(AdorableError::InvalidRequest { .. })));
    }

    #[tokio::test]
    async fn test_rejects_malformed_project_id() {
        let store = Arc::new(MemoryStore::default());
        let orchestrator = orchestrator(store.clone(), FakeProvisioner::default());

        let result = submit_message(store.as_ref(), &orchestrator, "Build", "not-a-uuid").await;

        assert!(matches!(result, Err(AdorableError::InvalidRequest { .. })));
        assert!(store.records.lock().unwrap().is_empty());
    }
}
