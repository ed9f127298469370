//! Run finalizer: turns the halted agent state into exactly one persisted
//! terminal record and the run's outcome.

use std::sync::Arc;

use tracing::{info, warn};

use adorable_contracts::{
    error::AdorableResult,
    record::{Fragment, MessageRecord, RunOutcome, TerminalRecord},
    run::ProjectId,
    state::AgentState,
};

use crate::{
    durable::{RunContext, GET_SANDBOX_URL, SAVE_RESULT},
    traits::{public_url, MessageStore},
};

/// A run is an error unless it produced both a summary and at least one file.
pub fn is_error(state: &AgentState) -> bool {
    state.summary.is_none() || state.files.is_empty()
}

/// The terminal record for `state`.
pub fn terminal_record(state: &AgentState, url: &str, title: &str) -> TerminalRecord {
    match &state.summary {
        Some(summary) if !is_error(state) => TerminalRecord::Result {
            content: summary.clone(),
            fragment: Fragment {
                sandbox_url: url.to_string(),
                title: title.to_string(),
                files: state.files.clone(),
            },
        },
        _ => TerminalRecord::error(),
    }
}

pub struct Finalizer {
    store: Arc<dyn MessageStore>,
    preview_port: u16,
    fragment_title: String,
}

impl Finalizer {
    pub fn new(store: Arc<dyn MessageStore>, preview_port: u16, fragment_title: impl Into<String>) -> Self {
        Self {
            store,
            preview_port,
            fragment_title: fragment_title.into(),
        }
    }

    /// Resolve the preview URL, persist the terminal record, and build the
    /// outcome.
    ///
    /// # Errors
    ///
    /// On the success path a URL resolution failure propagates. Persistence
    /// and journal failures always propagate.
    pub async fn finalize(
        &self,
        ctx: &RunContext<'_>,
        project_id: ProjectId,
        state: &AgentState,
        iterations: u32,
    ) -> AdorableResult<RunOutcome> {
        let run_id = ctx.steps.run_id();
        let is_error = is_error(state);

        let resolved: AdorableResult<String> = ctx
            .steps
            .step(GET_SANDBOX_URL, || async {
                let sandbox = ctx.provisioner.resolve(ctx.sandbox_id).await?;
                Ok(public_url(sandbox.as_ref(), self.preview_port))
            })
            .await;
        let url = match resolved {
            Ok(url) => url,
            Err(e) if is_error => {
                warn!(run_id = %run_id, sandbox_id = %ctx.sandbox_id, error = %e, "preview url unavailable for failed run");
                String::new()
            }
            Err(e) => return Err(e),
        };

        let record = terminal_record(state, &url, &self.fragment_title);
        let saved: MessageRecord = ctx
            .steps
            .step(SAVE_RESULT, || async {
                let message = record.clone().into_message(project_id);
                self.store.save(&message).await?;
                Ok(message)
            })
            .await?;

        info!(
            run_id = %run_id,
            message_id = %saved.id,
            is_error,
            iterations,
            files = state.files.len(),
            "run finalized"
        );

        Ok(RunOutcome {
            url,
            title: self.fragment_title.clone(),
            files: state.files.clone(),
            summary: state.summary.clone(),
            is_error,
            iterations,
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
