//! Run identity, entry payload, and lifecycle types.
//!
//! A `Run` is one pass of the orchestration loop for a single user
//! instruction. It is created in `Pending`, mutated only by the orchestrator,
//! and frozen once it reaches `Success` or `Error`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::{AdorableError, AdorableResult},
    sandbox::SandboxId,
};

/// Upper bound on the instruction length accepted by the entry point.
pub const MAX_INSTRUCTION_CHARS: usize = 10_000;

/// Unique identifier for a single run.
///
/// Also the key under which every durable step of the run is journaled, so
/// re-entering a run with the same id replays its committed steps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub uuid::Uuid);

impl RunId {
    /// Create a new, unique run id.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of the project a conversation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub uuid::Uuid);

impl ProjectId {
    /// Parse a project id from its textual UUID form.
    pub fn parse(s: &str) -> AdorableResult<Self> {
        uuid::Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| AdorableError::InvalidRequest {
                reason: format!("invalid project id '{s}': {e}"),
            })
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The payload a user submits to start a run: `{ value, projectId }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    /// Free-text instruction describing the desired UI.
    pub value: String,
    /// The project the resulting messages are attached to.
    pub project_id: ProjectId,
}

impl RunRequest {
    /// Build a request and check it against the entry-point bounds.
    pub fn new(value: impl Into<String>, project_id: ProjectId) -> AdorableResult<Self> {
        let request = Self {
            value: value.into(),
            project_id,
        };
        request.validate()?;
        Ok(request)
    }

    /// Reject blank instructions and instructions over `MAX_INSTRUCTION_CHARS`.
    ///
    /// Bounds apply to the trimmed text; `value` itself is kept as typed.
    pub fn validate(&self) -> AdorableResult<()> {
        let text = self.value.trim();
        if text.is_empty() {
            return Err(AdorableError::InvalidRequest {
                reason: "message is required".to_string(),
            });
        }
        let len = text.chars().count();
        if len > MAX_INSTRUCTION_CHARS {
            return Err(AdorableError::InvalidRequest {
                reason: format!(
                    "message must be at most {MAX_INSTRUCTION_CHARS} characters (got {len})"
                ),
            });
        }
        Ok(())
    }
}

/// Terminal classification of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Success,
    Error,
}

/// One invocation of the orchestration loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub run_id: RunId,
    pub request: RunRequest,
    /// Assigned once by the provisioning step; never reassigned.
    pub sandbox_id: Option<SandboxId>,
    /// Number of agent steps executed so far.
    pub iterations: u32,
    pub status: RunStatus,
}

impl Run {
    /// Create a pending run for `request`.
    pub fn new(run_id: RunId, request: RunRequest) -> Self {
        Self {
            run_id,
            request,
            sandbox_id: None,
            iterations: 0,
            status: RunStatus::Pending,
        }
    }

    /// Record the sandbox created for this run.
    ///
    /// Fails if a sandbox is already attached or the run is finalized.
    pub fn assign_sandbox(&mut self, sandbox_id: SandboxId) -> AdorableResult<()> {
        self.ensure_pending()?;
        if let Some(existing) = &self.sandbox_id {
            return Err(AdorableError::StateMachineError {
                reason: format!(
                    "run {} already has sandbox '{}'; refusing to attach '{}'",
                    self.run_id, existing, sandbox_id
                ),
            });
        }
        self.sandbox_id = Some(sandbox_id);
        Ok(())
    }

    /// Move the run to a terminal status. Only legal from `Pending`.
    pub fn finish(&mut self, iterations: u32, is_error: bool) -> AdorableResult<()> {
        self.ensure_pending()?;
        self.iterations = iterations;
        self.status = if is_error {
            RunStatus::Error
        } else {
            RunStatus::Success
        };
        Ok(())
    }

    fn ensure_pending(&self) -> AdorableResult<()> {
        if self.status != RunStatus::Pending {
            return Err(AdorableError::StateMachineError {
                reason: format!("run {} is already finalized as {:?}", self.run_id, self.status),
            });
        }
        Ok(())
    }
}
