//! Trait definitions for every collaborator the orchestration loop talks to.
//!
//! - `SandboxProvisioner` / `SandboxHandle` — the remote execution backend
//! - `LanguageModel`     — one reasoning turn of the model provider
//! - `ArgumentValidator` — gate on tool arguments before any side effect
//! - `MessageStore`      — persistence of user and terminal messages
//! - `StepJournal`       — checkpoint storage for durable steps
//!
//! The orchestrator wires them together. None of them is ever captured by a
//! tool closure; everything a tool needs is passed in explicitly.

use async_trait::async_trait;
use serde_json::Value;

use adorable_contracts::{
    error::AdorableResult,
    model::{ModelRequest, ModelResponse},
    record::MessageRecord,
    run::RunId,
    sandbox::{CommandBuffers, SandboxId},
    tool::ToolName,
    validate::ValidationReport,
};

/// Creates sandboxes and looks them up by id.
#[async_trait]
pub trait SandboxProvisioner: Send + Sync {
    /// Create a sandbox from `template` and return its durable id.
    ///
    /// Called exactly once per run, inside the `create-sandbox` step.
    async fn create(&self, template: &str) -> AdorableResult<SandboxId>;

    /// Look up a live handle for `sandbox_id`.
    ///
    /// The runtime calls this before every sandbox operation and never keeps
    /// the handle across steps, so backends are free to recycle connections.
    async fn resolve(&self, sandbox_id: &SandboxId) -> AdorableResult<Box<dyn SandboxHandle>>;
}

/// A live connection to one sandbox.
#[async_trait]
pub trait SandboxHandle: Send + Sync {
    /// Run `command`, pushing stdout/stderr chunks into `buffers` as they
    /// arrive. On failure, whatever was captured stays in `buffers`.
    async fn run_command(&self, command: &str, buffers: &mut CommandBuffers) -> AdorableResult<()>;

    /// Create or overwrite the file at `path`.
    async fn write_file(&self, path: &str, content: &str) -> AdorableResult<()>;

    /// Read the file at `path` as UTF-8.
    async fn read_file(&self, path: &str) -> AdorableResult<String>;

    /// The routable hostname exposing `port` of this sandbox.
    fn host(&self, port: u16) -> String;
}

/// The public preview URL for `port` of the sandbox behind `handle`.
///
/// Deterministic in `handle` and `port`.
pub fn public_url(handle: &dyn SandboxHandle, port: u16) -> String {
    format!("https://{}", handle.host(port))
}

/// One reasoning turn of a language model.
///
/// Implementations carry their own endpoint and credentials, supplied at
/// construction; nothing here reads the process environment.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, request: &ModelRequest) -> AdorableResult<ModelResponse>;
}

/// Checks a tool call's arguments before the tool runs.
///
/// Implementations must be pure: they inspect the arguments and report,
/// never touching the sandbox.
pub trait ArgumentValidator: Send + Sync {
    fn validate(&self, tool: ToolName, arguments: &Value) -> AdorableResult<ValidationReport>;
}

/// Persists chat messages.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append one message. Records are never modified afterwards.
    async fn save(&self, record: &MessageRecord) -> AdorableResult<()>;
}

/// Checkpoint storage for durable steps.
///
/// Each named step of a run records its JSON-encoded result here before the
/// run advances. Re-entering the run replays recorded results instead of
/// executing the step again.
#[async_trait]
pub trait StepJournal: Send + Sync {
    /// The recorded result of `step` in `run_id`, if any.
    async fn load(&self, run_id: &RunId, step: &str) -> AdorableResult<Option<Value>>;

    /// Record the result of `step` in `run_id`.
    ///
    /// Recording an already-recorded step must keep the first value.
    async fn record(&self, run_id: &RunId, step: &str, value: &Value) -> AdorableResult<()>;
}
