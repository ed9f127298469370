//! Runtime error types for the Adorable orchestration loop.
//!
//! All fallible operations return `AdorableResult<T>`. Tool-level failures
//! never surface here: they are converted into error-tagged tool results so
//! the model can react to them. Variants in this enum are the faults that
//! escape a step.

use thiserror::Error;

/// The unified error type for the Adorable runtime.
#[derive(Debug, Error)]
pub enum AdorableError {
    /// The sandbox backend could not create a sandbox for the run.
    ///
    /// Fatal to the run: no agent iteration is attempted.
    #[error("sandbox provisioning failed: {reason}")]
    SandboxProvisioning { reason: String },

    /// A previously created sandbox could not be looked up by its id.
    #[error("sandbox '{sandbox_id}' could not be resolved: {reason}")]
    SandboxUnavailable { sandbox_id: String, reason: String },

    /// A command or file operation inside the sandbox failed.
    #[error("sandbox operation failed: {reason}")]
    SandboxOperation { reason: String },

    /// The model asked for a tool outside the registered set.
    #[error("unknown tool '{name}'")]
    UnknownTool { name: String },

    /// Tool arguments did not pass validation.
    #[error("invalid arguments for tool '{tool}': {reason}")]
    InvalidToolArguments { tool: String, reason: String },

    /// The language model call failed or returned something unusable.
    #[error("model invocation failed: {reason}")]
    ModelInvocation { reason: String },

    /// The message store could not persist a record.
    #[error("persistence failed: {reason}")]
    PersistenceFailed { reason: String },

    /// The step journal could not load or record a checkpoint.
    #[error("step journal error: {reason}")]
    JournalFailed { reason: String },

    /// The run's state machine saw an illegal transition.
    #[error("state machine error: {reason}")]
    StateMachineError { reason: String },

    /// The entry payload was rejected before a run was created.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A JSON Schema document could not be compiled.
    #[error("schema validation error: {reason}")]
    SchemaValidation { reason: String },
}

/// Convenience alias used throughout the Adorable crates.
pub type AdorableResult<T> = Result<T, AdorableError>;
