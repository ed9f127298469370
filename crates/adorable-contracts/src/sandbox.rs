//! Sandbox identity and command output buffers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a remote sandbox.
///
/// The sandbox outlives the in-process lifetime of a run; this id is the
/// only thing the orchestrator keeps and every tool call resolves it afresh.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SandboxId(pub String);

impl SandboxId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for SandboxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accumulates the stdout and stderr streamed by a running command.
///
/// Backends push chunks as they arrive, so whatever was captured before a
/// failure is still available to build the error payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandBuffers {
    pub stdout: String,
    pub stderr: String,
}

impl CommandBuffers {
    pub fn push_stdout(&mut self, chunk: &str) {
        self.stdout.push_str(chunk);
    }

    pub fn push_stderr(&mut self, chunk: &str) {
        self.stderr.push_str(chunk);
    }
}
