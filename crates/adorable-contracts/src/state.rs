//! The per-run agent accumulator and the deltas tools produce.
//!
//! `AgentState` is an explicit value: the orchestrator passes it into every
//! step and receives the updated value back. Tools never hold a reference to
//! it; they return a `FileDelta` which the step executor applies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Relative file path → file content, ordered by path.
pub type FileMap = BTreeMap<String, String>;

/// Mutable accumulator threaded through all iterations of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentState {
    /// Set exactly once, when the completion hook sees a completion marker.
    /// A non-null summary is the sole termination signal.
    pub summary: Option<String>,
    /// Every file successfully written to the sandbox during this run.
    /// Entries are added or overwritten, never removed.
    pub files: FileMap,
}

impl AgentState {
    /// Apply the writes carried by `delta`, in order. Last write wins.
    pub fn apply(&mut self, delta: FileDelta) {
        for (path, content) in delta.writes {
            self.files.insert(path, content);
        }
    }

    /// Commit the completion summary.
    ///
    /// Returns `false` and leaves the state untouched if a summary was already
    /// committed.
    pub fn commit_summary(&mut self, summary: impl Into<String>) -> bool {
        if self.summary.is_some() {
            return false;
        }
        self.summary = Some(summary.into());
        true
    }

    /// True once the agent has signalled completion.
    pub fn is_complete(&self) -> bool {
        self.summary.is_some()
    }
}

/// The file writes one tool invocation committed to the sandbox.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDelta {
    /// `(path, content)` pairs in the order they were written.
    pub writes: Vec<(String, String)>,
}

impl FileDelta {
    pub fn record(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.writes.push((path.into(), content.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}
