//! In-memory implementation of `StepJournal`.
//!
//! `InMemoryStepJournal` keeps every recorded step in one hash chain behind
//! a `Mutex`, shared by all runs. An index keyed by `(run id, step name)`
//! serves replay lookups. Use `export_log()` to snapshot the chain and
//! `verify_integrity()` to confirm it has not been tampered with.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use adorable_contracts::{
    error::{AdorableError, AdorableResult},
    run::RunId,
};
use adorable_core::traits::StepJournal;

use crate::{
    chain::{hash_entry, verify_chain},
    entry::{JournalEntry, JournalLog},
};

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct JournalState {
    /// All entries in append order.
    pub(crate) entries: Vec<JournalEntry>,

    /// Position in `entries` of each recorded `(run id, step)`.
    pub(crate) index: HashMap<(RunId, String), usize>,

    /// `this_hash` of the last entry, or `GENESIS_HASH` when empty.
    pub(crate) last_hash: String,
}

// ── Public journal ────────────────────────────────────────────────────────────

/// An append-only step journal backed by a SHA-256 hash chain.
#[derive(Clone)]
pub struct InMemoryStepJournal {
    pub(crate) state: Arc<Mutex<JournalState>>,
}

impl InMemoryStepJournal {
    pub fn new() -> Self {
        let state = JournalState {
            entries: Vec::new(),
            index: HashMap::new(),
            last_hash: JournalEntry::GENESIS_HASH.to_string(),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, JournalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of every entry recorded so far.
    pub fn export_log(&self) -> JournalLog {
        let state = self.lock();
        let terminal_hash = state
            .entries
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();

        JournalLog {
            entries: state.entries.clone(),
            exported_at: Utc::now(),
            terminal_hash,
        }
    }

    /// Entries of one run, in the order they were recorded.
    pub fn entries_for(&self, run_id: &RunId) -> Vec<JournalEntry> {
        self.lock()
            .entries
            .iter()
            .filter(|e| &e.run_id == run_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check linkage and hashes of the whole chain.
    pub fn verify_integrity(&self) -> bool {
        verify_chain(&self.lock().entries)
    }
}

impl Default for InMemoryStepJournal {
    fn default() -> Self {
        Self::new()
    }
}

// ── StepJournal impl ──────────────────────────────────────────────────────────

#[async_trait]
impl StepJournal for InMemoryStepJournal {
    async fn load(&self, run_id: &RunId, step: &str) -> AdorableResult<Option<Value>> {
        let state = self.lock();
        let Some(&position) = state.index.get(&(run_id.clone(), step.to_string())) else {
            return Ok(None);
        };
        state
            .entries
            .get(position)
            .map(|entry| Some(entry.value.clone()))
            .ok_or_else(|| AdorableError::JournalFailed {
                reason: format!("index points past the end of the journal for step '{step}'"),
            })
    }

    /// Append the step to the chain. A step already recorded for the run
    /// keeps its first value and nothing is appended.
    async fn record(&self, run_id: &RunId, step: &str, value: &Value) -> AdorableResult<()> {
        let mut state = self.lock();
        let key = (run_id.clone(), step.to_string());
        if state.index.contains_key(&key) {
            debug!(run_id = %run_id, step, "step already recorded; keeping first value");
            return Ok(());
        }

        let sequence = state.entries.len() as u64;
        let prev_hash = state.last_hash.clone();
        let recorded_at = Utc::now();
        let this_hash = hash_entry(run_id, sequence, step, value, &recorded_at, &prev_hash);

        state.entries.push(JournalEntry {
            sequence,
            run_id: run_id.clone(),
            step: step.to_string(),
            value: value.clone(),
            recorded_at,
            prev_hash,
            this_hash: this_hash.clone(),
        });
        state.index.insert(key, sequence as usize);
        state.last_hash = this_hash;

        debug!(run_id = %run_id, step, sequence, "step journaled");
        Ok(())
    }
}
