//! Journal entry and log types.
//!
//! `JournalEntry` is a single checkpoint in the hash chain: one durable
//! step's recorded result, with sequence numbering and the SHA-256 hashes
//! that make tampering detectable. `JournalLog` is the exported snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use adorable_contracts::run::RunId;

/// A single recorded step in the journal's hash chain.
///
/// Each entry commits to the previous one via `prev_hash`. Modifying any
/// field, including the recorded `value`, invalidates `this_hash` and every
/// later `prev_hash`, which `verify_chain` detects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Position in the chain, starting at 0.
    pub sequence: u64,

    /// The run this step belongs to.
    pub run_id: RunId,

    /// Durable step name, e.g. `iteration-2/model`.
    pub step: String,

    /// The step's JSON-encoded result.
    pub value: Value,

    pub recorded_at: DateTime<Utc>,

    /// Hash of the previous entry, or `GENESIS_HASH` for the first.
    pub prev_hash: String,

    /// Hash of this entry's content, computed by `hash_entry()`.
    pub this_hash: String,
}

impl JournalEntry {
    /// The sentinel `prev_hash` of the first entry in every chain.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// A snapshot of the whole journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalLog {
    /// Every entry in chain order.
    pub entries: Vec<JournalEntry>,

    pub exported_at: DateTime<Utc>,

    /// The `this_hash` of the last entry. Empty if the journal is empty.
    pub terminal_hash: String,
}
