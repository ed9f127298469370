//! Hash-chain primitives for the step journal.
//!
//! Hash input layout (bytes, in order):
//!   1. run id as its hyphenated UUID text
//!   2. sequence as 8-byte little-endian
//!   3. step name as UTF-8 bytes
//!   4. recorded_at as RFC 3339 text
//!   5. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   6. compact JSON of the recorded value

use chrono::{DateTime, Utc};
use serde_json::Value;
use sha2::{Digest, Sha256};

use adorable_contracts::run::RunId;

use crate::entry::JournalEntry;

/// Compute the SHA-256 hash of one journal entry.
///
/// Returns a lowercase 64-character hex string.
pub fn hash_entry(
    run_id: &RunId,
    sequence: u64,
    step: &str,
    value: &Value,
    recorded_at: &DateTime<Utc>,
    prev_hash: &str,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(run_id.to_string().as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(step.as_bytes());
    hasher.update(recorded_at.to_rfc3339().as_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(value.to_string().as_bytes());

    hex::encode(hasher.finalize())
}

/// Verify the integrity of a journal chain.
///
/// Valid when every entry links to its predecessor (or `GENESIS_HASH`), its
/// sequence equals its position, and its `this_hash` matches the hash
/// recomputed from its fields. An empty chain is valid.
pub fn verify_chain(entries: &[JournalEntry]) -> bool {
    let mut expected_prev = JournalEntry::GENESIS_HASH.to_string();

    for (position, entry) in entries.iter().enumerate() {
        if entry.sequence != position as u64 || entry.prev_hash != expected_prev {
            return false;
        }

        let recomputed = hash_entry(
            &entry.run_id,
            entry.sequence,
            &entry.step,
            &entry.value,
            &entry.recorded_at,
            &entry.prev_hash,
        );
        if entry.this_hash != recomputed {
            return false;
        }

        expected_prev = entry.this_hash.clone();
    }

    true
}
