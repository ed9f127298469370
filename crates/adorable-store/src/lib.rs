//! # adorable-store
//!
//! Persistence backends for the Adorable runtime.
//!
//! ## Overview
//!
//! - `InMemoryMessageStore` keeps user and terminal messages, listable per
//!   project.
//! - `InMemoryStepJournal` checkpoints every durable step in an append-only
//!   SHA-256 hash chain. Replays read from it; audits verify it. Tampering
//!   with any recorded step breaks the chain and is caught by `verify_chain`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use adorable_store::{InMemoryMessageStore, InMemoryStepJournal};
//!
//! let journal = InMemoryStepJournal::new();
//! // ... run the orchestrator against it ...
//! assert!(journal.verify_integrity());
//! let log = journal.export_log();
//! ```

pub mod chain;
pub mod entry;
pub mod journal;
pub mod messages;

pub use chain::{hash_entry, verify_chain};
pub use entry::{JournalEntry, JournalLog};
pub use journal::InMemoryStepJournal;
pub use messages::InMemoryMessageStore;

// ── Tests ─────────────────────────────────────────────────────────────────────
