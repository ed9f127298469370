//! # adorable-sim
//!
//! In-memory backends and reference scenarios for the Adorable runtime.
//!
//! The scenarios run the real orchestrator, argument validator, message
//! store, and hash-chained step journal against a simulated sandbox and a
//! scripted model:
//!
//! A. **Counter App**: one file written, completion on the second iteration.
//! B. **Iteration Exhaustion**: no completion marker, stopped at the cap.
//! C. **Partial Write**: the second file of a batch is rejected.
//! D. **Provisioning Failure**: sandbox creation fails, the user message is
//!    followed by the generic error record.
//! E. **Command Failure**: a failing command's output is handed back to the
//!    model.
//!
//! No processes are spawned and no network calls are made.

pub mod model;
pub mod sandbox;
pub mod scenarios;

pub use model::ScriptedModel;
pub use sandbox::{CommandScript, InMemoryProvisioner};
