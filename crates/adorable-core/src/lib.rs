//! # adorable-core
//!
//! The bounded, checkpointed agent orchestration loop.
//!
//! This crate provides:
//! - The collaborator traits (`SandboxProvisioner`, `LanguageModel`,
//!   `ArgumentValidator`, `MessageStore`, `StepJournal`)
//! - The tool registry, the agent step executor, and the network router
//! - The finalizer and the `Orchestrator` that runs them in order
//! - `submit_message`, the entry point that starts a run
//!
//! ## Usage
//!
//! ```rust,ignore
//! use adorable_core::{submit_message, Orchestrator, RunSettings};
//! ```

pub mod agent;
pub mod durable;
pub mod entry;
pub mod finalizer;
pub mod network;
pub mod orchestrator;
pub mod prompt;
pub mod tools;
pub mod traits;

#[cfg(test)]
mod test_support;

pub use entry::{submit_message, Submission};
pub use orchestrator::{Orchestrator, RunSettings};
