//! # adorable-contracts
//!
//! Shared types, tool schemas, and contracts for the Adorable agent runtime.
//!
//! All crates in the workspace import from here. The only logic in this
//! crate is the completion-marker parser and small invariant-keeping helpers
//! on the data types.

pub mod completion;
pub mod error;
pub mod model;
pub mod record;
pub mod run;
pub mod sandbox;
pub mod state;
pub mod tool;
pub mod validate;
