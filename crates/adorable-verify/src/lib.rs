//! # adorable-verify
//!
//! Tool-argument validation for the Adorable runtime.
//!
//! This crate provides [`engine::SchemaValidator`], which implements the
//! [`adorable_core::traits::ArgumentValidator`] trait. Every tool call is
//! checked in two phases before anything reaches the sandbox:
//!
//! 1. **Structural** — the arguments are validated against the tool's
//!    parameter schema via the `jsonschema` crate.
//! 2. **Semantic** — built-in rules (non-blank commands, project-relative
//!    paths) followed by any custom rules registered at startup.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use adorable_verify::engine::SchemaValidator;
//!
//! let mut validator = SchemaValidator::new();
//! validator.register_rule("no-rm-rf", Box::new(|_tool, args| {
//!     match args.get("command").and_then(|v| v.as_str()) {
//!         Some(cmd) if cmd.contains("rm -rf") => Some("destructive command".to_string()),
//!         _ => None,
//!     }
//! }));
//! ```

pub mod engine;
