//! # adorable-config
//!
//! TOML configuration for the Adorable runtime.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use adorable_config::AdorableConfig;
//!
//! let config = AdorableConfig::from_file(Path::new("adorable.toml"))?;
//! let api_key = config.model.resolve_api_key()?;
//! let settings = config.run_settings();
//! ```
//!
//! The API key is resolved once, at startup, and handed to the model client
//! explicitly. Nothing downstream reads the environment.

pub mod config;

pub use config::{AdorableConfig, ModelConfig, RunConfig, SandboxConfig};

// ── Tests ─────────────────────────────────────────────────────────────────────
