//! # adorable-model
//!
//! A [`LanguageModel`](adorable_core::traits::LanguageModel) backed by any
//! OpenAI-compatible chat-completions API (OpenAI, OpenRouter, ...).
//!
//! ```rust,ignore
//! use adorable_model::{ModelEndpoint, OpenAiChatModel};
//!
//! let model = OpenAiChatModel::new(ModelEndpoint {
//!     model: "openai/gpt-4o-mini".to_string(),
//!     base_url: "https://openrouter.ai/api/v1".to_string(),
//!     api_key,
//! })?;
//! ```

pub mod client;
pub mod wire;

pub use client::{ModelEndpoint, OpenAiChatModel};
