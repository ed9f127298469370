//! Completion marker parsing.
//!
//! The system prompt instructs the model to finish by emitting
//!
//! ```text
//! <task_summary>
//! A short description of what was built.
//! </task_summary>
//! ```
//!
//! This module is the single place that interprets that marker. Call sites
//! receive a `CompletionSignal` and never search assistant text themselves.

use serde::{Deserialize, Serialize};

/// Opening delimiter of the completion marker.
pub const SUMMARY_OPEN: &str = "<task_summary>";
/// Closing delimiter of the completion marker.
pub const SUMMARY_CLOSE: &str = "</task_summary>";

/// What an assistant message says about task completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionSignal {
    /// No marker; the agent is still working.
    Continue,
    /// The agent considers the task finished. Carries the enclosed summary.
    Complete(String),
}

/// Parse assistant text for the completion marker.
///
/// The summary is the trimmed text between the delimiters. When the closing
/// delimiter is missing, everything after the opening one is taken.
pub fn parse_completion(text: &str) -> CompletionSignal {
    let Some(start) = text.find(SUMMARY_OPEN) else {
        return CompletionSignal::Continue;
    };
    let body = &text[start + SUMMARY_OPEN.len()..];
    let body = match body.find(SUMMARY_CLOSE) {
        Some(end) => &body[..end],
        None => body,
    };
    CompletionSignal::Complete(body.trim().to_string())
}
