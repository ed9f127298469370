//! Persisted message records and the terminal record that concludes a run.
//!
//! `TerminalRecord` is what the finalizer decides; `MessageRecord` is the row
//! shape the message store persists. Exactly one terminal record is written
//! per run, always tagged as assistant-authored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{run::ProjectId, state::FileMap};

/// The only text a user ever sees for a failed run. Internal error detail
/// goes to logs, not here.
pub const ERROR_MESSAGE: &str = "Something went wrong. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Result,
    Error,
}

/// Preview URL, title, and produced files attached to a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub sandbox_url: String,
    pub title: String,
    pub files: FileMap,
}

/// The single record that concludes a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TerminalRecord {
    /// Fixed user-facing message, no fragment.
    Error { content: String },
    /// The agent's summary plus the fragment it produced.
    Result { content: String, fragment: Fragment },
}

impl TerminalRecord {
    /// The generic error record.
    pub fn error() -> Self {
        TerminalRecord::Error {
            content: ERROR_MESSAGE.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TerminalRecord::Error { .. })
    }

    /// Convert into the assistant-authored row persisted for `project_id`.
    pub fn into_message(self, project_id: ProjectId) -> MessageRecord {
        match self {
            TerminalRecord::Error { content } => MessageRecord::new(
                project_id,
                content,
                MessageRole::Assistant,
                MessageType::Error,
                None,
            ),
            TerminalRecord::Result { content, fragment } => MessageRecord::new(
                project_id,
                content,
                MessageRole::Assistant,
                MessageType::Result,
                Some(fragment),
            ),
        }
    }
}

/// A persisted chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: uuid::Uuid,
    pub project_id: ProjectId,
    pub content: String,
    pub role: MessageRole,
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub fragment: Option<Fragment>,
    pub created_at: DateTime<Utc>,
}

impl MessageRecord {
    pub fn new(
        project_id: ProjectId,
        content: impl Into<String>,
        role: MessageRole,
        kind: MessageType,
        fragment: Option<Fragment>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            project_id,
            content: content.into(),
            role,
            kind,
            fragment,
            created_at: Utc::now(),
        }
    }

    /// The row recording the user's own instruction.
    pub fn user(project_id: ProjectId, content: impl Into<String>) -> Self {
        Self::new(project_id, content, MessageRole::User, MessageType::Result, None)
    }
}

/// What the orchestrator hands back to whoever triggered the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub url: String,
    pub title: String,
    pub files: FileMap,
    pub summary: Option<String>,
    pub is_error: bool,
    pub iterations: u32,
}
