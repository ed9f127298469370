//! Conversation transcript and the request/response exchanged with the model.

use serde::{Deserialize, Serialize};

use crate::tool::{ToolCall, ToolDefinition};

/// One entry in the conversation transcript.
///
/// Only `Assistant` entries are authored by the model. Tool results are
/// recorded as `Tool` entries and never count as assistant text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    User {
        content: String,
    },
    Assistant {
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    Tool {
        call_id: String,
        name: String,
        content: String,
        is_error: bool,
    },
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    /// The text of an assistant message, if it carries any.
    pub fn assistant_text(&self) -> Option<&str> {
        match self {
            Message::Assistant {
                content: Some(text),
                ..
            } if !text.trim().is_empty() => Some(text.as_str()),
            _ => None,
        }
    }
}

/// The text of the last assistant-authored message that has text content.
///
/// Tool results and assistant messages consisting only of tool calls are
/// skipped. Returns `None` when no such message exists yet.
pub fn last_assistant_text(transcript: &[Message]) -> Option<&str> {
    transcript.iter().rev().find_map(Message::assistant_text)
}

/// Everything the model receives for one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRequest {
    pub system: String,
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
}

/// What the model returned for one turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

impl ModelResponse {
    /// A plain text reply with no tool calls.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    /// Convert into the transcript entry recording this reply.
    pub fn into_message(self) -> Message {
        Message::Assistant {
            content: self.content,
            tool_calls: self.tool_calls,
        }
    }
}
