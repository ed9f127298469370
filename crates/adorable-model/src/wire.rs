//! Chat-completions wire format.
//!
//! Pure conversions between the runtime's `ModelRequest`/`ModelResponse`
//! and the JSON bodies of an OpenAI-compatible `/chat/completions` endpoint.
//! Tool-call arguments travel as JSON-encoded strings on the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use adorable_contracts::{
    error::{AdorableError, AdorableResult},
    model::{Message, ModelRequest, ModelResponse},
    tool::{ToolCall, ToolDefinition},
};

// ── Request ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ChatTool>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ChatMessage {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ChatToolCall>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

#[derive(Debug, Serialize)]
pub struct ChatTool {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: ChatFunction,
}

#[derive(Debug, Serialize)]
pub struct ChatFunction {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: ChatFunctionCall,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatFunctionCall {
    pub name: String,
    /// JSON-encoded arguments.
    #[serde(default)]
    pub arguments: String,
}

fn function_kind() -> String {
    "function".to_string()
}

impl From<&ToolDefinition> for ChatTool {
    fn from(def: &ToolDefinition) -> Self {
        ChatTool {
            kind: "function",
            function: ChatFunction {
                name: def.name.clone(),
                description: def.description.clone(),
                parameters: def.parameters.clone(),
            },
        }
    }
}

impl From<&ToolCall> for ChatToolCall {
    fn from(call: &ToolCall) -> Self {
        ChatToolCall {
            id: call.id.clone(),
            kind: function_kind(),
            function: ChatFunctionCall {
                name: call.name.clone(),
                arguments: call.arguments.to_string(),
            },
        }
    }
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        match message {
            Message::User { content } => ChatMessage::User {
                content: content.clone(),
            },
            Message::Assistant { content, tool_calls } => ChatMessage::Assistant {
                content: content.clone(),
                tool_calls: tool_calls.iter().map(ChatToolCall::from).collect(),
            },
            Message::Tool { call_id, content, .. } => ChatMessage::Tool {
                tool_call_id: call_id.clone(),
                content: content.clone(),
            },
        }
    }
}

/// Build the request body for `model`.
pub fn chat_request(model: &str, request: &ModelRequest) -> ChatRequest {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    messages.push(ChatMessage::System {
        content: request.system.clone(),
    });
    messages.extend(request.messages.iter().map(ChatMessage::from));

    ChatRequest {
        model: model.to_string(),
        messages,
        tools: request.tools.iter().map(ChatTool::from).collect(),
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ChatToolCall>>,
}

/// Decode a tool call's argument string.
///
/// Blank arguments decode to `{}`. Arguments that are not valid JSON are
/// kept as a JSON string so the argument validator rejects them and the
/// model sees why.
pub fn decode_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Object(Default::default());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Convert the first choice of `response` into a `ModelResponse`.
///
/// # Errors
///
/// `ModelInvocation` when the response has no choices.
pub fn model_response(response: ChatResponse) -> AdorableResult<ModelResponse> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AdorableError::ModelInvocation {
            reason: "response contained no choices".to_string(),
        })?;

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| ToolCall {
            id: call.id,
            name: call.function.name,
            arguments: decode_arguments(&call.function.arguments),
        })
        .collect();

    Ok(ModelResponse {
        content: choice.message.content,
        tool_calls,
    })
}
