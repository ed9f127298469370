//! A scripted language model and helpers for writing scripts.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use serde_json::{json, Value};

use adorable_contracts::{
    completion::{SUMMARY_CLOSE, SUMMARY_OPEN},
    error::AdorableResult,
    model::{ModelRequest, ModelResponse},
    tool::{ToolCall, ToolName},
};
use adorable_core::traits::LanguageModel;

/// Reply used once the script runs out.
pub const FALLBACK_REPLY: &str = "Still working on it.";

/// Replays a fixed list of responses, one per call, then answers
/// `FALLBACK_REPLY` forever.
pub struct ScriptedModel {
    responses: Mutex<VecDeque<ModelResponse>>,
    calls: Arc<Mutex<u32>>,
}

impl ScriptedModel {
    pub fn new(responses: Vec<ModelResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Number of completions served so far.
    pub fn calls(&self) -> u32 {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, _request: &ModelRequest) -> AdorableResult<ModelResponse> {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        let next = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        Ok(next.unwrap_or_else(|| ModelResponse::text(FALLBACK_REPLY)))
    }
}

// ── Script helpers ───────────────────────────────────────────────────────────

fn call(id: &str, tool: &str, arguments: Value) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: tool.to_string(),
        arguments,
    }
}

/// A turn that only calls tools.
pub fn tool_turn(calls: Vec<ToolCall>) -> ModelResponse {
    ModelResponse {
        content: None,
        tool_calls: calls,
    }
}

/// A `createOrUpdateFile` call writing `files` in order.
pub fn write_files(id: &str, files: &[(&str, &str)]) -> ToolCall {
    let entries: Vec<Value> = files
        .iter()
        .map(|(path, content)| json!({ "path": path, "content": content }))
        .collect();
    call(id, ToolName::WriteFiles.as_str(), json!({ "files": entries }))
}

/// A `terminal` call running `command`.
pub fn run_command(id: &str, command: &str) -> ToolCall {
    call(id, ToolName::RunCommand.as_str(), json!({ "command": command }))
}

/// A `readFiles` call.
pub fn read_files(id: &str, paths: &[&str]) -> ToolCall {
    call(id, ToolName::ReadFiles.as_str(), json!({ "files": paths }))
}

/// A call to a tool name outside the registered set.
pub fn unknown_tool(id: &str, name: &str) -> ToolCall {
    call(id, name, json!({}))
}

/// A final turn carrying the completion marker around `summary`.
pub fn summary(text: &str) -> ModelResponse {
    ModelResponse::text(format!("{SUMMARY_OPEN}{text}{SUMMARY_CLOSE}"))
}

#[cfg(test)]
mod tests {
    use adorable_contracts::{
        completion::{parse_completion, CompletionSignal},
        model::ModelRequest,
    };
    use adorable_core::traits::LanguageModel;

    use super::{summary, tool_turn, write_files, ScriptedModel, FALLBACK_REPLY};

    fn request() -> ModelRequest {
        ModelRequest {
            system: String::new(),
            messages: vec![],
            tools: vec![],
        }
    }

    #[tokio::test]
    async fn test_replays_script_then_falls_back() {
        let model = ScriptedModel::new(vec![
            tool_turn(vec![write_files("c1", &[("a.tsx", "a")])]),
            summary("Done"),
        ]);

        let first = model.complete(&request()).await.unwrap();
        let second = model.complete(&request()).await.unwrap();
        let third = model.complete(&request()).await.unwrap();

        assert_eq!(first.tool_calls.len(), 1);
        assert_eq!(
            parse_completion(second.content.as_deref().unwrap()),
            CompletionSignal::Complete("Done".to_string())
        );
        assert_eq!(third.content.as_deref(), Some(FALLBACK_REPLY));
        assert_eq!(model.calls(), 3);
    }

    #[test]
    fn test_write_files_arguments() {
        let call = write_files("c1", &[("app/page.tsx", "x"), ("app/b.tsx", "y")]);
        assert_eq!(call.name, "createOrUpdateFile");
        assert_eq!(call.arguments["files"][1]["path"], "app/b.tsx");
    }
}
