//! The closed tool set advertised to the model, and tool call/result types.
//!
//! Wire names and parameter schemas defined here are part of the contract
//! the system prompt advertises. The registry and the argument validator
//! both read them from this module, so what the model is told and what the
//! runtime accepts cannot drift apart.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AdorableError, AdorableResult},
    state::FileDelta,
};

/// The three registered tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolName {
    /// Run a shell command in the sandbox.
    #[serde(rename = "terminal")]
    RunCommand,
    /// Create or overwrite files in the sandbox.
    #[serde(rename = "createOrUpdateFile")]
    WriteFiles,
    /// Read files from the sandbox.
    #[serde(rename = "readFiles")]
    ReadFiles,
}

impl ToolName {
    /// Every registered tool, in advertisement order.
    pub const ALL: [ToolName; 3] = [ToolName::RunCommand, ToolName::WriteFiles, ToolName::ReadFiles];

    /// The exact name the model must use.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::RunCommand => "terminal",
            ToolName::WriteFiles => "createOrUpdateFile",
            ToolName::ReadFiles => "readFiles",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolName::RunCommand => "Use the terminal to run commands inside the sandbox.",
            ToolName::WriteFiles => "Create or update files in the sandbox.",
            ToolName::ReadFiles => "Read files from the sandbox.",
        }
    }

    /// JSON Schema for this tool's arguments.
    pub fn parameters_schema(&self) -> Value {
        match self {
            ToolName::RunCommand => json!({
                "type": "object",
                "properties": {
                    "command": { "type": "string" }
                },
                "required": ["command"],
                "additionalProperties": false
            }),
            ToolName::WriteFiles => json!({
                "type": "object",
                "properties": {
                    "files": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "path": { "type": "string" },
                                "content": { "type": "string" }
                            },
                            "required": ["path", "content"],
                            "additionalProperties": false
                        }
                    }
                },
                "required": ["files"],
                "additionalProperties": false
            }),
            ToolName::ReadFiles => json!({
                "type": "object",
                "properties": {
                    "files": {
                        "type": "array",
                        "items": { "type": "string" }
                    }
                },
                "required": ["files"],
                "additionalProperties": false
            }),
        }
    }

    /// The definition handed to the model for this tool.
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.as_str().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = AdorableError;

    fn from_str(s: &str) -> AdorableResult<Self> {
        ToolName::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| AdorableError::UnknownTool { name: s.to_string() })
    }
}

/// A tool as presented to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// One tool invocation requested by the model.
///
/// `name` is kept as the raw string the model produced; it is only mapped
/// onto `ToolName` by the registry, which rejects anything outside the set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCommandArgs {
    pub command: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteFilesArgs {
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadFilesArgs {
    pub files: Vec<String>,
}

/// A tool call whose name and arguments have passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInvocation {
    RunCommand(RunCommandArgs),
    WriteFiles(WriteFilesArgs),
    ReadFiles(ReadFilesArgs),
}

impl ToolInvocation {
    /// Decode already-validated arguments into the typed form for `tool`.
    pub fn decode(tool: ToolName, arguments: &Value) -> AdorableResult<Self> {
        let invalid = |e: serde_json::Error| AdorableError::InvalidToolArguments {
            tool: tool.to_string(),
            reason: e.to_string(),
        };
        let invocation = match tool {
            ToolName::RunCommand => {
                ToolInvocation::RunCommand(serde_json::from_value(arguments.clone()).map_err(invalid)?)
            }
            ToolName::WriteFiles => {
                ToolInvocation::WriteFiles(serde_json::from_value(arguments.clone()).map_err(invalid)?)
            }
            ToolName::ReadFiles => {
                ToolInvocation::ReadFiles(serde_json::from_value(arguments.clone()).map_err(invalid)?)
            }
        };
        Ok(invocation)
    }

    pub fn tool(&self) -> ToolName {
        match self {
            ToolInvocation::RunCommand(_) => ToolName::RunCommand,
            ToolInvocation::WriteFiles(_) => ToolName::WriteFiles,
            ToolInvocation::ReadFiles(_) => ToolName::ReadFiles,
        }
    }
}

/// Text returned to the model for one tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub content: String,
    /// True when `content` describes a failure rather than a result.
    pub is_error: bool,
}

impl ToolOutput {
    pub fn ok(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

/// Everything one tool invocation produced: the model-facing output and the
/// file writes to fold into the agent state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub output: ToolOutput,
    pub delta: FileDelta,
}

impl ToolOutcome {
    /// An outcome that wrote nothing.
    pub fn without_writes(output: ToolOutput) -> Self {
        Self {
            output,
            delta: FileDelta::default(),
        }
    }
}
