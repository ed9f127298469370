//! In-crate fakes shared by the unit tests of this crate.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use serde_json::Value;

use adorable_contracts::{
    error::{AdorableError, AdorableResult},
    model::{ModelRequest, ModelResponse},
    record::MessageRecord,
    run::RunId,
    sandbox::{CommandBuffers, SandboxId},
    tool::{ToolCall, ToolName},
    validate::{ValidationFailure, ValidationReport},
};

use crate::traits::{
    ArgumentValidator, LanguageModel, MessageStore, SandboxHandle, SandboxProvisioner, StepJournal,
};

// ── Journal ──────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryJournal {
    pub entries: Mutex<HashMap<(String, String), Value>>,
}

#[async_trait]
impl StepJournal for MemoryJournal {
    async fn load(&self, run_id: &RunId, step: &str) -> AdorableResult<Option<Value>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.get(&(run_id.to_string(), step.to_string())).cloned())
    }

    async fn record(&self, run_id: &RunId, step: &str, value: &Value) -> AdorableResult<()> {
        let mut entries = self.entries.lock().unwrap();
        entries
            .entry((run_id.to_string(), step.to_string()))
            .or_insert_with(|| value.clone());
        Ok(())
    }
}

// ── Store ────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryStore {
    pub records: Arc<Mutex<Vec<MessageRecord>>>,
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn save(&self, record: &MessageRecord) -> AdorableResult<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

// ── Sandbox ──────────────────────────────────────────────────────────────────

/// A scripted command result: stdout, stderr, and whether it fails.
#[derive(Clone)]
pub struct ScriptedCommand {
    pub stdout: String,
    pub stderr: String,
    pub fail: bool,
}

#[derive(Default)]
pub struct FakeSandbox {
    pub files: HashMap<String, String>,
    pub fail_writes: HashSet<String>,
    pub fail_reads: HashSet<String>,
    pub fail_resolve: bool,
    pub commands: HashMap<String, ScriptedCommand>,
    pub creates: u32,
    pub resolves: u32,
    pub write_calls: u32,
    pub executed: Vec<String>,
}

#[derive(Default)]
pub struct FakeProvisioner {
    pub sandbox: Arc<Mutex<FakeSandbox>>,
    pub fail_create: bool,
}

impl FakeProvisioner {
    pub fn failing() -> Self {
        Self {
            fail_create: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl SandboxProvisioner for FakeProvisioner {
    async fn create(&self, _template: &str) -> AdorableResult<SandboxId> {
        if self.fail_create {
            return Err(AdorableError::SandboxProvisioning {
                reason: "backend unavailable".to_string(),
            });
        }
        self.sandbox.lock().unwrap().creates += 1;
        Ok(SandboxId::new("sbx-test"))
    }

    async fn resolve(&self, sandbox_id: &SandboxId) -> AdorableResult<Box<dyn SandboxHandle>> {
        let mut sandbox = self.sandbox.lock().unwrap();
        sandbox.resolves += 1;
        if sandbox.fail_resolve {
            return Err(AdorableError::SandboxUnavailable {
                sandbox_id: sandbox_id.to_string(),
                reason: "sandbox expired".to_string(),
            });
        }
        drop(sandbox);
        Ok(Box::new(FakeHandle {
            id: sandbox_id.clone(),
            sandbox: self.sandbox.clone(),
        }))
    }
}

pub struct FakeHandle {
    id: SandboxId,
    sandbox: Arc<Mutex<FakeSandbox>>,
}

#[async_trait]
impl SandboxHandle for FakeHandle {
    async fn run_command(&self, command: &str, buffers: &mut CommandBuffers) -> AdorableResult<()> {
        let mut sandbox = self.sandbox.lock().unwrap();
        sandbox.executed.push(command.to_string());
        match sandbox.commands.get(command).cloned() {
            Some(scripted) => {
                buffers.push_stdout(&scripted.stdout);
                buffers.push_stderr(&scripted.stderr);
                if scripted.fail {
                    return Err(AdorableError::SandboxOperation {
                        reason: "process exited with code 1".to_string(),
                    });
                }
                Ok(())
            }
            None => {
                buffers.push_stdout("ok\n");
                Ok(())
            }
        }
    }

    async fn write_file(&self, path: &str, content: &str) -> AdorableResult<()> {
        let mut sandbox = self.sandbox.lock().unwrap();
        sandbox.write_calls += 1;
        if sandbox.fail_writes.contains(path) {
            return Err(AdorableError::SandboxOperation {
                reason: format!("disk full writing {path}"),
            });
        }
        sandbox.files.insert(path.to_string(), content.to_string());
        Ok(())
    }

    async fn read_file(&self, path: &str) -> AdorableResult<String> {
        let sandbox = self.sandbox.lock().unwrap();
        if sandbox.fail_reads.contains(path) {
            return Err(AdorableError::SandboxOperation {
                reason: format!("permission denied reading {path}"),
            });
        }
        sandbox
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| AdorableError::SandboxOperation {
                reason: format!("no such file: {path}"),
            })
    }

    fn host(&self, port: u16) -> String {
        format!("{port}-{}.sandbox.test", self.id)
    }
}

// ── Model ────────────────────────────────────────────────────────────────────

/// Replays queued responses, then keeps answering with plain text.
#[derive(Default)]
pub struct ScriptedModel {
    pub responses: Mutex<VecDeque<ModelResponse>>,
    pub requests: Arc<Mutex<Vec<ModelRequest>>>,
}

impl ScriptedModel {
    pub fn new(responses: Vec<ModelResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: &ModelRequest) -> AdorableResult<ModelResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.responses.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| ModelResponse::text("still working")))
    }
}

pub fn tool_call(id: &str, name: &str, arguments: Value) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments,
    }
}

pub fn calls(tool_calls: Vec<ToolCall>) -> ModelResponse {
    ModelResponse {
        content: None,
        tool_calls,
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

pub struct AcceptAll;

impl ArgumentValidator for AcceptAll {
    fn validate(&self, _tool: ToolName, _arguments: &Value) -> AdorableResult<ValidationReport> {
        Ok(ValidationReport::pass())
    }
}

pub struct RejectAll;

impl ArgumentValidator for RejectAll {
    fn validate(&self, _tool: ToolName, _arguments: &Value) -> AdorableResult<ValidationReport> {
        Ok(ValidationReport::from_failures(vec![ValidationFailure {
            rule_id: "test-reject".to_string(),
            message: "rejected by test validator".to_string(),
        }]))
    }
}
