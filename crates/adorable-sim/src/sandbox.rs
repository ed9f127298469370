//! Simulated sandbox backend.
//!
//! All state lives in memory. No processes are spawned and no network is
//! touched. Commands only produce the output scripted for them; any other
//! command succeeds silently.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use tracing::debug;

use adorable_contracts::{
    error::{AdorableError, AdorableResult},
    sandbox::{CommandBuffers, SandboxId},
};
use adorable_core::traits::{SandboxHandle, SandboxProvisioner};

/// Domain the simulated preview hosts live under.
pub const SIM_DOMAIN: &str = "sim.adorable.dev";

/// Output and exit status scripted for one command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandScript {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandScript {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: 0,
        }
    }

    /// A command that prints `stdout` and `stderr`, then exits non-zero.
    pub fn failing(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code: 1,
        }
    }
}

#[derive(Default)]
struct SimSandbox {
    template: String,
    files: BTreeMap<String, String>,
    commands: Vec<String>,
}

#[derive(Default)]
struct SimState {
    next_id: u32,
    sandboxes: HashMap<SandboxId, SimSandbox>,
    create_failure: Option<String>,
    scripts: HashMap<String, CommandScript>,
    failing_writes: HashSet<String>,
}

/// An in-memory `SandboxProvisioner`. Clones share state.
#[derive(Clone, Default)]
pub struct InMemoryProvisioner {
    state: Arc<Mutex<SimState>>,
}

impl InMemoryProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provisioner whose `create` always fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        let provisioner = Self::new();
        provisioner.lock().create_failure = Some(reason.into());
        provisioner
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Script the result of `command` in every sandbox.
    pub fn script_command(&self, command: impl Into<String>, script: CommandScript) {
        self.lock().scripts.insert(command.into(), script);
    }

    /// Make every write to `path` fail.
    pub fn fail_writes_to(&self, path: impl Into<String>) {
        self.lock().failing_writes.insert(path.into());
    }

    /// Number of sandboxes created so far.
    pub fn created(&self) -> u32 {
        self.lock().next_id
    }

    /// Current files of `sandbox_id`.
    pub fn files(&self, sandbox_id: &SandboxId) -> Option<BTreeMap<String, String>> {
        self.lock().sandboxes.get(sandbox_id).map(|s| s.files.clone())
    }

    /// Commands run in `sandbox_id`, in order.
    pub fn commands(&self, sandbox_id: &SandboxId) -> Vec<String> {
        self.lock()
            .sandboxes
            .get(sandbox_id)
            .map(|s| s.commands.clone())
            .unwrap_or_default()
    }

    /// Template `sandbox_id` was created from.
    pub fn template(&self, sandbox_id: &SandboxId) -> Option<String> {
        self.lock().sandboxes.get(sandbox_id).map(|s| s.template.clone())
    }
}

#[async_trait]
impl SandboxProvisioner for InMemoryProvisioner {
    async fn create(&self, template: &str) -> AdorableResult<SandboxId> {
        let mut state = self.lock();
        if let Some(reason) = &state.create_failure {
            return Err(AdorableError::SandboxProvisioning {
                reason: reason.clone(),
            });
        }

        state.next_id += 1;
        let sandbox_id = SandboxId::new(format!("sbx-{}", state.next_id));
        let mut files = BTreeMap::new();
        files.insert(
            "app/page.tsx".to_string(),
            "export default function Page() {\n  return null;\n}\n".to_string(),
        );
        files.insert("package.json".to_string(), "{ \"name\": \"app\" }\n".to_string());
        state.sandboxes.insert(
            sandbox_id.clone(),
            SimSandbox {
                template: template.to_string(),
                files,
                commands: Vec::new(),
            },
        );

        debug!(sandbox_id = %sandbox_id, template, "simulated sandbox created");
        Ok(sandbox_id)
    }

    async fn resolve(&self, sandbox_id: &SandboxId) -> AdorableResult<Box<dyn SandboxHandle>> {
        if !self.lock().sandboxes.contains_key(sandbox_id) {
            return Err(AdorableError::SandboxUnavailable {
                sandbox_id: sandbox_id.to_string(),
                reason: "no such sandbox".to_string(),
            });
        }
        Ok(Box::new(SimHandle {
            id: sandbox_id.clone(),
            provisioner: self.clone(),
        }))
    }
}

/// A handle onto one simulated sandbox.
pub struct SimHandle {
    id: SandboxId,
    provisioner: InMemoryProvisioner,
}

impl SimHandle {
    fn with_sandbox<T>(&self, f: impl FnOnce(&mut SimState, &SandboxId) -> AdorableResult<T>) -> AdorableResult<T> {
        let mut state = self.provisioner.lock();
        if !state.sandboxes.contains_key(&self.id) {
            return Err(AdorableError::SandboxUnavailable {
                sandbox_id: self.id.to_string(),
                reason: "sandbox was removed".to_string(),
            });
        }
        f(&mut state, &self.id)
    }
}

#[async_trait]
impl SandboxHandle for SimHandle {
    async fn run_command(&self, command: &str, buffers: &mut CommandBuffers) -> AdorableResult<()> {
        self.with_sandbox(|state, id| {
            if let Some(sandbox) = state.sandboxes.get_mut(id) {
                sandbox.commands.push(command.to_string());
            }
            let Some(script) = state.scripts.get(command) else {
                return Ok(());
            };
            if !script.stdout.is_empty() {
                buffers.push_stdout(&script.stdout);
            }
            if !script.stderr.is_empty() {
                buffers.push_stderr(&script.stderr);
            }
            if script.exit_code != 0 {
                return Err(AdorableError::SandboxOperation {
                    reason: format!("command exited with code {}", script.exit_code),
                });
            }
            Ok(())
        })
    }

    async fn write_file(&self, path: &str, content: &str) -> AdorableResult<()> {
        self.with_sandbox(|state, id| {
            if state.failing_writes.contains(path) {
                return Err(AdorableError::SandboxOperation {
                    reason: format!("write to '{path}' rejected"),
                });
            }
            if let Some(sandbox) = state.sandboxes.get_mut(id) {
                sandbox.files.insert(path.to_string(), content.to_string());
            }
            Ok(())
        })
    }

    async fn read_file(&self, path: &str) -> AdorableResult<String> {
        self.with_sandbox(|state, id| {
            state
                .sandboxes
                .get(id)
                .and_then(|s| s.files.get(path).cloned())
                .ok_or_else(|| AdorableError::SandboxOperation {
                    reason: format!("no such file: {path}"),
                })
        })
    }

    fn host(&self, port: u16) -> String {
        format!("{port}-{}.{SIM_DOMAIN}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use adorable_contracts::{error::AdorableError, sandbox::CommandBuffers, sandbox::SandboxId};
    use adorable_core::traits::{public_url, SandboxProvisioner};

    use super::{CommandScript, InMemoryProvisioner};

    #[tokio::test]
    async fn test_create_assigns_distinct_ids() {
        let provisioner = InMemoryProvisioner::new();

        let a = provisioner.create("adorable-nextjs").await.unwrap();
        let b = provisioner.create("adorable-nextjs").await.unwrap();

        assert_ne!(a, b);
        assert_eq!(provisioner.created(), 2);
        assert_eq!(provisioner.template(&a).as_deref(), Some("adorable-nextjs"));
    }

    #[tokio::test]
    async fn test_failing_create() {
        let provisioner = InMemoryProvisioner::failing("quota exceeded");
        let err = provisioner.create("t").await.unwrap_err();
        assert!(matches!(err, AdorableError::SandboxProvisioning { .. }));
    }

    #[tokio::test]
    async fn test_resolve_unknown_sandbox() {
        let provisioner = InMemoryProvisioner::new();
        let result = provisioner.resolve(&SandboxId::new("sbx-404")).await;
        assert!(matches!(result, Err(AdorableError::SandboxUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_files_round_trip_through_handle() {
        let provisioner = InMemoryProvisioner::new();
        let id = provisioner.create("t").await.unwrap();
        let handle = provisioner.resolve(&id).await.unwrap();

        handle.write_file("app/counter.tsx", "count").await.unwrap();

        assert_eq!(handle.read_file("app/counter.tsx").await.unwrap(), "count");
        assert!(handle.read_file("missing.tsx").await.is_err());
        assert_eq!(public_url(handle.as_ref(), 3000), "https://3000-sbx-1.sim.adorable.dev");
    }

    #[tokio::test]
    async fn test_failing_command_keeps_partial_output() {
        let provisioner = InMemoryProvisioner::new();
        provisioner.script_command("npm run build", CommandScript::failing("abc", "err"));
        let id = provisioner.create("t").await.unwrap();
        let handle = provisioner.resolve(&id).await.unwrap();
        let mut buffers = CommandBuffers::default();

        let result = handle.run_command("npm run build", &mut buffers).await;

        assert!(result.is_err());
        assert_eq!(buffers.stdout, "abc");
        assert_eq!(buffers.stderr, "err");
        assert_eq!(provisioner.commands(&id), vec!["npm run build".to_string()]);
    }
}
