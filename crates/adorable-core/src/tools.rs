//! The tool registry: the bridge from model tool calls to sandbox effects.
//!
//! Every call goes through `prepare` first, which maps the raw name onto the
//! closed `ToolName` set and runs the argument validator. Nothing reaches the
//! sandbox unless both pass. Execution failures are folded into an
//! error-tagged `ToolOutput` so the model sees them as conversation, never as
//! a fault of the run.

use tracing::{debug, warn};

use adorable_contracts::{
    error::{AdorableError, AdorableResult},
    sandbox::{CommandBuffers, SandboxId},
    state::FileDelta,
    tool::{
        FileEntry, ReadFilesArgs, RunCommandArgs, ToolCall, ToolDefinition, ToolInvocation,
        ToolName, ToolOutcome, ToolOutput, WriteFilesArgs,
    },
};

use crate::traits::{ArgumentValidator, SandboxProvisioner};

/// The three registered tools plus the validator guarding them.
pub struct ToolRegistry {
    validator: Box<dyn ArgumentValidator>,
}

impl ToolRegistry {
    pub fn new(validator: Box<dyn ArgumentValidator>) -> Self {
        Self { validator }
    }

    /// Definitions advertised to the model, one per registered tool.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        ToolName::ALL.iter().map(ToolName::definition).collect()
    }

    /// Map `call` onto a registered tool and validate its arguments.
    ///
    /// # Errors
    ///
    /// `UnknownTool` for a name outside the registered set,
    /// `InvalidToolArguments` when validation or decoding fails.
    pub fn prepare(&self, call: &ToolCall) -> AdorableResult<ToolInvocation> {
        let tool: ToolName = call.name.parse()?;

        let report = self.validator.validate(tool, &call.arguments)?;
        if !report.passed {
            return Err(AdorableError::InvalidToolArguments {
                tool: tool.to_string(),
                reason: report.summary(),
            });
        }

        ToolInvocation::decode(tool, &call.arguments)
    }

    /// Validate and execute `call` against the run's sandbox.
    ///
    /// Never fails: a rejected or failing call yields an error-tagged output
    /// and whatever file writes were committed before the failure.
    pub async fn invoke(
        &self,
        provisioner: &dyn SandboxProvisioner,
        sandbox_id: &SandboxId,
        call: &ToolCall,
    ) -> ToolOutcome {
        match self.prepare(call) {
            Ok(invocation) => execute(provisioner, sandbox_id, &invocation).await,
            Err(e) => {
                warn!(tool = %call.name, call_id = %call.id, error = %e, "tool call rejected");
                ToolOutcome::without_writes(ToolOutput::error(format!("Error: {e}")))
            }
        }
    }
}

/// Execute an already validated invocation.
pub async fn execute(
    provisioner: &dyn SandboxProvisioner,
    sandbox_id: &SandboxId,
    invocation: &ToolInvocation,
) -> ToolOutcome {
    debug!(tool = %invocation.tool(), sandbox_id = %sandbox_id, "executing tool");
    match invocation {
        ToolInvocation::RunCommand(args) => run_command(provisioner, sandbox_id, args).await,
        ToolInvocation::WriteFiles(args) => write_files(provisioner, sandbox_id, args).await,
        ToolInvocation::ReadFiles(args) => read_files(provisioner, sandbox_id, args).await,
    }
}

// ── run-command ──────────────────────────────────────────────────────────────

async fn run_command(
    provisioner: &dyn SandboxProvisioner,
    sandbox_id: &SandboxId,
    args: &RunCommandArgs,
) -> ToolOutcome {
    let mut buffers = CommandBuffers::default();

    let output = match exec_command(provisioner, sandbox_id, &args.command, &mut buffers).await {
        Ok(()) => ToolOutput::ok(buffers.stdout),
        Err(e) => {
            warn!(sandbox_id = %sandbox_id, command = %args.command, error = %e, "command failed");
            ToolOutput::error(format!(
                "Command failed: {e}\nstdout: {}\nstderr: {}",
                buffers.stdout, buffers.stderr
            ))
        }
    };

    ToolOutcome::without_writes(output)
}

async fn exec_command(
    provisioner: &dyn SandboxProvisioner,
    sandbox_id: &SandboxId,
    command: &str,
    buffers: &mut CommandBuffers,
) -> AdorableResult<()> {
    let sandbox = provisioner.resolve(sandbox_id).await?;
    sandbox.run_command(command, buffers).await
}

// ── write-files ──────────────────────────────────────────────────────────────

async fn write_files(
    provisioner: &dyn SandboxProvisioner,
    sandbox_id: &SandboxId,
    args: &WriteFilesArgs,
) -> ToolOutcome {
    let mut delta = FileDelta::default();

    let sandbox = match provisioner.resolve(sandbox_id).await {
        Ok(sandbox) => sandbox,
        Err(e) => {
            warn!(sandbox_id = %sandbox_id, error = %e, "sandbox lookup failed before writing");
            return ToolOutcome::without_writes(ToolOutput::error(format!("Error: {e}")));
        }
    };

    for FileEntry { path, content } in &args.files {
        if let Err(e) = sandbox.write_file(path, content).await {
            warn!(
                sandbox_id = %sandbox_id,
                path = %path,
                written = delta.writes.len(),
                error = %e,
                "file write failed; keeping earlier writes"
            );
            return ToolOutcome {
                output: ToolOutput::error(format!("Error: failed to write '{path}': {e}")),
                delta,
            };
        }
        delta.record(path.clone(), content.clone());
    }

    let written: Vec<&str> = delta.writes.iter().map(|(path, _)| path.as_str()).collect();
    let output = ToolOutput::ok(format!("Wrote {} file(s): {}", written.len(), written.join(", ")));
    ToolOutcome { output, delta }
}

// ── read-files ───────────────────────────────────────────────────────────────

async fn read_files(
    provisioner: &dyn SandboxProvisioner,
    sandbox_id: &SandboxId,
    args: &ReadFilesArgs,
) -> ToolOutcome {
    let output = match read_all(provisioner, sandbox_id, &args.files).await {
        Ok(entries) => match serde_json::to_string(&entries) {
            Ok(json) => ToolOutput::ok(json),
            Err(e) => ToolOutput::error(format!("Error: {e}")),
        },
        Err(e) => {
            warn!(sandbox_id = %sandbox_id, error = %e, "file read failed");
            ToolOutput::error(format!("Error: {e}"))
        }
    };

    ToolOutcome::without_writes(output)
}

async fn read_all(
    provisioner: &dyn SandboxProvisioner,
    sandbox_id: &SandboxId,
    paths: &[String],
) -> AdorableResult<Vec<FileEntry>> {
    let sandbox = provisioner.resolve(sandbox_id).await?;
    let mut entries = Vec::with_capacity(paths.len());
    for path in paths {
        let content = sandbox.read_file(path).await?;
        entries.push(FileEntry {
            path: path.clone(),
            content,
        });
    }
    Ok(entries)
}

// ── Tests ────────────────────────────────────────────────────────────────────
