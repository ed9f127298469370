//! Scenario D: Provisioning Failure
//!
//! The message enters through `submit_message`, so the user's instruction is
//! persisted first. Sandbox creation then fails; the run aborts before any
//! model call, persists the generic error record after the user message, and
//! returns the provisioning error.

use adorable_contracts::error::{AdorableError, AdorableResult};
use adorable_core::entry::submit_message;

use crate::{
    model::summary,
    sandbox::InMemoryProvisioner,
    scenarios::{Harness, DEMO_PROJECT},
};

pub const INSTRUCTION: &str = "Build a weather dashboard";

/// Submit the instruction and wait for the run. Returns the run's error.
pub async fn play() -> AdorableResult<(Harness, Option<AdorableError>)> {
    let harness = Harness::new(
        vec![summary("unreachable")],
        InMemoryProvisioner::failing("template quota exceeded"),
    );
    let submission = submit_message(&harness.store, &harness.orchestrator, INSTRUCTION, DEMO_PROJECT).await?;
    let run_result = submission.handle.await.map_err(|e| AdorableError::StateMachineError {
        reason: format!("run task failed: {e}"),
    })?;
    Ok((harness, run_result.err()))
}

/// Run Scenario D.
pub async fn run_scenario() -> AdorableResult<()> {
    println!("=== Scenario D: Provisioning Failure ===");
    println!();
    println!("  Instruction: {INSTRUCTION}");
    println!("  Sandbox provider: rejects every create");

    let (harness, error) = play().await?;

    match &error {
        Some(AdorableError::SandboxProvisioning { reason }) => {
            println!("  Run error:              SandboxProvisioning ({reason})");
        }
        Some(other) => println!("  Run error:              {other} (unexpected kind)"),
        None => println!("  Run error:              <none> (unexpected)"),
    }
    println!("  Model calls:            {}", harness.model.calls());
    for message in harness.messages() {
        println!("  Persisted {:?} message:  {}", message.role, message.content);
    }
    println!("  RESULT: run aborted before the agent loop with an error record (expected)");
    println!();
    Ok(())
}
