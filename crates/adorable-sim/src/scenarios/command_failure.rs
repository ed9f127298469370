//! Scenario E: Command Failure
//!
//! A terminal command prints to both streams and exits non-zero. The model
//! gets back an error-tagged result quoting everything captured so far,
//! fixes the file, and completes.

use adorable_contracts::error::AdorableResult;

use crate::{
    model::{run_command, summary, tool_turn, write_files},
    sandbox::{CommandScript, InMemoryProvisioner},
    scenarios::{print_journal, print_outcome, Harness, Played},
};

pub const INSTRUCTION: &str = "Build a pricing table";

pub const FAILING_COMMAND: &str = "npm run lint";

pub async fn play() -> AdorableResult<(Harness, Played)> {
    let provisioner = InMemoryProvisioner::new();
    provisioner.script_command(FAILING_COMMAND, CommandScript::failing("abc", "err"));

    let harness = Harness::new(
        vec![
            tool_turn(vec![run_command("call_1", FAILING_COMMAND)]),
            tool_turn(vec![write_files(
                "call_2",
                &[("app/page.tsx", "export default function Page() { return <table />; }\n")],
            )]),
            summary("Pricing table added after fixing lint errors."),
        ],
        provisioner,
    );
    let played = harness.run(INSTRUCTION).await?;
    Ok((harness, played))
}

/// Run Scenario E.
pub async fn run_scenario() -> AdorableResult<()> {
    println!("=== Scenario E: Command Failure ===");
    println!();
    println!("  Instruction: {INSTRUCTION}");
    println!("  Scripted failure: `{FAILING_COMMAND}` prints stdout 'abc', stderr 'err', exits 1");

    let (harness, played) = play().await?;
    let outcome = played.result?;

    let failed = harness
        .journal
        .entries_for(&played.run_id)
        .into_iter()
        .find(|e| e.step == "iteration-1/tool-0/terminal");
    if let Some(entry) = failed {
        println!(
            "  Tool result to model:   {}",
            entry.value["output"]["content"].as_str().unwrap_or_default().replace('\n', " | ")
        );
    }
    print_outcome(&outcome);
    print_journal(&harness, &played.run_id);
    println!("  RESULT: command failure surfaced to the model, run completed (expected)");
    println!();
    Ok(())
}
