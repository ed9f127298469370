//! Scenario B: Iteration Exhaustion
//!
//! The model writes a file and then keeps talking without ever emitting the
//! completion marker. The router stops it at the iteration cap and the run
//! concludes with the generic error record, files or not.

use adorable_contracts::error::AdorableResult;

use crate::{
    model::{tool_turn, write_files},
    sandbox::InMemoryProvisioner,
    scenarios::{print_journal, print_outcome, Harness, Played},
};

pub const INSTRUCTION: &str = "Build a todo list with drag and drop";

pub async fn play() -> AdorableResult<(Harness, Played)> {
    let harness = Harness::new(
        vec![tool_turn(vec![write_files(
            "call_1",
            &[("app/page.tsx", "export default function Page() { return <ul />; }\n")],
        )])],
        InMemoryProvisioner::new(),
    );
    let played = harness.run(INSTRUCTION).await?;
    Ok((harness, played))
}

/// Run Scenario B.
pub async fn run_scenario() -> AdorableResult<()> {
    println!("=== Scenario B: Iteration Exhaustion ===");
    println!();
    println!("  Instruction: {INSTRUCTION}");
    println!("  Model behaviour: never emits a task summary");

    let (harness, played) = play().await?;
    let outcome = played.result?;

    print_outcome(&outcome);
    print_journal(&harness, &played.run_id);
    if let Some(message) = harness.messages().last() {
        println!("  Persisted message:      {}", message.content);
    }
    println!(
        "  RESULT: {}",
        if outcome.is_error { "ERROR RECORD (expected)" } else { "SUCCESS (unexpected)" }
    );
    println!();
    Ok(())
}
