//! Scenario A: Counter App
//!
//! The model writes one file, then signals completion on the second
//! iteration. The run ends successfully with a fragment that carries the
//! written file and the sandbox's preview URL.

use adorable_contracts::error::AdorableResult;

use crate::{
    model::{summary, tool_turn, write_files},
    sandbox::InMemoryProvisioner,
    scenarios::{print_journal, print_outcome, Harness, Played},
};

pub const INSTRUCTION: &str = "Build a counter app with + and - buttons";

pub const COUNTER_PAGE: &str = r#""use client";
import { useState } from "react";

export default function Page() {
  const [count, setCount] = useState(0);
  return (
    <main>
      <button onClick={() => setCount(count - 1)}>-</button>
      <span>{count}</span>
      <button onClick={() => setCount(count + 1)}>+</button>
    </main>
  );
}
"#;

/// Drive the scenario and hand back the harness for inspection.
pub async fn play() -> AdorableResult<(Harness, Played)> {
    let harness = Harness::new(
        vec![
            tool_turn(vec![write_files("call_1", &[("app/page.tsx", COUNTER_PAGE)])]),
            summary("Done"),
        ],
        InMemoryProvisioner::new(),
    );
    let played = harness.run(INSTRUCTION).await?;
    Ok((harness, played))
}

/// Run Scenario A.
pub async fn run_scenario() -> AdorableResult<()> {
    println!("=== Scenario A: Counter App ===");
    println!();
    println!("  Instruction: {INSTRUCTION}");

    let (harness, played) = play().await?;
    let outcome = played.result?;

    print_outcome(&outcome);
    print_journal(&harness, &played.run_id);
    println!("  Messages persisted:     {}", harness.messages().len());
    println!(
        "  RESULT: {}",
        if outcome.is_error { "ERROR (unexpected)" } else { "SUCCESS (expected)" }
    );
    println!();
    Ok(())
}
