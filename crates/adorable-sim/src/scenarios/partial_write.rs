//! Scenario C: Partial Write
//!
//! One `createOrUpdateFile` call carries two files and the sandbox rejects
//! the second. The first write is kept in the agent state, the model is told
//! about the failure, and it still finishes with a summary.

use adorable_contracts::error::AdorableResult;

use crate::{
    model::{summary, tool_turn, write_files},
    sandbox::InMemoryProvisioner,
    scenarios::{print_journal, print_outcome, Harness, Played},
};

pub const INSTRUCTION: &str = "Build a landing page with a header component";

/// Path the sandbox refuses to write.
pub const REJECTED_PATH: &str = "components/header.tsx";

pub async fn play() -> AdorableResult<(Harness, Played)> {
    let provisioner = InMemoryProvisioner::new();
    provisioner.fail_writes_to(REJECTED_PATH);

    let harness = Harness::new(
        vec![
            tool_turn(vec![write_files(
                "call_1",
                &[
                    ("app/page.tsx", "export default function Page() { return <main />; }\n"),
                    (REJECTED_PATH, "export function Header() { return <header />; }\n"),
                ],
            )]),
            summary("Landing page written; the header could not be saved."),
        ],
        provisioner,
    );
    let played = harness.run(INSTRUCTION).await?;
    Ok((harness, played))
}

/// Run Scenario C.
pub async fn run_scenario() -> AdorableResult<()> {
    println!("=== Scenario C: Partial Write ===");
    println!();
    println!("  Instruction: {INSTRUCTION}");
    println!("  Sandbox rejects writes to: {REJECTED_PATH}");

    let (harness, played) = play().await?;
    let outcome = played.result?;

    print_outcome(&outcome);
    print_journal(&harness, &played.run_id);
    println!(
        "  RESULT: {}",
        if outcome.files.contains_key(REJECTED_PATH) {
            "rejected file recorded (unexpected)"
        } else {
            "earlier write kept, rejected file dropped (expected)"
        }
    );
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{play, REJECTED_PATH};

    #[tokio::test]
    async fn test_partial_write_keeps_earlier_file() {
        let (harness, played) = play().await.unwrap();
        let outcome = played.result.unwrap();

        assert!(!outcome.is_error);
        assert_eq!(outcome.files.len(), 1);
        assert!(outcome.files.contains_key("app/page.tsx"));
        assert!(!outcome.files.contains_key(REJECTED_PATH));

        let sandbox_files = harness.provisioner.files(&harness.first_sandbox()).unwrap();
        assert!(sandbox_files.contains_key("app/page.tsx"));
        assert!(!sandbox_files.contains_key(REJECTED_PATH));
    }

    #[tokio::test]
    async fn test_partial_write_reports_error_to_model() {
        let (harness, played) = play().await.unwrap();
        played.result.unwrap();

        let entry = harness
            .journal
            .entries_for(&played.run_id)
            .into_iter()
            .find(|e| e.step == "iteration-1/tool-0/createOrUpdateFile")
            .unwrap();

        assert_eq!(entry.value["output"]["is_error"], true);
        let content = entry.value["output"]["content"].as_str().unwrap();
        assert!(content.contains(REJECTED_PATH), "got: {content}");
        assert_eq!(entry.value["delta"]["writes"].as_array().unwrap().len(), 1);
    }
}
