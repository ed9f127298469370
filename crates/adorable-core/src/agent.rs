//! The agent step executor: one reasoning-and-acting turn of the code agent.
//!
//! A step is
//!
//!   model call → append assistant message → tool calls (sequential) → completion hook
//!
//! The model call and every tool call are durable steps, so re-entering a
//! run rebuilds the same transcript and state from the journal without
//! calling the model or touching the sandbox again.

use std::sync::Arc;

use tracing::{debug, info};

use adorable_contracts::{
    completion::{parse_completion, CompletionSignal},
    error::AdorableResult,
    model::{last_assistant_text, Message, ModelRequest, ModelResponse},
    state::AgentState,
    tool::ToolOutcome,
};

use crate::{
    durable::{model_step, tool_step, RunContext},
    tools::ToolRegistry,
    traits::LanguageModel,
};

/// What one step produced.
#[derive(Debug)]
pub struct StepOutput {
    /// State after applying every tool delta and the completion hook.
    pub state: AgentState,
    /// What the completion hook decided.
    pub signal: CompletionSignal,
    /// Number of tool calls executed in this step.
    pub tool_calls: usize,
}

/// The single agent the network dispatches to.
pub struct CodeAgent {
    name: String,
    system_prompt: String,
    model: Arc<dyn LanguageModel>,
    tools: ToolRegistry,
}

impl CodeAgent {
    pub fn new(
        name: impl Into<String>,
        system_prompt: impl Into<String>,
        model: Arc<dyn LanguageModel>,
        tools: ToolRegistry,
    ) -> Self {
        Self {
            name: name.into(),
            system_prompt: system_prompt.into(),
            model,
            tools,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execute iteration `iteration` (1-based) of the run.
    ///
    /// Appends the assistant message and one tool message per call to
    /// `transcript`, and returns the updated state.
    ///
    /// # Errors
    ///
    /// Model failures and journal failures propagate. Tool failures do not;
    /// they become error-tagged tool messages.
    pub async fn step(
        &self,
        ctx: &RunContext<'_>,
        iteration: u32,
        transcript: &mut Vec<Message>,
        mut state: AgentState,
    ) -> AdorableResult<StepOutput> {
        let run_id = ctx.steps.run_id();
        debug!(run_id = %run_id, agent = %self.name, iteration, "agent step starting");

        let request = ModelRequest {
            system: self.system_prompt.clone(),
            messages: transcript.clone(),
            tools: self.tools.definitions(),
        };
        let response: ModelResponse = ctx
            .steps
            .step(&model_step(iteration), || self.model.complete(&request))
            .await?;

        let calls = response.tool_calls.clone();
        transcript.push(response.into_message());

        for (index, call) in calls.iter().enumerate() {
            let outcome: ToolOutcome = ctx
                .steps
                .step(&tool_step(iteration, index, &call.name), || async {
                    Ok(self.tools.invoke(ctx.provisioner, ctx.sandbox_id, call).await)
                })
                .await?;

            debug!(
                run_id = %run_id,
                iteration,
                tool = %call.name,
                is_error = outcome.output.is_error,
                files_written = outcome.delta.writes.len(),
                "tool call finished"
            );

            state.apply(outcome.delta);
            transcript.push(Message::Tool {
                call_id: call.id.clone(),
                name: call.name.clone(),
                content: outcome.output.content,
                is_error: outcome.output.is_error,
            });
        }

        let signal = completion_hook(transcript, &mut state);
        if let CompletionSignal::Complete(summary) = &signal {
            info!(run_id = %run_id, iteration, summary_len = summary.len(), "agent signalled completion");
        }

        Ok(StepOutput {
            state,
            signal,
            tool_calls: calls.len(),
        })
    }
}

/// Inspect the last assistant-authored text message for the completion
/// marker and commit the summary it carries.
///
/// This is the only place `AgentState::summary` is set. With no assistant
/// text in the transcript yet, the hook does nothing.
pub fn completion_hook(transcript: &[Message], state: &mut AgentState) -> CompletionSignal {
    let Some(text) = last_assistant_text(transcript) else {
        return CompletionSignal::Continue;
    };
    let signal = parse_completion(text);
    if let CompletionSignal::Complete(summary) = &signal {
        state.commit_summary(summary.clone());
    }
    signal
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use adorable_contracts::{
        completion::CompletionSignal,
        model::{Message, ModelResponse},
        run::RunId,
        sandbox::SandboxId,
        state::AgentState,
        tool::ToolCall,
    };

    use crate::{
        durable::{DurableSteps, RunContext},
        test_support::{calls, tool_call, AcceptAll, FakeProvisioner, MemoryJournal, ScriptedModel},
        tools::ToolRegistry,
    };

    use super::{completion_hook, CodeAgent};

    fn agent(model: Arc<ScriptedModel>) -> CodeAgent {
        CodeAgent::new("code-agent", "system", model, ToolRegistry::new(Box::new(AcceptAll)))
    }

    #[test]
    fn test_hook_noop_without_assistant_text() {
        let mut state = AgentState::default();
        let transcript = vec![
            Message::user("build it"),
            Message::Assistant {
                content: None,
                tool_calls: vec![ToolCall {
                    id: "c1".to_string(),
                    name: "terminal".to_string(),
                    arguments: json!({ "command": "ls" }),
                }],
            },
        ];

        assert_eq!(completion_hook(&transcript, &mut state), CompletionSignal::Continue);
        assert!(state.summary.is_none());
    }

    #[test]
    fn test_hook_ignores_marker_in_tool_output() {
        let mut state = AgentState::default();
        let transcript = vec![
            Message::user("build it"),
            Message::Assistant {
                content: Some("reading files".to_string()),
                tool_calls: vec![],
            },
            Message::Tool {
                call_id: "c1".to_string(),
                name: "readFiles".to_string(),
                content: "<task_summary>from a file</task_summary>".to_string(),
                is_error: false,
            },
        ];

        assert_eq!(completion_hook(&transcript, &mut state), CompletionSignal::Continue);
        assert!(state.summary.is_none());
    }

    #[test]
    fn test_hook_commits_summary() {
        let mut state = AgentState::default();
        let transcript = vec![Message::Assistant {
            content: Some("<task_summary>Done</task_summary>".to_string()),
            tool_calls: vec![],
        }];

        assert_eq!(
            completion_hook(&transcript, &mut state),
            CompletionSignal::Complete("Done".to_string())
        );
        assert_eq!(state.summary.as_deref(), Some("Done"));
    }

    /// A step runs the model once, executes its tool calls in order, and
    /// appends one tool message per call.
    #[tokio::test]
    async fn test_step_executes_tool_calls_in_order() {
        let model = Arc::new(ScriptedModel::new(vec![calls(vec![
            tool_call(
                "c1",
                "createOrUpdateFile",
                json!({ "files": [{ "path": "app/page.tsx", "content": "v1" }] }),
            ),
            tool_call("c2", "terminal", json!({ "command": "npm run lint" })),
        ])]));
        let requests = model.requests.clone();
        let provisioner = FakeProvisioner::default();
        let steps = DurableSteps::new(Arc::new(MemoryJournal::default()), RunId::new());
        let sandbox_id = SandboxId::new("sbx-test");
        let ctx = RunContext {
            steps: &steps,
            provisioner: &provisioner,
            sandbox_id: &sandbox_id,
        };

        let mut transcript = vec![Message::user("a counter")];
        let output = agent(model)
            .step(&ctx, 1, &mut transcript, AgentState::default())
            .await
            .unwrap();

        assert_eq!(output.tool_calls, 2);
        assert_eq!(output.signal, CompletionSignal::Continue);
        assert_eq!(output.state.files["app/page.tsx"], "v1");
        assert_eq!(transcript.len(), 4);
        assert!(matches!(&transcript[2], Message::Tool { call_id, .. } if call_id == "c1"));
        assert!(matches!(&transcript[3], Message::Tool { call_id, .. } if call_id == "c2"));

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].tools.len(), 3);
        assert_eq!(requests[0].system, "system");
    }

    /// Replaying a step from the journal neither calls the model nor
    /// touches the sandbox, and yields the same state.
    #[tokio::test]
    async fn test_step_replay_skips_side_effects() {
        let journal = Arc::new(MemoryJournal::default());
        let run_id = RunId::new();
        let provisioner = FakeProvisioner::default();
        let sandbox_id = SandboxId::new("sbx-test");

        let first_model = Arc::new(ScriptedModel::new(vec![calls(vec![tool_call(
            "c1",
            "createOrUpdateFile",
            json!({ "files": [{ "path": "a.tsx", "content": "a" }] }),
        )])]));
        let steps = DurableSteps::new(journal.clone(), run_id.clone());
        let ctx = RunContext {
            steps: &steps,
            provisioner: &provisioner,
            sandbox_id: &sandbox_id,
        };
        let mut transcript = vec![Message::user("x")];
        let first = agent(first_model)
            .step(&ctx, 1, &mut transcript, AgentState::default())
            .await
            .unwrap();

        let replay_model = Arc::new(ScriptedModel::new(vec![ModelResponse::text("different")]));
        let replay_requests = replay_model.requests.clone();
        let steps = DurableSteps::new(journal, run_id);
        let ctx = RunContext {
            steps: &steps,
            provisioner: &provisioner,
            sandbox_id: &sandbox_id,
        };
        let mut replay_transcript = vec![Message::user("x")];
        let replayed = agent(replay_model)
            .step(&ctx, 1, &mut replay_transcript, AgentState::default())
            .await
            .unwrap();

        assert_eq!(first.state, replayed.state);
        assert_eq!(transcript, replay_transcript);
        assert!(replay_requests.lock().unwrap().is_empty());
        assert_eq!(provisioner.sandbox.lock().unwrap().write_calls, 1);
    }
}
