//! The network router: drives the code agent until it completes or the
//! iteration ceiling is hit.
//!
//! State machine:
//!
//!   Iterating{1} ──step──▶ Iterating{n+1} ──…──▶ Halted{Completed | Exhausted}
//!
//! Routing is a pure function of the agent state and the iteration count,
//! evaluated before every step. No other halting path exists.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use adorable_contracts::{
    completion::CompletionSignal,
    error::AdorableResult,
    model::Message,
    state::AgentState,
};

use crate::{agent::CodeAgent, durable::RunContext};

/// Iteration ceiling used when nothing else is configured.
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// Why the network stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HaltReason {
    /// The agent committed a summary.
    Completed,
    /// The iteration ceiling was reached without a summary.
    Exhausted,
}

/// Router state between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    /// The next step to run is `iteration` (1-based).
    Iterating { iteration: u32 },
    /// No further step runs.
    Halted { reason: HaltReason, iterations: u32 },
}

/// Decide what happens after `iterations` completed steps.
///
/// Completion wins over exhaustion when both hold.
pub fn route(state: &AgentState, iterations: u32, max_iterations: u32) -> RouterState {
    if state.is_complete() {
        RouterState::Halted {
            reason: HaltReason::Completed,
            iterations,
        }
    } else if iterations >= max_iterations {
        RouterState::Halted {
            reason: HaltReason::Exhausted,
            iterations,
        }
    } else {
        RouterState::Iterating {
            iteration: iterations + 1,
        }
    }
}

/// What a finished network run hands to the finalizer.
#[derive(Debug)]
pub struct NetworkOutcome {
    pub state: AgentState,
    pub iterations: u32,
    pub halt: HaltReason,
    pub transcript: Vec<Message>,
}

/// A single-agent network with an iteration ceiling.
pub struct Network {
    agent: CodeAgent,
    max_iterations: u32,
}

impl Network {
    /// The ceiling is clamped into `1..=DEFAULT_MAX_ITERATIONS`: the agent
    /// always gets one step and never more than ten.
    pub fn new(agent: CodeAgent, max_iterations: u32) -> Self {
        Self {
            agent,
            max_iterations: max_iterations.clamp(1, DEFAULT_MAX_ITERATIONS),
        }
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Run the agent on `instruction` starting from `state`.
    ///
    /// # Errors
    ///
    /// Propagates model and journal failures from the agent step.
    pub async fn run(
        &self,
        ctx: &RunContext<'_>,
        instruction: &str,
        state: AgentState,
    ) -> AdorableResult<NetworkOutcome> {
        let run_id = ctx.steps.run_id();
        let mut transcript = vec![Message::user(instruction)];
        let mut state = state;
        let mut iterations = 0u32;

        loop {
            match route(&state, iterations, self.max_iterations) {
                RouterState::Iterating { iteration } => {
                    let output = self
                        .agent
                        .step(ctx, iteration, &mut transcript, state)
                        .await?;
                    state = output.state;
                    iterations = iteration;

                    if output.signal == CompletionSignal::Continue && output.tool_calls == 0 {
                        info!(run_id = %run_id, iteration, "agent replied without tools or summary");
                    }
                }
                RouterState::Halted { reason, iterations } => {
                    match reason {
                        HaltReason::Completed => info!(
                            run_id = %run_id,
                            iterations,
                            agent = %self.agent.name(),
                            "network halted: completed"
                        ),
                        HaltReason::Exhausted => warn!(
                            run_id = %run_id,
                            iterations,
                            max = self.max_iterations,
                            "network halted: iteration ceiling reached"
                        ),
                    }
                    return Ok(NetworkOutcome {
                        state,
                        iterations,
                        halt: reason,
                        transcript,
                    });
                }
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
