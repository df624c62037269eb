//! The ReAct agent loop (§4.4 "Agent loop").
//!
//! Bounded turns, a wall-clock timeout, observation truncation, and a
//! post-hoc validation step before the answer is trusted. Turn/timeout
//! bounds and the acceptance bar all come from `RecallConfig` rather than
//! being baked in here, so a deployment can tune the agent without a
//! recompile.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use weave_core::config::RecallConfig;

use crate::agent::parser::{parse_react_output, FinalAnswer};
use crate::agent::tools::RecallTool;

const OBSERVATION_MAX_CHARS: usize = 6000;

/// The main LLM's text-completion boundary, kept independent of any
/// particular provider so the agent loop can be tested with a scripted
/// stand-in.
#[async_trait]
pub trait AgentLlm: Send + Sync {
    async fn complete(&self, transcript: &str) -> Result<String, String>;
}

/// Outcome of one `AgentRunner::run` call. Always returned, never panics:
/// a failed run reports `success: false` with `error` set rather than
/// propagating, matching the best-effort recall contract (§4.4, §7 kind 3).
/// `answer` is the literal Rust shape of the original `(answer, turns, trace,
/// success, error)` tuple contract (§7): either `{"relevant_scenes": [..]}`
/// or a plain JSON string, depending on what the model's `Final Answer`
/// resolved to.
#[derive(Debug, Clone, Default)]
pub struct AgentResult {
    pub answer: Option<serde_json::Value>,
    pub turns_used: u32,
    pub trace: Vec<String>,
    pub success: bool,
    pub error: Option<String>,
}

pub struct AgentRunner {
    llm: Arc<dyn AgentLlm>,
    tools: HashMap<&'static str, Arc<dyn RecallTool>>,
    config: RecallConfig,
}

impl AgentRunner {
    pub fn new(llm: Arc<dyn AgentLlm>, tools: Vec<Arc<dyn RecallTool>>, config: RecallConfig) -> Self {
        let tools = tools.into_iter().map(|t| (t.name(), t)).collect();
        Self { llm, tools, config }
    }

    fn system_prompt(&self, question: &str) -> String {
        let mut tool_names: Vec<&str> = self.tools.keys().copied().collect();
        tool_names.sort_unstable();
        format!(
            "You are a recall agent answering: {question}\n\
             Available tools: {tools}\n\
             Respond with `Thought:`, then either `Action:`/`Action Input:` or `Final Answer:`.\n\
             Final Answer must be JSON: {{\"relevant_scenes\": [..]}} or a short text answer.",
            tools = tool_names.join(", "),
        )
    }

    /// Runs the loop to completion, a parse failure, a missing-tool error,
    /// or the turn/timeout bound, whichever comes first.
    pub async fn run(&self, question: &str) -> AgentResult {
        let timeout_secs = self.config.agent_timeout_secs;
        match tokio::time::timeout(Duration::from_secs(timeout_secs), self.run_inner(question)).await {
            Ok(result) => result,
            Err(_) => AgentResult { success: false, error: Some(format!("recall agent exceeded {timeout_secs}s timeout")), ..Default::default() },
        }
    }

    async fn run_inner(&self, question: &str) -> AgentResult {
        let mut transcript = self.system_prompt(question);
        let mut trace = Vec::new();
        let max_turns = self.config.agent_max_turns;

        for turn in 1..=max_turns {
            let raw = match self.llm.complete(&transcript).await {
                Ok(text) => text,
                Err(e) => return AgentResult { turns_used: turn, trace, success: false, error: Some(e), ..Default::default() },
            };
            trace.push(raw.clone());
            let step = parse_react_output(&raw);

            if let Some(final_answer) = step.final_answer {
                let answer = match &final_answer {
                    FinalAnswer::Scenes(scenes) => serde_json::json!({ "relevant_scenes": scenes }),
                    FinalAnswer::Text(text) => serde_json::Value::String(text.clone()),
                };
                let validated = validate_final_answer(&final_answer);
                return AgentResult { answer: Some(answer), turns_used: turn, trace, success: validated, error: None };
            }

            let observation = match step.action {
                Some(call) => match self.tools.get(call.tool_name.as_str()) {
                    Some(tool) => match tool.call(&call.action_input).await {
                        Ok(text) => truncate_chars(&text, OBSERVATION_MAX_CHARS),
                        Err(e) => format!("Error: {e}"),
                    },
                    None => format!("Error: unknown tool `{}`", call.tool_name),
                },
                None => "Error: response contained neither an Action nor a Final Answer.".to_string(),
            };

            transcript.push_str(&format!("\n{raw}\nObservation: {observation}\n"));
        }

        AgentResult { turns_used: max_turns, trace, success: false, error: Some("max turns exceeded without a Final Answer".to_string()), ..Default::default() }
    }
}

/// Post-hoc sanity check (§4.4 "Agent loop" final step): a text answer must
/// be non-empty, a scene list is accepted as-is (an empty list is a valid
/// "nothing relevant" answer).
fn validate_final_answer(final_answer: &FinalAnswer) -> bool {
    match final_answer {
        FinalAnswer::Text(text) => !text.trim().is_empty(),
        FinalAnswer::Scenes(scenes) => scenes.iter().all(|s| *s > 0),
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}
