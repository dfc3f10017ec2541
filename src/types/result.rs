use crate::core::steps::AgentStep;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of an agent execution run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Final output from the agent
    pub output: String,
    /// Steps recorded during this run, starting with its task
    pub steps: Vec<AgentStep>,
    /// Tokens used across every model call of the run, when the provider reports them
    pub tokens: Option<TokenUsage>,
    /// Total execution duration
    pub duration: Duration,
    /// Number of model calls made
    pub iterations: usize,
}

/// Token usage information from the API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }

    /// Accumulate another call's usage into this one
    pub fn add(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

impl RunResult {
    pub fn new(
        output: String,
        steps: Vec<AgentStep>,
        tokens: Option<TokenUsage>,
        duration: Duration,
        iterations: usize,
    ) -> Self {
        Self {
            output,
            steps,
            tokens,
            duration,
            iterations,
        }
    }

    /// Generate a human-readable replay of the execution
    pub fn replay(&self) -> String {
        let mut lines = self.header("=== Agent Execution Trace ===");

        lines.push(String::new());
        lines.push("--- Steps ---".to_string());

        for (idx, step) in self.steps.iter().enumerate() {
            lines.push(format!("{}. {}", idx + 1, step.describe()));
        }

        lines.push(String::new());
        lines.push("--- Final Output ---".to_string());
        lines.push(self.output.clone());

        lines.join("\n")
    }

    /// Generate a detailed explanation with full step data
    pub fn explain(&self) -> String {
        let mut lines = self.header("=== Agent Execution Explanation ===");

        lines.push(String::new());
        lines.push("--- Detailed Steps ---".to_string());

        for (idx, step) in self.steps.iter().enumerate() {
            lines.push(format!("\n{}. {}", idx + 1, step.describe()));

            match step {
                AgentStep::Task { content } => {
                    lines.push(format!("   Content: {}", content));
                }
                AgentStep::Action { thought, calls } => {
                    if let Some(thought) = thought {
                        lines.push(format!("   Thought: {}", thought));
                    }
                    for call in calls {
                        lines.push(format!("   Tool: {}", call.name));
                        lines.push(format!("   Call ID: {}", call.id));
                        lines.push(format!("   Arguments: {}", call.arguments));
                    }
                }
                AgentStep::Observation { outputs } => {
                    for output in outputs {
                        lines.push(format!("   Call ID: {}", output.tool_call_id));
                        lines.push(format!("   Error: {}", output.is_error));
                        if let Some(ms) = output.duration_ms {
                            lines.push(format!("   Took: {}ms", ms));
                        }
                        lines.push(format!("   Result: {}", output.as_string()));
                    }
                }
                AgentStep::FinalAnswer { answer } => {
                    lines.push(format!("   Answer: {}", answer));
                }
            }
        }

        lines.push(String::new());
        lines.push("--- Final Output ---".to_string());
        lines.push(self.output.clone());

        lines.join("\n")
    }

    fn header(&self, title: &str) -> Vec<String> {
        let mut lines = vec![
            title.to_string(),
            format!("Duration: {:.2}s", self.duration.as_secs_f64()),
            format!("Iterations: {}", self.iterations),
        ];

        if let Some(tokens) = &self.tokens {
            lines.push(format!(
                "Tokens: {} prompt + {} completion = {} total",
                tokens.prompt_tokens, tokens.completion_tokens, tokens.total_tokens
            ));
        }
        lines
    }

    /// Number of tool calls requested during the run
    pub fn action_count(&self) -> usize {
        self.steps
            .iter()
            .map(|step| match step {
                AgentStep::Action { calls, .. } => calls.len(),
                _ => 0,
            })
            .sum()
    }

    /// Number of tool results fed back during the run
    pub fn observation_count(&self) -> usize {
        self.steps
            .iter()
            .map(|step| match step {
                AgentStep::Observation { outputs } => outputs.len(),
                _ => 0,
            })
            .sum()
    }

    pub fn is_success(&self) -> bool {
        self.steps
            .iter()
            .any(|s| matches!(s, AgentStep::FinalAnswer { .. }))
    }

    /// Get all failed tool outputs, rendered as strings
    pub fn errors(&self) -> Vec<String> {
        self.steps
            .iter()
            .flat_map(|step| match step {
                AgentStep::Observation { outputs } => outputs.as_slice(),
                _ => &[][..],
            })
            .filter(|output| output.is_error)
            .map(|output| output.as_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tool_call::{ToolCall, ToolOutput};
    use serde_json::json;

    fn sample_steps() -> Vec<AgentStep> {
        vec![
            AgentStep::Task {
                content: "What is 2+2 and the weather in Cairo?".to_string(),
            },
            AgentStep::Action {
                thought: Some("Let me check.".to_string()),
                calls: vec![
                    ToolCall::new("1", "calculator", json!({"expression": "2+2"})),
                    ToolCall::new("2", "get_weather_info", json!({})),
                ],
            },
            AgentStep::Observation {
                outputs: vec![
                    ToolOutput::success("1", "calculator", json!("Result: 4")),
                    ToolOutput::error("2", "get_weather_info", json!({"error": "missing city"})),
                ],
            },
            AgentStep::FinalAnswer {
                answer: "4".to_string(),
            },
        ]
    }

    #[test]
    fn test_counts_and_errors() {
        let result = RunResult::new(
            "4".to_string(),
            sample_steps(),
            None,
            Duration::from_secs(1),
            2,
        );

        assert!(result.is_success());
        assert_eq!(result.action_count(), 2);
        assert_eq!(result.observation_count(), 2);
        assert_eq!(result.errors(), vec![r#"{"error":"missing city"}"#.to_string()]);
    }

    #[test]
    fn test_replay_format() {
        let result = RunResult::new(
            "4".to_string(),
            sample_steps(),
            Some(TokenUsage::new(100, 50)),
            Duration::from_secs(2),
            2,
        );

        let replay = result.replay();
        assert!(replay.contains("Duration: 2.00s"));
        assert!(replay.contains("Tokens: 100 prompt + 50 completion = 150 total"));
        assert!(replay.contains("1. 🧭 Task"));
        assert!(replay.contains("Final Answer"));

        let explain = result.explain();
        assert!(explain.contains("   Thought: Let me check."));
        assert!(explain.contains("   Call ID: 2"));
    }

    #[test]
    fn test_usage_accumulates() {
        let mut total = TokenUsage::default();
        total.add(&TokenUsage::new(10, 5));
        total.add(&TokenUsage::new(20, 1));
        assert_eq!(total, TokenUsage::new(30, 6));
        assert_eq!(total.total_tokens, 36);
    }
}
