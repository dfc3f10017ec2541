use super::steps::AgentStep;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant with access to tools. Use tools when necessary to provide accurate information. Be concise and helpful.";

/// Conversation history of an agent: the system prompt plus every step so far
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMemory {
    steps: Vec<AgentStep>,
    system_prompt: Option<String>,
}

impl AgentMemory {
    pub fn new(system_prompt: Option<String>) -> Self {
        Self {
            steps: Vec::new(),
            system_prompt,
        }
    }

    pub fn with_default_system() -> Self {
        Self::new(Some(DEFAULT_SYSTEM_PROMPT.to_string()))
    }

    /// Add a step to memory, logging its description
    pub fn add_step(&mut self, step: AgentStep) {
        info!(target: "agent_playground::steps", "{}", step.describe());
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[AgentStep] {
        &self.steps
    }

    pub fn last_step(&self) -> Option<&AgentStep> {
        self.steps.last()
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    pub fn set_system_prompt(&mut self, system_prompt: Option<String>) {
        self.system_prompt = system_prompt;
    }

    /// Drop every step recorded after the first `len`
    pub fn truncate(&mut self, len: usize) {
        self.steps.truncate(len);
    }

    /// Clear all steps but keep system prompt
    pub fn clear_steps(&mut self) {
        self.steps.clear();
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Check if memory is empty (excluding system prompt)
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn count_actions(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, AgentStep::Action { .. }))
            .count()
    }

    pub fn count_observations(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, AgentStep::Observation { .. }))
            .count()
    }
}

impl Default for AgentMemory {
    fn default() -> Self {
        Self::with_default_system()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tool_call::{ToolCall, ToolOutput};
    use serde_json::json;

    #[test]
    fn test_memory_creation() {
        let memory = AgentMemory::new(Some("System".to_string()));
        assert_eq!(memory.step_count(), 0);
        assert!(memory.is_empty());
        assert_eq!(memory.system_prompt(), Some("System"));
    }

    #[test]
    fn test_truncate_rolls_back_steps() {
        let mut memory = AgentMemory::default();
        memory.add_step(AgentStep::Task {
            content: "first".to_string(),
        });
        memory.add_step(AgentStep::FinalAnswer {
            answer: "one".to_string(),
        });
        let checkpoint = memory.step_count();

        memory.add_step(AgentStep::Task {
            content: "second".to_string(),
        });
        memory.add_step(AgentStep::Action {
            thought: None,
            calls: vec![ToolCall::new("1", "calculator", json!({}))],
        });
        memory.truncate(checkpoint);

        assert_eq!(memory.step_count(), 2);
        assert!(matches!(
            memory.last_step(),
            Some(AgentStep::FinalAnswer { .. })
        ));
    }

    #[test]
    fn test_counts() {
        let mut memory = AgentMemory::default();
        memory.add_step(AgentStep::Action {
            thought: Some("checking".to_string()),
            calls: vec![ToolCall::new("1", "calculator", json!({}))],
        });
        memory.add_step(AgentStep::Observation {
            outputs: vec![ToolOutput::success("1", "calculator", json!("Result: 1"))],
        });
        assert_eq!(memory.count_actions(), 1);
        assert_eq!(memory.count_observations(), 1);

        memory.clear_steps();
        assert!(memory.is_empty());
        assert!(memory.system_prompt().is_some());
    }
}
