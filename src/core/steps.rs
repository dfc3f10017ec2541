use super::tool_call::{ToolCall, ToolOutput};
use serde::{Deserialize, Serialize};

/// Represents a single step in the agent's conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentStep {
    /// Text provided by the user
    Task { content: String },
    /// The model asked for one or more tools, optionally with accompanying text
    Action {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thought: Option<String>,
        calls: Vec<ToolCall>,
    },
    /// Results of every call from the preceding action, in call order
    Observation { outputs: Vec<ToolOutput> },
    /// Reply from the model that ends the turn
    FinalAnswer { answer: String },
}

impl AgentStep {
    /// Get a human-readable description of the step
    pub fn describe(&self) -> String {
        match self {
            AgentStep::Task { content } => format!("🧭 Task: {}", content),
            AgentStep::Action { calls, .. } => {
                let calls: Vec<String> = calls.iter().map(ToolCall::describe).collect();
                format!("🔧 Action: {}", calls.join(", "))
            }
            AgentStep::Observation { outputs } => {
                let parts: Vec<String> = outputs
                    .iter()
                    .map(|output| {
                        if output.is_error {
                            format!("❌ {}: {}", output.tool_name, output.as_string())
                        } else {
                            format!("{}: {}", output.tool_name, output.as_string())
                        }
                    })
                    .collect();
                format!("👁 Observation: {}", parts.join(" | "))
            }
            AgentStep::FinalAnswer { answer } => format!("✅ Final Answer: {}", answer),
        }
    }

    pub fn is_error(&self) -> bool {
        match self {
            AgentStep::Observation { outputs } => outputs.iter().any(|output| output.is_error),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_describe_action_and_observation() {
        let action = AgentStep::Action {
            thought: None,
            calls: vec![
                ToolCall::new("1", "calculator", json!({"expression": "1+1"})),
                ToolCall::new("2", "get_weather_info", json!({"city": "Cairo"})),
            ],
        };
        assert_eq!(
            action.describe(),
            r#"🔧 Action: calculator({"expression":"1+1"}), get_weather_info({"city":"Cairo"})"#
        );

        let observation = AgentStep::Observation {
            outputs: vec![
                ToolOutput::success("1", "calculator", json!("Result: 2")),
                ToolOutput::error("2", "get_weather_info", json!({"error": "x"})),
            ],
        };
        assert!(observation.is_error());
        assert_eq!(
            observation.describe(),
            r#"👁 Observation: calculator: Result: 2 | ❌ get_weather_info: {"error":"x"}"#
        );
    }

    #[test]
    fn test_serde_tagging() {
        let step = AgentStep::FinalAnswer {
            answer: "done".to_string(),
        };
        let value = serde_json::to_value(&step).unwrap();
        assert_eq!(value, json!({"type": "final_answer", "answer": "done"}));
    }
}
