use crate::{
    config::GenerationParams,
    core::{steps::AgentStep, tool_call::ToolCall},
    tools::ToolSpec,
    types::result::TokenUsage,
    Result,
};
use async_trait::async_trait;

/// One round trip to a model: the full conversation and the tools on offer
#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'a> {
    pub system_prompt: Option<&'a str>,
    pub steps: &'a [AgentStep],
    pub tools: &'a [ToolSpec],
    pub params: GenerationParams,
}

/// What the model answered
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResponse {
    /// Text content, if any; with tool calls present this is the model's reasoning
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub stop_reason: Option<String>,
    pub usage: Option<TokenUsage>,
}

impl ModelResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: calls,
            ..Self::default()
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// A chat model backend that supports tool calling
#[async_trait]
pub trait ModelProvider: Send + Sync + std::fmt::Debug {
    /// Human readable provider name, used in errors and logs
    fn name(&self) -> &'static str;

    fn model_id(&self) -> &str;

    async fn converse(&self, request: &ModelRequest<'_>) -> Result<ModelResponse>;
}

/// Merge adjacent entries that share a role, for APIs that require strictly
/// alternating turns. Entries without parts are dropped first.
pub(crate) fn merge_adjacent<T>(
    messages: Vec<(&'static str, Vec<T>)>,
) -> Vec<(&'static str, Vec<T>)> {
    let mut merged: Vec<(&'static str, Vec<T>)> = Vec::with_capacity(messages.len());
    for (role, parts) in messages {
        if parts.is_empty() {
            continue;
        }
        match merged.last_mut() {
            Some((last_role, last_parts)) if *last_role == role => last_parts.extend(parts),
            _ => merged.push((role, parts)),
        }
    }
    merged
}
