use super::{
    http::{json_headers, join_url, key_header, post_json, RetryPolicy},
    provider::{merge_adjacent, ModelProvider, ModelRequest, ModelResponse},
};
use crate::{
    core::{steps::AgentStep, tool_call::ToolCall},
    env::mask_secret,
    error::{AgentError, Result},
    types::result::TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const API_VERSION: &str = "2023-06-01";
/// The Messages API requires `max_tokens`; used when the caller sets none
const FALLBACK_MAX_TOKENS: u32 = 1024;
const PROVIDER: &str = "Anthropic";

/// Client for the Anthropic Messages API
#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryPolicy,
}

impl AnthropicClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub(crate) fn build_request_body(&self, request: &ModelRequest<'_>) -> Value {
        let turns: Vec<(&'static str, Vec<Value>)> =
            request.steps.iter().map(step_to_turn).collect();
        let messages: Vec<Value> = merge_adjacent(turns)
            .into_iter()
            .map(|(role, content)| json!({"role": role, "content": content}))
            .collect();

        let mut body = json!({
            "model": self.model,
            "max_tokens": request.params.max_tokens.unwrap_or(FALLBACK_MAX_TOKENS),
            "messages": messages,
        });

        if let Some(system_prompt) = request.system_prompt {
            body["system"] = json!(system_prompt);
        }
        if let Some(temperature) = request.params.temperature {
            body["temperature"] = json!(temperature);
        }
        if !request.tools.is_empty() {
            body["tools"] = request
                .tools
                .iter()
                .map(|spec| {
                    json!({
                        "name": spec.name,
                        "description": spec.description,
                        "input_schema": spec.parameters,
                    })
                })
                .collect();
            body["tool_choice"] = json!({"type": "auto"});
        }

        body
    }
}

impl fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("api_key", &mask_secret(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl ModelProvider for AnthropicClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn converse(&self, request: &ModelRequest<'_>) -> Result<ModelResponse> {
        let headers = key_header(
            key_header(json_headers(), "x-api-key", &self.api_key),
            "anthropic-version",
            API_VERSION,
        );
        let body = self.build_request_body(request);
        let response = post_json(
            &self.client,
            PROVIDER,
            &join_url(&self.base_url, "messages"),
            headers,
            &body,
            self.retry,
        )
        .await?;
        parse_response(response)
    }
}

fn step_to_turn(step: &AgentStep) -> (&'static str, Vec<Value>) {
    match step {
        AgentStep::Task { content } => ("user", vec![json!({"type": "text", "text": content})]),
        AgentStep::Action { thought, calls } => {
            let mut content = Vec::with_capacity(calls.len() + 1);
            if let Some(thought) = thought.as_deref().filter(|text| !text.trim().is_empty()) {
                content.push(json!({"type": "text", "text": thought}));
            }
            content.extend(calls.iter().map(|call| {
                json!({
                    "type": "tool_use",
                    "id": call.id,
                    "name": call.name,
                    "input": call.arguments,
                })
            }));
            ("assistant", content)
        }
        AgentStep::Observation { outputs } => (
            "user",
            outputs
                .iter()
                .map(|output| {
                    json!({
                        "type": "tool_result",
                        "tool_use_id": output.tool_call_id,
                        "content": output.as_string(),
                        "is_error": output.is_error,
                    })
                })
                .collect(),
        ),
        AgentStep::FinalAnswer { answer } if answer.trim().is_empty() => ("assistant", vec![]),
        AgentStep::FinalAnswer { answer } => {
            ("assistant", vec![json!({"type": "text", "text": answer})])
        }
    }
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ContentBlock {
    r#type: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    input: Option<Value>,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

pub(crate) fn parse_response(response: Value) -> Result<ModelResponse> {
    let data: MessagesResponse = serde_json::from_value(response)?;

    let mut text = String::new();
    let mut tool_calls = Vec::new();
    for block in data.content {
        match block.r#type.as_str() {
            "text" => {
                if let Some(part) = block.text {
                    text.push_str(&part);
                }
            }
            "tool_use" => {
                let name = block.name.ok_or_else(|| {
                    AgentError::InvalidFunctionCall("tool_use block missing name".to_string())
                })?;
                let id = block
                    .id
                    .unwrap_or_else(|| format!("toolu_{}", tool_calls.len()));
                tool_calls.push(ToolCall::new(
                    id,
                    name,
                    block.input.unwrap_or_else(|| json!({})),
                ));
            }
            _ => {}
        }
    }

    let text = text.trim();
    Ok(ModelResponse {
        text: (!text.is_empty()).then(|| text.to_string()),
        tool_calls,
        stop_reason: data.stop_reason,
        usage: data
            .usage
            .map(|usage| TokenUsage::new(usage.input_tokens, usage.output_tokens)),
    })
}
