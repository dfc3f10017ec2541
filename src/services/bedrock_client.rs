use super::{
    http::{bearer_headers, post_json, RetryPolicy},
    provider::{merge_adjacent, ModelProvider, ModelRequest, ModelResponse},
};
use crate::{
    config::DEFAULT_BEDROCK_REGION,
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

const PROVIDER: &str = "Bedrock";

/// Client for the Amazon Bedrock Converse API, authenticated with a Bedrock API key
#[derive(Clone)]
pub struct BedrockClient {
    client: Client,
    api_key: String,
    region: String,
    model: String,
    endpoint: Option<String>,
    retry: RetryPolicy,
}

impl BedrockClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            region: DEFAULT_BEDROCK_REGION.to_string(),
            model: model.into(),
            endpoint: None,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Send requests to `endpoint` instead of the regional runtime host
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    fn converse_url(&self) -> String {
        let host = match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://bedrock-runtime.{}.amazonaws.com", self.region),
        };
        format!("{}/model/{}/converse", host, encode_model_id(&self.model))
    }

    pub(crate) fn build_request_body(&self, request: &ModelRequest<'_>) -> Value {
        let turns: Vec<(&'static str, Vec<Value>)> =
            request.steps.iter().map(step_to_turn).collect();
        let messages: Vec<Value> = merge_adjacent(turns)
            .into_iter()
            .map(|(role, content)| json!({"role": role, "content": content}))
            .collect();

        let mut body = json!({ "messages": messages });

        if let Some(system_prompt) = request.system_prompt {
            body["system"] = json!([{ "text": system_prompt }]);
        }

        let mut inference = serde_json::Map::new();
        if let Some(max_tokens) = request.params.max_tokens {
            inference.insert("maxTokens".into(), json!(max_tokens));
        }
        if let Some(temperature) = request.params.temperature {
            inference.insert("temperature".into(), json!(temperature));
        }
        if !inference.is_empty() {
            body["inferenceConfig"] = Value::Object(inference);
        }

        if !request.tools.is_empty() {
            let tools: Vec<Value> = request
                .tools
                .iter()
                .map(|spec| {
                    json!({
                        "toolSpec": {
                            "name": spec.name,
                            "description": spec.description,
                            "inputSchema": { "json": spec.parameters },
                        }
                    })
                })
                .collect();
            body["toolConfig"] = json!({ "tools": tools });
        }

        body
    }
}

impl fmt::Debug for BedrockClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BedrockClient")
            .field("api_key", &mask_secret(&self.api_key))
            .field("region", &self.region)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl ModelProvider for BedrockClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn converse(&self, request: &ModelRequest<'_>) -> Result<ModelResponse> {
        let body = self.build_request_body(request);
        let response = post_json(
            &self.client,
            PROVIDER,
            &self.converse_url(),
            bearer_headers(&self.api_key),
            &body,
            self.retry,
        )
        .await?;
        parse_response(response)
    }
}

/// Model ids and inference-profile ARNs contain `:` and `/`, which must be
/// escaped in the path segment.
fn encode_model_id(model: &str) -> String {
    let mut encoded = String::with_capacity(model.len());
    for c in model.chars() {
        match c {
            ':' => encoded.push_str("%3A"),
            '/' => encoded.push_str("%2F"),
            _ => encoded.push(c),
        }
    }
    encoded
}

fn step_to_turn(step: &AgentStep) -> (&'static str, Vec<Value>) {
    match step {
        AgentStep::Task { content } => ("user", vec![json!({"text": content})]),
        AgentStep::Action { thought, calls } => {
            let mut content = Vec::with_capacity(calls.len() + 1);
            if let Some(thought) = thought.as_deref().filter(|text| !text.trim().is_empty()) {
                content.push(json!({"text": thought}));
            }
            content.extend(calls.iter().map(|call| {
                json!({
                    "toolUse": {
                        "toolUseId": call.id,
                        "name": call.name,
                        "input": call.arguments,
                    }
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
                        "toolResult": {
                            "toolUseId": output.tool_call_id,
                            "content": [{ "text": output.as_string() }],
                            "status": if output.is_error { "error" } else { "success" },
                        }
                    })
                })
                .collect(),
        ),
        AgentStep::FinalAnswer { answer } if answer.trim().is_empty() => ("assistant", vec![]),
        AgentStep::FinalAnswer { answer } => ("assistant", vec![json!({"text": answer})]),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConverseResponse {
    output: ConverseOutput,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<ConverseUsage>,
}

#[derive(Deserialize)]
struct ConverseOutput {
    message: Option<OutputMessage>,
}

#[derive(Deserialize)]
struct OutputMessage {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    tool_use: Option<ToolUse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolUse {
    tool_use_id: String,
    name: String,
    #[serde(default)]
    input: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConverseUsage {
    input_tokens: u32,
    output_tokens: u32,
    #[serde(default)]
    total_tokens: Option<u32>,
}

pub(crate) fn parse_response(response: Value) -> Result<ModelResponse> {
    let data: ConverseResponse = serde_json::from_value(response)?;
    let message = data.output.message.ok_or_else(|| {
        AgentError::provider(PROVIDER, 200, "Converse response contained no message")
    })?;

    let mut text = String::new();
    let mut tool_calls = Vec::new();
    for block in message.content {
        if let Some(part) = block.text {
            text.push_str(&part);
        }
        if let Some(tool_use) = block.tool_use {
            tool_calls.push(ToolCall::new(
                tool_use.tool_use_id,
                tool_use.name,
                tool_use.input.unwrap_or_else(|| json!({})),
            ));
        }
    }

    let usage = data.usage.map(|usage| {
        let mut tokens = TokenUsage::new(usage.input_tokens, usage.output_tokens);
        if let Some(total) = usage.total_tokens {
            tokens.total_tokens = total;
        }
        tokens
    });

    let text = text.trim();
    Ok(ModelResponse {
        text: (!text.is_empty()).then(|| text.to_string()),
        tool_calls,
        stop_reason: data.stop_reason,
        usage,
    })
}
