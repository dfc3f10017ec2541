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

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const PROVIDER: &str = "Gemini";

/// Client for the Gemini `generateContent` API
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryPolicy,
}

impl GeminiClient {
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

    fn endpoint(&self) -> String {
        join_url(
            &self.base_url,
            &format!("models/{}:generateContent", self.model),
        )
    }

    pub(crate) fn build_request_body(&self, request: &ModelRequest<'_>) -> Value {
        let turns: Vec<(&'static str, Vec<Value>)> =
            request.steps.iter().map(step_to_turn).collect();
        let contents: Vec<Value> = merge_adjacent(turns)
            .into_iter()
            .map(|(role, parts)| json!({"role": role, "parts": parts}))
            .collect();

        let mut body = json!({ "contents": contents });

        if let Some(system_prompt) = request.system_prompt {
            body["systemInstruction"] = json!({"parts": [{"text": system_prompt}]});
        }

        let mut generation_config = serde_json::Map::new();
        if let Some(max_tokens) = request.params.max_tokens {
            generation_config.insert("maxOutputTokens".into(), json!(max_tokens));
        }
        if let Some(temperature) = request.params.temperature {
            generation_config.insert("temperature".into(), json!(temperature));
        }
        if !generation_config.is_empty() {
            body["generationConfig"] = Value::Object(generation_config);
        }

        if !request.tools.is_empty() {
            let declarations: Vec<Value> = request
                .tools
                .iter()
                .map(|spec| {
                    json!({
                        "name": spec.name,
                        "description": spec.description,
                        "parameters": spec.parameters,
                    })
                })
                .collect();
            body["tools"] = json!([{ "functionDeclarations": declarations }]);
        }

        body
    }
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &mask_secret(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl ModelProvider for GeminiClient {
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
            &self.endpoint(),
            key_header(json_headers(), "x-goog-api-key", &self.api_key),
            &body,
            self.retry,
        )
        .await?;
        parse_response(response)
    }
}

fn step_to_turn(step: &AgentStep) -> (&'static str, Vec<Value>) {
    match step {
        AgentStep::Task { content } => ("user", vec![json!({"text": content})]),
        AgentStep::Action { thought, calls } => {
            let mut parts = Vec::with_capacity(calls.len() + 1);
            if let Some(thought) = thought.as_deref().filter(|text| !text.trim().is_empty()) {
                parts.push(json!({"text": thought}));
            }
            parts.extend(calls.iter().map(|call| {
                json!({"functionCall": {"name": call.name, "args": call.arguments}})
            }));
            ("model", parts)
        }
        AgentStep::Observation { outputs } => (
            "user",
            outputs
                .iter()
                .map(|output| {
                    json!({
                        "functionResponse": {
                            "name": output.tool_name,
                            "response": {"content": output.as_string()}
                        }
                    })
                })
                .collect(),
        ),
        AgentStep::FinalAnswer { answer } if answer.trim().is_empty() => ("model", vec![]),
        AgentStep::FinalAnswer { answer } => ("model", vec![json!({"text": answer})]),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    function_call: Option<FunctionCall>,
}

#[derive(Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: Option<u32>,
}

pub(crate) fn parse_response(response: Value) -> Result<ModelResponse> {
    let data: GenerateContentResponse = serde_json::from_value(response)?;
    let candidate = data.candidates.into_iter().next().ok_or_else(|| {
        AgentError::provider(PROVIDER, 200, "No candidates in Gemini response")
    })?;

    let mut text = String::new();
    let mut tool_calls = Vec::new();
    for part in candidate.content.map(|content| content.parts).unwrap_or_default() {
        if let Some(part_text) = part.text {
            text.push_str(&part_text);
        }
        if let Some(call) = part.function_call {
            // Gemini does not assign call ids
            let id = format!("{}_{}", call.name, tool_calls.len());
            tool_calls.push(ToolCall::new(
                id,
                call.name,
                call.args.unwrap_or_else(|| json!({})),
            ));
        }
    }

    let usage = data.usage_metadata.map(|usage| {
        let mut tokens = TokenUsage::new(usage.prompt_token_count, usage.candidates_token_count);
        if let Some(total) = usage.total_token_count {
            tokens.total_tokens = total;
        }
        tokens
    });

    let text = text.trim();
    Ok(ModelResponse {
        text: (!text.is_empty()).then(|| text.to_string()),
        tool_calls,
        stop_reason: candidate.finish_reason,
        usage,
    })
}
