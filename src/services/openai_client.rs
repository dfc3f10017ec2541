use super::{
    http::{bearer_headers, join_url, post_json, RetryPolicy},
    provider::{ModelProvider, ModelRequest, ModelResponse},
};
use crate::{
    core::{steps::AgentStep, tool_call::ToolCall},
    env::mask_secret,
    error::{AgentError, Result},
    types::result::TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::fmt;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const PROVIDER: &str = "OpenAI";

/// Client for the OpenAI chat completions API (and compatible endpoints)
#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryPolicy,
}

impl OpenAIClient {
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

    fn chat_url(&self) -> String {
        let trimmed = self.base_url.trim_end_matches('/');
        if trimmed.ends_with("/chat/completions") {
            trimmed.to_string()
        } else {
            join_url(trimmed, "chat/completions")
        }
    }

    pub(crate) fn build_request_body(&self, request: &ModelRequest<'_>) -> Value {
        let mut chat_request = ChatCompletionRequest::new(self.model.clone(), messages(request))
            .with_max_tokens(request.params.max_tokens)
            .with_temperature(request.params.temperature);

        if !request.tools.is_empty() {
            let tools = request
                .tools
                .iter()
                .map(|spec| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": spec.name,
                            "description": spec.description,
                            "parameters": spec.parameters,
                        }
                    })
                })
                .collect();
            chat_request = chat_request.with_tools(tools).with_tool_choice(json!("auto"));
        }

        chat_request.into_value()
    }
}

impl fmt::Debug for OpenAIClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("api_key", &mask_secret(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl ModelProvider for OpenAIClient {
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
            &self.chat_url(),
            bearer_headers(&self.api_key),
            &body,
            self.retry,
        )
        .await?;
        parse_response(&response)
    }
}

fn messages(request: &ModelRequest<'_>) -> Vec<Value> {
    let mut messages = Vec::new();

    if let Some(system_prompt) = request.system_prompt {
        messages.push(json!({
            "role": "system",
            "content": system_prompt
        }));
    }

    for step in request.steps {
        match step {
            AgentStep::Task { content } => messages.push(json!({
                "role": "user",
                "content": content
            })),
            AgentStep::Action { thought, calls } => {
                let tool_calls: Vec<Value> = calls
                    .iter()
                    .map(|call| {
                        json!({
                            "id": call.id,
                            "type": "function",
                            "function": {
                                "name": call.name,
                                "arguments": call.arguments.to_string()
                            }
                        })
                    })
                    .collect();
                messages.push(json!({
                    "role": "assistant",
                    "content": thought,
                    "tool_calls": tool_calls
                }));
            }
            AgentStep::Observation { outputs } => {
                for output in outputs {
                    messages.push(json!({
                        "role": "tool",
                        "tool_call_id": output.tool_call_id,
                        "content": output.as_string()
                    }));
                }
            }
            AgentStep::FinalAnswer { answer } => messages.push(json!({
                "role": "assistant",
                "content": answer
            })),
        }
    }

    messages
}

pub(crate) fn parse_response(response: &Value) -> Result<ModelResponse> {
    let first_choice = response
        .get("choices")
        .and_then(|value| value.as_array())
        .and_then(|choices| choices.first())
        .ok_or_else(|| {
            AgentError::Unknown("Completion response contained no choices".to_string())
        })?;

    let message = first_choice.get("message").ok_or_else(|| {
        AgentError::Unknown("Completion response missing assistant message".to_string())
    })?;

    let text = message
        .get("content")
        .and_then(|value| value.as_str())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    let mut tool_calls = Vec::new();
    for (index, call) in message
        .get("tool_calls")
        .and_then(|value| value.as_array())
        .into_iter()
        .flatten()
        .enumerate()
    {
        let function = call.get("function").ok_or_else(|| {
            AgentError::InvalidFunctionCall("Tool call missing function".to_string())
        })?;
        let name = function
            .get("name")
            .and_then(|value| value.as_str())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                AgentError::InvalidFunctionCall("Tool call missing function name".to_string())
            })?;
        let id = call
            .get("id")
            .and_then(|value| value.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("call_{}", index));
        let arguments = parse_arguments(function.get("arguments"));

        tool_calls.push(ToolCall::new(id, name, arguments));
    }

    let usage = response.get("usage").and_then(|usage| {
        let prompt = usage.get("prompt_tokens")?.as_u64()? as u32;
        let completion = usage.get("completion_tokens")?.as_u64()? as u32;
        let total = usage
            .get("total_tokens")
            .and_then(Value::as_u64)
            .map(|total| total as u32)
            .unwrap_or(prompt + completion);
        Some(TokenUsage {
            prompt_tokens: prompt,
            completion_tokens: completion,
            total_tokens: total,
        })
    });

    Ok(ModelResponse {
        text,
        tool_calls,
        stop_reason: first_choice
            .get("finish_reason")
            .and_then(|value| value.as_str())
            .map(str::to_string),
        usage,
    })
}

/// Arguments arrive as a JSON-encoded string. Empty means no arguments; text
/// that is not JSON is passed through as a string so schema validation can
/// report it back to the model.
fn parse_arguments(raw: Option<&Value>) -> Value {
    match raw {
        Some(Value::String(text)) if text.trim().is_empty() => json!({}),
        Some(Value::String(text)) => {
            serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.clone()))
        }
        Some(Value::Null) | None => json!({}),
        Some(other) => other.clone(),
    }
}

#[derive(Clone, Debug)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Value>,
    tools: Vec<Value>,
    tool_choice: Option<Value>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl ChatCompletionRequest {
    fn new(model: impl Into<String>, messages: Vec<Value>) -> Self {
        Self {
            model: model.into(),
            messages,
            tools: Vec::new(),
            tool_choice: None,
            max_tokens: None,
            temperature: None,
        }
    }

    fn with_tools(mut self, tools: Vec<Value>) -> Self {
        self.tools = tools;
        self
    }

    fn with_tool_choice(mut self, tool_choice: Value) -> Self {
        self.tool_choice = Some(tool_choice);
        self
    }

    fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    fn into_value(self) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": self.messages,
        });

        if !self.tools.is_empty() {
            body["tools"] = Value::Array(self.tools);
        }

        if let Some(tool_choice) = self.tool_choice {
            body["tool_choice"] = tool_choice;
        }

        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        if let Some(temperature) = self.temperature {
            body["temperature"] = json!(temperature);
        }

        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::GenerationParams, core::tool_call::ToolOutput, tools::ToolSpec};

    fn calculator_spec() -> ToolSpec {
        ToolSpec {
            name: "calculator".to_string(),
            description: "Evaluate math".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {"expression": {"type": "string"}},
                "required": ["expression"]
            }),
        }
    }

    fn history() -> Vec<AgentStep> {
        vec![
            AgentStep::Task {
                content: "What is 2+2?".to_string(),
            },
            AgentStep::Action {
                thought: None,
                calls: vec![ToolCall::new(
                    "call_1",
                    "calculator",
                    json!({"expression": "2+2"}),
                )],
            },
            AgentStep::Observation {
                outputs: vec![ToolOutput::success("call_1", "calculator", json!("Result: 4"))],
            },
        ]
    }

    #[test]
    fn request_body_uses_chat_format() {
        let client = OpenAIClient::new("sk-test", "gpt-4");
        let steps = history();
        let tools = vec![calculator_spec()];
        let request = ModelRequest {
            system_prompt: Some("Be brief."),
            steps: &steps,
            tools: &tools,
            params: GenerationParams {
                max_tokens: Some(256),
                temperature: None,
            },
        };

        let body = client.build_request_body(&request);
        assert_eq!(body["model"], "gpt-4");
        assert_eq!(body["max_tokens"], 256);
        assert!(body.get("temperature").is_none());
        assert_eq!(body["tool_choice"], "auto");
        assert_eq!(body["tools"][0]["function"]["name"], "calculator");

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["content"], "What is 2+2?");
        assert_eq!(messages[2]["content"], Value::Null);
        assert_eq!(
            messages[2]["tool_calls"][0]["function"]["arguments"],
            r#"{"expression":"2+2"}"#
        );
        assert_eq!(messages[3]["role"], "tool");
        assert_eq!(messages[3]["tool_call_id"], "call_1");
        assert_eq!(messages[3]["content"], "Result: 4");
    }

    #[test]
    fn chat_url_accepts_full_endpoint() {
        let client = OpenAIClient::new("k", "m").with_base_url("http://localhost:1234/v1/");
        assert_eq!(client.chat_url(), "http://localhost:1234/v1/chat/completions");
        let client = client.with_base_url("http://proxy/chat/completions");
        assert_eq!(client.chat_url(), "http://proxy/chat/completions");
    }

    #[test]
    fn parses_tool_calls_and_usage() {
        let response = json!({
            "choices": [{
                "finish_reason": "tool_calls",
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [
                        {"id": "call_a", "type": "function",
                         "function": {"name": "calculator", "arguments": "{\"expression\": \"1+1\"}"}},
                        {"id": "call_b", "type": "function",
                         "function": {"name": "get_weather_info", "arguments": ""}},
                        {"id": "call_c", "type": "function",
                         "function": {"name": "calculator", "arguments": "not json"}}
                    ]
                }
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 8, "total_tokens": 20}
        });

        let parsed = parse_response(&response).unwrap();
        assert_eq!(parsed.text, None);
        assert_eq!(parsed.stop_reason.as_deref(), Some("tool_calls"));
        assert_eq!(parsed.usage, Some(TokenUsage::new(12, 8)));
        assert_eq!(parsed.tool_calls.len(), 3);
        assert_eq!(parsed.tool_calls[0].arguments, json!({"expression": "1+1"}));
        assert_eq!(parsed.tool_calls[1].arguments, json!({}));
        assert_eq!(parsed.tool_calls[2].arguments, json!("not json"));
    }

    #[test]
    fn empty_choices_is_an_error() {
        assert!(parse_response(&json!({"choices": []})).is_err());
    }

    #[tokio::test]
    async fn converse_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(mockito::Matcher::PartialJson(json!({"model": "gpt-4"})))
            .with_status(200)
            .with_body(
                json!({
                    "choices": [{
                        "finish_reason": "stop",
                        "message": {"role": "assistant", "content": "4"}
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = OpenAIClient::new("sk-test", "gpt-4")
            .with_base_url(format!("{}/v1", server.url()))
            .with_retry_policy(RetryPolicy::none());
        let steps = vec![AgentStep::Task {
            content: "2+2".to_string(),
        }];
        let request = ModelRequest {
            system_prompt: None,
            steps: &steps,
            tools: &[],
            params: GenerationParams::default(),
        };

        let response = client.converse(&request).await.unwrap();
        assert_eq!(response.text.as_deref(), Some("4"));
        assert!(!response.has_tool_calls());
        mock.assert_async().await;
    }
}
