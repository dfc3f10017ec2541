use super::{schema::decode_params, Tool};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::{pin::Pin, time::Duration};

/// Fixed timeout for fetches made by the tool
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// How much of the body is echoed back to the model
pub const PREVIEW_CHARS: usize = 500;

/// Parameters accepted by the HTTP request tool
#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct HttpRequestParams {
    /// The URL to fetch
    pub url: String,
}

/// Tool that performs a GET request and returns a preview of the body
#[derive(Debug, Clone)]
pub struct HttpRequestTool {
    client: Client,
}

impl Default for HttpRequestTool {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpRequestTool {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

/// GET `url` and describe the outcome as a single string.
///
/// A 200 response is previewed as JSON when it parses, as text otherwise. Any
/// other status, and any transport failure, is reported in the string.
pub async fn fetch_url(client: &Client, url: &str) -> String {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(err) => return format!("Request error: {}", err),
    };

    let status = response.status();
    if status != StatusCode::OK {
        return format!("HTTP error: {}", status.as_u16());
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => return format!("Request error: {}", err),
    };

    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => format!("JSON response: {}...", preview(&json.to_string())),
        Err(_) => format!("Text response: {}...", preview(&body)),
    }
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

impl Tool for HttpRequestTool {
    fn name(&self) -> &'static str {
        "simple_http_request"
    }

    fn description(&self) -> &'static str {
        "Fetch a URL with an HTTP GET request and return the start of the response"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The URL to fetch"
                }
            },
            "required": ["url"]
        })
    }

    fn execute(
        &self,
        parameters: serde_json::Value,
    ) -> Pin<
        Box<
            dyn std::future::Future<Output = Result<serde_json::Value, crate::AgentError>>
                + Send
                + '_,
        >,
    > {
        let client = self.client.clone();

        Box::pin(async move {
            let params: HttpRequestParams = decode_params(self.name(), parameters)?;
            Ok(serde_json::Value::String(
                fetch_url(&client, &params.url).await,
            ))
        })
    }
}
