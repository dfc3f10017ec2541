//! JSON-over-HTTP plumbing shared by the provider clients.

use crate::error::{AgentError, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER},
    Client, StatusCode,
};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// How often and how patiently a request is retried on 429 and 5xx
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
        }
    }
}

pub(crate) fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

pub(crate) fn bearer_headers(api_key: &str) -> HeaderMap {
    let mut headers = json_headers();
    if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", api_key)) {
        headers.insert(AUTHORIZATION, value);
    }
    headers
}

pub(crate) fn key_header(mut headers: HeaderMap, name: &'static str, value: &str) -> HeaderMap {
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(name, value);
    }
    headers
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// POST `body` to `url` and return the decoded JSON response.
///
/// Rate limiting honours `Retry-After` when present and otherwise backs off
/// exponentially, as do server errors. Once retries run out a 429 becomes
/// [`AgentError::RateLimit`]; any other failure status becomes
/// [`AgentError::Provider`] with the message mined from the body.
pub(crate) async fn post_json(
    client: &Client,
    provider: &'static str,
    url: &str,
    headers: HeaderMap,
    body: &Value,
    retry: RetryPolicy,
) -> Result<Value> {
    let mut attempt = 0;
    let mut backoff = retry.initial_backoff;

    loop {
        debug!(provider, url, attempt, "sending model request");
        let response = client
            .post(url)
            .headers(headers.clone())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        let response_text = response.text().await?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            let wait = retry_after.unwrap_or(backoff);
            if attempt < retry.max_retries {
                warn!(provider, wait_ms = wait.as_millis() as u64, "rate limited, retrying");
                tokio::time::sleep(wait).await;
                attempt += 1;
                backoff *= 2;
                continue;
            }

            return Err(AgentError::RateLimit {
                retry_after: wait.as_secs().max(1),
            });
        }

        if status.is_server_error() && attempt < retry.max_retries {
            warn!(provider, status = status.as_u16(), "server error, retrying");
            tokio::time::sleep(backoff).await;
            attempt += 1;
            backoff *= 2;
            continue;
        }

        if !status.is_success() {
            return Err(AgentError::provider(
                provider,
                status.as_u16(),
                error_message(&response_text),
            ));
        }

        let json: Value = serde_json::from_str(&response_text).map_err(|err| {
            AgentError::provider(
                provider,
                status.as_u16(),
                format!("Failed to parse JSON response: {}", err),
            )
        })?;
        return Ok(json);
    }
}

/// GET `url` once and return the decoded JSON response.
///
/// Failure statuses become [`AgentError::Provider`] with the message mined
/// from the body. Nothing is retried.
pub(crate) async fn get_json(
    client: &Client,
    provider: &'static str,
    url: &str,
    headers: HeaderMap,
) -> Result<Value> {
    debug!(provider, url, "fetching");
    let response = client.get(url).headers(headers).send().await?;
    let status = response.status();
    let response_text = response.text().await?;

    if !status.is_success() {
        return Err(AgentError::provider(
            provider,
            status.as_u16(),
            error_message(&response_text),
        ));
    }

    serde_json::from_str(&response_text).map_err(|err| {
        AgentError::provider(
            provider,
            status.as_u16(),
            format!("Failed to parse JSON response: {}", err),
        )
    })
}

/// Pull a human readable message out of an error body
pub(crate) fn error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };

    json.get("error")
        .and_then(|error| error.get("message").or(Some(error)))
        .or_else(|| json.get("message"))
        .and_then(|value| value.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}
