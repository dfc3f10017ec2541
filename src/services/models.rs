//! Model-list lookups used to confirm that a credential is accepted.

use super::{
    anthropic_client, gemini_client,
    http::{bearer_headers, get_json, json_headers, join_url, key_header},
    openai_client,
};
use crate::{
    config::{ProviderConfig, ProviderKind, DEFAULT_BEDROCK_REGION},
    error::Result,
};
use reqwest::{header::HeaderMap, Client};
use serde_json::Value;

/// URL of the model-list endpoint for `config`
pub fn models_url(config: &ProviderConfig) -> String {
    let base = config.base_url.as_deref();
    match config.kind {
        ProviderKind::OpenAI => join_url(base.unwrap_or(openai_client::DEFAULT_BASE_URL), "models"),
        ProviderKind::Anthropic => {
            join_url(base.unwrap_or(anthropic_client::DEFAULT_BASE_URL), "models")
        }
        ProviderKind::Gemini => join_url(base.unwrap_or(gemini_client::DEFAULT_BASE_URL), "models"),
        ProviderKind::Bedrock => {
            let host = match base {
                Some(endpoint) => endpoint.to_string(),
                None => format!(
                    "https://bedrock.{}.amazonaws.com",
                    config.region.as_deref().unwrap_or(DEFAULT_BEDROCK_REGION)
                ),
            };
            join_url(&host, "foundation-models")
        }
    }
}

fn auth_headers(config: &ProviderConfig) -> HeaderMap {
    match config.kind {
        ProviderKind::OpenAI | ProviderKind::Bedrock => bearer_headers(&config.api_key),
        ProviderKind::Anthropic => key_header(
            key_header(json_headers(), "x-api-key", &config.api_key),
            "anthropic-version",
            anthropic_client::API_VERSION,
        ),
        ProviderKind::Gemini => key_header(json_headers(), "x-goog-api-key", &config.api_key),
    }
}

/// Number of entries in a model-list body, whichever provider shape it has
pub fn count_models(body: &Value) -> usize {
    ["data", "models", "modelSummaries"]
        .iter()
        .find_map(|field| body.get(*field).and_then(Value::as_array))
        .map_or(0, Vec::len)
}

/// Ask the provider for its model list and return how many models it offers.
///
/// A rejected key surfaces as [`crate::AgentError::Provider`] carrying the
/// provider's own message.
pub async fn list_models(client: &Client, config: &ProviderConfig) -> Result<usize> {
    let body = get_json(
        client,
        config.kind.display_name(),
        &models_url(config),
        auth_headers(config),
    )
    .await?;
    Ok(count_models(&body))
}
