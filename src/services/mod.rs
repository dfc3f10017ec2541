//! Model provider clients and the agent execution loop

pub mod anthropic_client;
pub mod bedrock_client;
mod execution;
pub mod gemini_client;
mod http;
pub mod models;
pub mod openai_client;
pub mod provider;

pub use anthropic_client::AnthropicClient;
pub use bedrock_client::BedrockClient;
pub use gemini_client::GeminiClient;
pub use http::RetryPolicy;
pub use openai_client::OpenAIClient;
pub use provider::{ModelProvider, ModelRequest, ModelResponse};

use crate::{
    config::{ProviderConfig, ProviderKind},
    error::{AgentError, Result},
};
use tracing::info;

/// Construct the client for `config.kind`
pub fn provider_from_config(config: &ProviderConfig) -> Result<Box<dyn ModelProvider>> {
    if config.api_key.trim().is_empty() {
        return Err(AgentError::Config(format!(
            "{} not found",
            config.kind.api_key_vars()[0]
        )));
    }

    info!(
        provider = config.kind.display_name(),
        model = %config.model_id,
        "creating model client"
    );

    let provider: Box<dyn ModelProvider> = match config.kind {
        ProviderKind::Bedrock => {
            let mut client = BedrockClient::new(&config.api_key, &config.model_id);
            if let Some(region) = &config.region {
                client = client.with_region(region);
            }
            if let Some(endpoint) = &config.base_url {
                client = client.with_endpoint(endpoint);
            }
            Box::new(client)
        }
        ProviderKind::Anthropic => {
            let mut client = AnthropicClient::new(&config.api_key, &config.model_id);
            if let Some(base_url) = &config.base_url {
                client = client.with_base_url(base_url);
            }
            Box::new(client)
        }
        ProviderKind::OpenAI => {
            let mut client = OpenAIClient::new(&config.api_key, &config.model_id);
            if let Some(base_url) = &config.base_url {
                client = client.with_base_url(base_url);
            }
            Box::new(client)
        }
        ProviderKind::Gemini => {
            let mut client = GeminiClient::new(&config.api_key, &config.model_id);
            if let Some(base_url) = &config.base_url {
                client = client.with_base_url(base_url);
            }
            Box::new(client)
        }
    };
    Ok(provider)
}
