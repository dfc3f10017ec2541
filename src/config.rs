//! Provider selection and runtime settings.

use crate::{env::credential, AgentError, Result};
use std::{fmt, path::PathBuf, time::Duration};

pub const DEFAULT_BEDROCK_REGION: &str = "us-west-2";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Cross-region inference profile used when no Bedrock model is picked
pub const DEFAULT_BEDROCK_MODEL: &str = "us.anthropic.claude-sonnet-4-20250514-v1:0";

/// Bedrock models offered by the model picker, keyed by menu number.
/// The first entry is the one the picker labels as the default.
pub const BEDROCK_MODELS: &[(&str, &str)] = &[
    ("1", "anthropic.claude-sonnet-4-20250514-v1:0"),
    ("2", "anthropic.claude-3-5-sonnet-20241022-v2:0"),
    ("3", "us.amazon.nova-premier-v1:0"),
    ("4", "us.amazon.nova-pro-v1:0"),
    ("5", "us.meta.llama3-2-90b-instruct-v1:0"),
];

/// Resolve a model-picker key to a Bedrock model identifier.
pub fn bedrock_model(key: &str) -> Option<&'static str> {
    BEDROCK_MODELS
        .iter()
        .find(|(candidate, _)| *candidate == key.trim())
        .map(|(_, model)| *model)
}

/// Region set through `AWS_REGION` or `AWS_DEFAULT_REGION`, if any
pub fn bedrock_region() -> Option<String> {
    non_empty_var("AWS_REGION").or_else(|| non_empty_var("AWS_DEFAULT_REGION"))
}

/// The model backends the agent can talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Bedrock,
    Anthropic,
    OpenAI,
    Gemini,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Bedrock,
        ProviderKind::Anthropic,
        ProviderKind::OpenAI,
        ProviderKind::Gemini,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            ProviderKind::Bedrock => "Amazon Bedrock",
            ProviderKind::Anthropic => "Anthropic Claude",
            ProviderKind::OpenAI => "OpenAI GPT",
            ProviderKind::Gemini => "Google Gemini",
        }
    }

    /// Environment variables holding the credential, in lookup order
    pub fn api_key_vars(self) -> &'static [&'static str] {
        match self {
            ProviderKind::Bedrock => &["AWS_BEDROCK_API_KEY", "AWS_BEARER_TOKEN_BEDROCK"],
            ProviderKind::Anthropic => &["ANTHROPIC_API_KEY"],
            ProviderKind::OpenAI => &["OPENAI_API_KEY"],
            ProviderKind::Gemini => &["GOOGLE_API_KEY"],
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::Bedrock => DEFAULT_BEDROCK_MODEL,
            ProviderKind::Anthropic => "claude-sonnet-4-20250514",
            ProviderKind::OpenAI => "gpt-4",
            ProviderKind::Gemini => "gemini-2.5-pro",
        }
    }

    pub fn default_params(self) -> GenerationParams {
        match self {
            ProviderKind::Anthropic => GenerationParams {
                max_tokens: Some(2048),
                temperature: Some(0.7),
            },
            _ => GenerationParams::default(),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Sampling parameters forwarded to the model
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// Everything needed to construct a model client
#[derive(Clone)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: String,
    pub model_id: String,
    pub params: GenerationParams,
    pub base_url: Option<String>,
    pub region: Option<String>,
}

impl ProviderConfig {
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            kind,
            api_key: api_key.into(),
            model_id: kind.default_model().to_string(),
            params: kind.default_params(),
            base_url: None,
            region: None,
        }
    }

    /// Build a config from the process environment.
    ///
    /// Fails with a configuration error naming the missing variable when no
    /// credential is set.
    pub fn from_env(kind: ProviderKind) -> Result<Self> {
        let (_, api_key) = credential(kind.api_key_vars()).ok_or_else(|| {
            AgentError::Config(format!("{} not found", kind.api_key_vars()[0]))
        })?;

        let mut config = Self::new(kind, api_key);
        match kind {
            ProviderKind::OpenAI => {
                config.base_url = non_empty_var("OPENAI_BASE_URL");
            }
            ProviderKind::Anthropic => {
                config.base_url = non_empty_var("ANTHROPIC_BASE_URL");
            }
            ProviderKind::Bedrock => {
                config.region = bedrock_region();
            }
            ProviderKind::Gemini => {}
        }
        Ok(config)
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("api_key", &crate::env::mask_secret(&self.api_key))
            .field("model_id", &self.model_id)
            .field("params", &self.params)
            .field("base_url", &self.base_url)
            .field("region", &self.region)
            .finish()
    }
}

/// Settings shared by every agent the CLI constructs
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub env_file: PathBuf,
    pub timeout: Duration,
    pub max_iterations: usize,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            env_file: PathBuf::from(".env"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_picker_keys() {
        assert_eq!(
            bedrock_model("1"),
            Some("anthropic.claude-sonnet-4-20250514-v1:0")
        );
        assert_eq!(bedrock_model(" 4 "), Some("us.amazon.nova-pro-v1:0"));
        assert_eq!(bedrock_model("6"), None);
        assert_eq!(bedrock_model(""), None);
    }

    #[test]
    fn defaults_follow_the_provider() {
        let config = ProviderConfig::new(ProviderKind::Anthropic, "key");
        assert_eq!(config.model_id, "claude-sonnet-4-20250514");
        assert_eq!(config.params.max_tokens, Some(2048));
        assert_eq!(config.params.temperature, Some(0.7));

        let config = ProviderConfig::new(ProviderKind::Gemini, "key").with_model("gemini-2.0-flash");
        assert_eq!(config.model_id, "gemini-2.0-flash");
        assert_eq!(config.params, GenerationParams::default());
    }

    #[test]
    fn bedrock_defaults_to_the_inference_profile() {
        let config = ProviderConfig::new(ProviderKind::Bedrock, "key");
        assert_eq!(config.model_id, "us.anthropic.claude-sonnet-4-20250514-v1:0");
        assert_eq!(
            BEDROCK_MODELS[0].1,
            "anthropic.claude-sonnet-4-20250514-v1:0"
        );
    }

    #[test]
    fn debug_output_masks_the_key() {
        let config = ProviderConfig::new(ProviderKind::OpenAI, "sk-proj-abcdefghijklmnop");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("abcdefghijklmnop"));
        assert!(rendered.contains("sk-p...mnop"));
    }
}
