//! Which tools and instructions each program gives its agents.

use crate::{
    config::{ProviderConfig, ProviderKind, RuntimeSettings},
    tools::{
        CalculatorTool, FunctionFactory, HttpRequestTool, SimpleCalculatorTool, SimpleTranslate,
        TextAnalyzer, TextProcessor, UnitConverter, WeatherTool,
    },
    Agent, Result,
};

/// Named groups of tools handed to an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolSet {
    /// calculator, simple_http_request
    Basic,
    /// calculator, simple_http_request, get_weather_info, simple_translate
    Assistant,
    /// calculator, get_weather_info
    Analyst,
    /// calculator, simple_translate
    Creative,
    /// calculator, simple_http_request, text_processor
    Workbench,
    /// simple_calculator, text_analyzer, unit_converter
    Local,
}

impl ToolSet {
    pub fn factory(self) -> FunctionFactory {
        let factory = FunctionFactory::new();
        match self {
            ToolSet::Basic => factory
                .with_tool(CalculatorTool)
                .with_tool(HttpRequestTool::new()),
            ToolSet::Assistant => factory
                .with_tool(CalculatorTool)
                .with_tool(HttpRequestTool::new())
                .with_tool(WeatherTool)
                .with_tool(SimpleTranslate),
            ToolSet::Analyst => factory.with_tool(CalculatorTool).with_tool(WeatherTool),
            ToolSet::Creative => factory.with_tool(CalculatorTool).with_tool(SimpleTranslate),
            ToolSet::Workbench => factory
                .with_tool(CalculatorTool)
                .with_tool(HttpRequestTool::new())
                .with_tool(TextProcessor),
            ToolSet::Local => factory
                .with_tool(SimpleCalculatorTool)
                .with_tool(TextAnalyzer)
                .with_tool(UnitConverter),
        }
    }
}

/// Everything needed to construct one agent for a program
#[derive(Debug, Clone, PartialEq)]
pub struct AgentProfile {
    /// Name shown in prompts and replies
    pub label: String,
    pub kind: ProviderKind,
    /// Overrides the provider's default model
    pub model_id: Option<String>,
    pub tools: ToolSet,
    pub system_prompt: String,
}

const WORKBENCH_SKILLS: &str = "- advanced mathematical calculations
- HTTP requests and fetching data
- text processing

Use the tools available to you to answer questions accurately.";

impl AgentProfile {
    fn new(
        label: impl Into<String>,
        kind: ProviderKind,
        tools: ToolSet,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            kind,
            model_id: None,
            tools,
            system_prompt: prompt.into(),
        }
    }

    /// Single agent of the `simple` program
    pub fn simple() -> Self {
        Self::new(
            "Agent",
            ProviderKind::Bedrock,
            ToolSet::Basic,
            "You are a smart assistant specialised in:
- mathematical calculations
- HTTP requests and data

Use the tools available to you to answer questions accurately.",
        )
    }

    /// Agents of the `advanced` program
    pub fn advanced(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::Anthropic => Self::new(
                "Anthropic",
                kind,
                ToolSet::Analyst,
                "You are an expert in analysis and precise calculations.",
            ),
            ProviderKind::OpenAI => Self::new(
                "OpenAI",
                kind,
                ToolSet::Creative,
                "You are a creative and innovative problem-solving assistant.",
            ),
            ProviderKind::Bedrock | ProviderKind::Gemini => Self::new(
                "Bedrock",
                ProviderKind::Bedrock,
                ToolSet::Assistant,
                "You are a multi-skilled smart assistant. You can:
- perform complex mathematical calculations
- fetch data from the internet
- provide weather information
- do simple translation

Use the right tool for each task and give accurate, helpful answers.",
            ),
        }
    }

    /// Agents of the `multi` program using each provider's default model
    pub fn multi(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::Bedrock => Self::new(
                "Bedrock (default)",
                kind,
                ToolSet::Workbench,
                format!(
                    "You are a smart assistant specialised in Amazon Bedrock. You can:\n{}",
                    WORKBENCH_SKILLS
                ),
            ),
            ProviderKind::Anthropic => Self::new(
                "Anthropic Claude",
                kind,
                ToolSet::Workbench,
                "You are an expert in analysis and precise calculations using Anthropic Claude.",
            ),
            ProviderKind::OpenAI => Self::new(
                "OpenAI GPT",
                kind,
                ToolSet::Workbench,
                "You are a creative and innovative problem-solving assistant using OpenAI GPT.",
            ),
            ProviderKind::Gemini => Self::new(
                "Google Gemini",
                kind,
                ToolSet::Workbench,
                "You are an advanced smart assistant using Google Gemini.",
            ),
        }
    }

    /// Bedrock agent of the `multi` program running a model picked from the catalog
    pub fn multi_bedrock_model(model_id: &str) -> Self {
        let mut profile = Self::new(
            format!("Bedrock ({})", model_id),
            ProviderKind::Bedrock,
            ToolSet::Workbench,
            format!(
                "You are a smart assistant running on the {} model. You can:\n{}",
                model_id, WORKBENCH_SKILLS
            ),
        );
        profile.model_id = Some(model_id.to_string());
        profile
    }

    /// Agent of the offline demo
    pub fn local() -> Self {
        Self::new(
            "Local",
            ProviderKind::Bedrock,
            ToolSet::Local,
            "You are a simple local assistant. You can:
- perform simple calculations
- analyze text
- convert units

Use the available tools to help the user.",
        )
    }
}

/// Turns profiles into agents. The CLI reads credentials from the
/// environment; tests substitute scripted providers.
pub trait AgentFactory {
    /// Fail early, naming the missing variable, when `kind` has no credential
    fn ensure_credentials(&self, kind: ProviderKind) -> Result<()>;

    fn build(&self, profile: &AgentProfile) -> Result<Agent>;
}

/// Builds agents from environment credentials and the CLI's runtime settings
#[derive(Debug, Clone, Default)]
pub struct EnvAgentFactory {
    settings: RuntimeSettings,
}

impl EnvAgentFactory {
    pub fn new(settings: RuntimeSettings) -> Self {
        Self { settings }
    }
}

impl AgentFactory for EnvAgentFactory {
    fn ensure_credentials(&self, kind: ProviderKind) -> Result<()> {
        ProviderConfig::from_env(kind).map(|_| ())
    }

    fn build(&self, profile: &AgentProfile) -> Result<Agent> {
        let mut config = ProviderConfig::from_env(profile.kind)?;
        if let Some(model_id) = &profile.model_id {
            config = config.with_model(model_id);
        }

        Ok(Agent::from_config(&config, profile.tools.factory())?
            .with_system_prompt(&profile.system_prompt)
            .with_timeout(self.settings.timeout)
            .with_max_iterations(self.settings.max_iterations))
    }
}
