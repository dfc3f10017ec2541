use super::memory::AgentMemory;
use crate::{
    config::{GenerationParams, ProviderConfig, DEFAULT_MAX_ITERATIONS, DEFAULT_TIMEOUT_SECS},
    error::Result,
    services::{provider_from_config, ModelProvider},
    tools::FunctionFactory,
};
use std::time::Duration;

/// A tool-calling conversational agent bound to one model provider.
///
/// The conversation is kept between [`Agent::run`] calls, so follow-up
/// questions see earlier turns. Call [`Agent::reset`] to start over.
#[derive(Debug)]
pub struct Agent {
    provider: Box<dyn ModelProvider>,
    function_factory: FunctionFactory,
    memory: AgentMemory,
    params: GenerationParams,
    max_iterations: usize,
    timeout: Duration,
}

impl Agent {
    pub fn new(provider: impl ModelProvider + 'static, function_factory: FunctionFactory) -> Self {
        Self::with_boxed_provider(Box::new(provider), function_factory)
    }

    pub fn with_boxed_provider(
        provider: Box<dyn ModelProvider>,
        function_factory: FunctionFactory,
    ) -> Self {
        Self {
            provider,
            function_factory,
            memory: AgentMemory::with_default_system(),
            params: GenerationParams::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Build the client described by `config` and wrap it in an agent
    pub fn from_config(config: &ProviderConfig, function_factory: FunctionFactory) -> Result<Self> {
        let provider = provider_from_config(config)?;
        Ok(Self::with_boxed_provider(provider, function_factory).with_params(config.params))
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.memory.set_system_prompt(Some(system_prompt.into()));
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Forget the conversation, keeping the system prompt
    pub fn reset(&mut self) {
        self.memory.clear_steps();
    }

    pub fn memory(&self) -> &AgentMemory {
        &self.memory
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn model_id(&self) -> &str {
        self.provider.model_id()
    }

    pub fn tool_names(&self) -> Vec<&'static str> {
        self.function_factory.tool_names()
    }

    pub(crate) fn provider(&self) -> &dyn ModelProvider {
        self.provider.as_ref()
    }

    pub(crate) fn memory_mut(&mut self) -> &mut AgentMemory {
        &mut self.memory
    }

    pub(crate) fn function_factory(&self) -> &FunctionFactory {
        &self.function_factory
    }

    pub(crate) fn params(&self) -> GenerationParams {
        self.params
    }

    pub(crate) fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }
}
