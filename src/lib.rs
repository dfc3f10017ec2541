//! agent-playground: interactive LLM agents with a handful of local tools
//!
//! The library wires a tool-calling agent loop to Amazon Bedrock, Anthropic,
//! OpenAI and Google Gemini. Tools are plain Rust types implementing [`Tool`],
//! registered in a [`FunctionFactory`] and described to the model through
//! JSON schemas.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use agent_playground::{
//!     tools::CalculatorTool, Agent, FunctionFactory, ProviderConfig, ProviderKind,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProviderConfig::from_env(ProviderKind::Anthropic)?;
//!     let function_factory = FunctionFactory::new().with_tool(CalculatorTool::new());
//!
//!     let mut agent = Agent::from_config(&config, function_factory)?;
//!
//!     let response = agent.run("What is sqrt(16) + 2**3?").await?;
//!     println!("{}", response);
//!     Ok(())
//! }
//! ```

extern crate self as agent_playground;

pub mod config;
pub mod core;
pub mod env;
pub mod error;
pub mod expr;
pub mod services;
pub mod tools;
pub mod types;

pub use agent_playground_macros::tool;
pub use config::{GenerationParams, ProviderConfig, ProviderKind};
pub use core::{
    Agent, AgentMemory, AgentStep, RunResult, TokenUsage, ToolCall, ToolExecution, ToolOutput,
};
pub use error::{AgentError, Result};
pub use services::{
    AnthropicClient, BedrockClient, GeminiClient, ModelProvider, ModelRequest, ModelResponse,
    OpenAIClient, RetryPolicy,
};
pub use tools::{FunctionFactory, Tool, ToolSpec};

#[cfg(feature = "cli")]
pub mod cli;
