use super::{
    tool::{ToolRegistry, ToolSpec},
    Tool,
};
use crate::{AgentError, Result};
use jsonschema::JSONSchema;
use serde_json::Value;
use tracing::debug;

/// Factory for creating and managing function/tool execution
#[derive(Debug)]
pub struct FunctionFactory {
    registry: ToolRegistry,
}

impl FunctionFactory {
    /// Create a new function factory
    pub fn new() -> Self {
        Self {
            registry: ToolRegistry::new(),
        }
    }

    /// Register a tool with the factory
    pub fn register_tool<T: Tool + 'static>(&mut self, tool: T) {
        self.registry.register(tool);
    }

    /// Builder-style registration
    pub fn with_tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.register_tool(tool);
        self
    }

    /// Execute a function call by name.
    ///
    /// Arguments are checked against the tool's JSON Schema before the tool runs.
    pub async fn execute_function(&self, function_name: &str, parameters: Value) -> Result<Value> {
        let tool = self
            .registry
            .get(function_name)
            .ok_or_else(|| AgentError::ToolNotFound(function_name.to_string()))?;

        validate_arguments(function_name, &tool.parameters_schema(), &parameters)?;

        debug!(tool = function_name, %parameters, "executing tool");
        tool.execute(parameters).await
    }

    /// Describe all available tools for a model request
    pub fn tool_specs(&self) -> Vec<ToolSpec> {
        self.registry.specs()
    }

    /// Names of the registered tools, sorted
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.registry.list().iter().map(|tool| tool.name()).collect()
    }

    /// Check if a function exists
    pub fn has_function(&self, name: &str) -> bool {
        self.registry.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

impl Default for FunctionFactory {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_arguments(function_name: &str, schema: &Value, arguments: &Value) -> Result<()> {
    let compiled = JSONSchema::compile(schema).map_err(|err| {
        AgentError::Config(format!(
            "Tool '{}' has an invalid parameter schema: {}",
            function_name, err
        ))
    })?;

    if let Err(errors) = compiled.validate(arguments) {
        let details = errors
            .map(|error| {
                let path = error.instance_path.to_string();
                if path.is_empty() {
                    error.to_string()
                } else {
                    format!("{}: {}", path, error)
                }
            })
            .collect::<Vec<_>>()
            .join("; ");
        return Err(AgentError::Validation(format!(
            "Arguments for '{}' do not match its schema: {}",
            function_name, details
        )));
    }

    Ok(())
}
