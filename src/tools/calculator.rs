use super::{schema::decode_params, Tool};
use crate::expr::{evaluate, EvalError, EvalMode};
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// Parameters for calculator tools
#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CalculatorParams {
    /// The arithmetic expression to evaluate
    pub expression: String,
}

/// Evaluate digits, `+ - * / ( ) .` and spaces.
///
/// Returns `"Result: <n>"`, or an error message when the input contains any
/// other character or fails to evaluate.
pub fn simple_calculator(expression: &str) -> String {
    match evaluate(expression, EvalMode::Basic) {
        Ok(value) => format!("Result: {}", value),
        Err(EvalError::DisallowedCharacters) => {
            "Error: expression contains disallowed characters".to_string()
        }
        Err(err) => format!("Calculation error: {}", err),
    }
}

/// Evaluate an expression with the scientific function table
/// (`sqrt`, `sin`, `log`, `pi`, ...).
pub fn calculator(expression: &str) -> String {
    match evaluate(expression, EvalMode::Scientific) {
        Ok(value) => format!("Result: {}", value),
        Err(err) => format!("Calculation error: {}", err),
    }
}

fn expression_schema(example: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "expression": {
                "type": "string",
                "description": format!("The arithmetic expression, e.g. \"{}\"", example)
            }
        },
        "required": ["expression"]
    })
}

/// Basic arithmetic calculator restricted to digits and operators
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleCalculatorTool;

impl SimpleCalculatorTool {
    pub fn new() -> Self {
        Self
    }
}

impl Tool for SimpleCalculatorTool {
    fn name(&self) -> &'static str {
        "simple_calculator"
    }

    fn description(&self) -> &'static str {
        "Simple calculator for arithmetic expressions using digits, + - * / and parentheses"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        expression_schema("2 + 3 * 4")
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
        Box::pin(async move {
            let params: CalculatorParams = decode_params(self.name(), parameters)?;
            Ok(serde_json::Value::String(simple_calculator(&params.expression)))
        })
    }
}

/// Scientific calculator with a fixed table of math functions and constants
#[derive(Debug, Clone, Copy, Default)]
pub struct CalculatorTool;

impl CalculatorTool {
    pub fn new() -> Self {
        Self
    }
}

impl Tool for CalculatorTool {
    fn name(&self) -> &'static str {
        "calculator"
    }

    fn description(&self) -> &'static str {
        "Advanced calculator. Supports + - * / // % **, parentheses, abs, round, min, max, sum, pow, sqrt, sin, cos, tan, log, exp and the constants pi and e"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        expression_schema("sqrt(16) + 2**3")
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
        Box::pin(async move {
            let params: CalculatorParams = decode_params(self.name(), parameters)?;
            Ok(serde_json::Value::String(calculator(&params.expression)))
        })
    }
}
