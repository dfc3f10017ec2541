//! Restricted arithmetic expressions.
//!
//! Expressions are tokenized and parsed against a fixed grammar, so nothing
//! outside arithmetic, parentheses and the whitelisted functions and constants
//! can ever be evaluated.

mod eval;
mod lexer;
mod number;
mod parser;

pub use number::{format_float, Number};

use thiserror::Error;

/// Characters accepted by [`EvalMode::Basic`].
pub const BASIC_ALLOWED_CHARS: &str = "0123456789+-*/(). ";

/// Functions callable in [`EvalMode::Scientific`].
pub const SCIENTIFIC_FUNCTIONS: &[&str] = &[
    "abs", "round", "min", "max", "sum", "pow", "sqrt", "sin", "cos", "tan", "log", "exp",
];

/// Constants resolvable in [`EvalMode::Scientific`].
pub const SCIENTIFIC_CONSTANTS: &[&str] = &["pi", "e"];

/// Which inputs the evaluator accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalMode {
    /// Digits, `+ - * / ( ) .` and spaces only. No names.
    Basic,
    /// Full grammar plus the scientific symbol table.
    Scientific,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("expression contains disallowed characters")]
    DisallowedCharacters,

    #[error("invalid syntax: {0}")]
    Syntax(String),

    #[error("name '{0}' is not defined")]
    UnknownName(String),

    #[error("'{0}' is not callable")]
    NotCallable(String),

    #[error("function '{0}' must be called")]
    UncalledFunction(String),

    #[error("{0}")]
    Arity(String),

    #[error("{0}")]
    Type(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("math domain error")]
    MathDomain,

    #[error("math range error")]
    Overflow,
}

/// Evaluate `input` under the given mode.
pub fn evaluate(input: &str, mode: EvalMode) -> Result<Number, EvalError> {
    if mode == EvalMode::Basic && !input.chars().all(|c| BASIC_ALLOWED_CHARS.contains(c)) {
        return Err(EvalError::DisallowedCharacters);
    }

    let tokens = lexer::tokenize(input)?;
    let ast = parser::parse(&tokens)?;
    eval::evaluate(&ast, mode)
}
