use agent_playground_macros::tool;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Simple statistics over a piece of text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStats {
    pub words: usize,
    pub chars: usize,
    pub chars_no_spaces: usize,
    pub average_word_length: f64,
}

/// Count words (whitespace separated), characters and the mean word length.
///
/// Only the ASCII space is excluded from `chars_no_spaces`. Empty input gives
/// an average of zero.
pub fn analyze_text(text: &str) -> TextStats {
    let words = text.split_whitespace().count();
    let chars = text.chars().count();
    let chars_no_spaces = text.chars().filter(|c| *c != ' ').count();
    let average_word_length = if words == 0 {
        0.0
    } else {
        chars_no_spaces as f64 / words as f64
    };

    TextStats {
        words,
        chars,
        chars_no_spaces,
        average_word_length,
    }
}

impl fmt::Display for TextStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Text analysis:")?;
        writeln!(f, "    - Word count: {}", self.words)?;
        writeln!(f, "    - Characters (with spaces): {}", self.chars)?;
        writeln!(f, "    - Characters (without spaces): {}", self.chars_no_spaces)?;
        write!(
            f,
            "    - Average word length: {:.1}",
            self.average_word_length
        )
    }
}

/// Operations understood by [`process_text`]
pub const TEXT_OPERATIONS: &[&str] = &["upper", "lower", "reverse", "count_words", "count_chars"];

/// Apply a named string operation. Unknown operations list the valid ones.
pub fn process_text(text: &str, operation: &str) -> String {
    match operation {
        "upper" => text.to_uppercase(),
        "lower" => text.to_lowercase(),
        "reverse" => text.chars().rev().collect(),
        "count_words" => format!("Word count: {}", text.split_whitespace().count()),
        "count_chars" => format!("Character count: {}", text.chars().count()),
        _ => format!("Available operations: {}", TEXT_OPERATIONS.join(", ")),
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TextAnalyzerParams {
    /// The text to analyze
    pub text: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TextProcessorParams {
    /// The text to process
    pub text: String,
    /// The operation (upper, lower, reverse, count_words, count_chars)
    pub operation: String,
}

tool!(
    name = "text_analyzer",
    description = "Analyze text and report word count, character counts and average word length",
    params = TextAnalyzerParams,
    |params: TextAnalyzerParams| async move {
        Ok(serde_json::Value::String(analyze_text(&params.text).to_string()))
    }
);

tool!(
    name = "text_processor",
    description = "Process text with one operation: upper, lower, reverse, count_words or count_chars",
    params = TextProcessorParams,
    |params: TextProcessorParams| async move {
        Ok(serde_json::Value::String(process_text(
            &params.text,
            &params.operation,
        )))
    }
);
