use crate::config::{ProviderKind, BEDROCK_MODELS};
use std::fmt::Write as _;

/// A numbered selection menu
#[derive(Debug, Clone, Copy)]
pub struct Menu {
    pub title: &'static str,
    pub entries: &'static [(&'static str, &'static str)],
    pub prompt: &'static str,
}

impl Menu {
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\n{}", self.title);
        for (key, label) in self.entries {
            let _ = writeln!(out, "{}. {}", key, label);
        }
        out.pop();
        out
    }
}

pub const ADVANCED_MENU: Menu = Menu {
    title: "Available agents:",
    entries: &[
        ("1", "Bedrock Agent (default)"),
        ("2", "Anthropic Agent"),
        ("3", "OpenAI Agent"),
        ("4", "Exit"),
    ],
    prompt: "\nChoose an agent (1-4): ",
};

pub const MULTI_MENU: Menu = Menu {
    title: "Available providers:",
    entries: &[
        ("1", "Amazon Bedrock (default)"),
        ("2", "Amazon Bedrock (choose model)"),
        ("3", "Anthropic Claude (direct)"),
        ("4", "OpenAI GPT"),
        ("5", "Google Gemini"),
        ("6", "Exit"),
    ],
    prompt: "\nChoose a provider (1-6): ",
};

pub const MODEL_PROMPT: &str = "\nChoose a model (1-5): ";

/// The Bedrock model catalog as shown by the model picker
pub fn render_bedrock_models() -> String {
    let mut out = String::from("\nAvailable Bedrock models:");
    for (index, (key, model)) in BEDROCK_MODELS.iter().enumerate() {
        let _ = write!(out, "\n{}. {}", key, model);
        if index == 0 {
            out.push_str(" (default)");
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvancedChoice {
    Agent(ProviderKind),
    Exit,
}

pub fn parse_advanced_choice(input: &str) -> Option<AdvancedChoice> {
    match input.trim() {
        "1" => Some(AdvancedChoice::Agent(ProviderKind::Bedrock)),
        "2" => Some(AdvancedChoice::Agent(ProviderKind::Anthropic)),
        "3" => Some(AdvancedChoice::Agent(ProviderKind::OpenAI)),
        "4" => Some(AdvancedChoice::Exit),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiChoice {
    BedrockDefault,
    BedrockPickModel,
    Direct(ProviderKind),
    Exit,
}

pub fn parse_multi_choice(input: &str) -> Option<MultiChoice> {
    match input.trim() {
        "1" => Some(MultiChoice::BedrockDefault),
        "2" => Some(MultiChoice::BedrockPickModel),
        "3" => Some(MultiChoice::Direct(ProviderKind::Anthropic)),
        "4" => Some(MultiChoice::Direct(ProviderKind::OpenAI)),
        "5" => Some(MultiChoice::Direct(ProviderKind::Gemini)),
        "6" => Some(MultiChoice::Exit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menus_render_numbered_entries() {
        let rendered = MULTI_MENU.render();
        assert!(rendered.starts_with("\nAvailable providers:\n1. Amazon Bedrock (default)"));
        assert!(rendered.ends_with("6. Exit"));
    }

    #[test]
    fn model_catalog_marks_the_default() {
        let rendered = render_bedrock_models();
        assert!(rendered.contains("1. anthropic.claude-sonnet-4-20250514-v1:0 (default)"));
        assert!(rendered.contains("5. us.meta.llama3-2-90b-instruct-v1:0"));
        assert_eq!(rendered.matches("(default)").count(), 1);
    }

    #[test]
    fn choices_parse_and_reject() {
        assert_eq!(
            parse_advanced_choice(" 2 "),
            Some(AdvancedChoice::Agent(ProviderKind::Anthropic))
        );
        assert_eq!(parse_advanced_choice("5"), None);
        assert_eq!(
            parse_multi_choice("5"),
            Some(MultiChoice::Direct(ProviderKind::Gemini))
        );
        assert_eq!(parse_multi_choice("6"), Some(MultiChoice::Exit));
        assert_eq!(parse_multi_choice("seven"), None);
        assert_eq!(parse_multi_choice(""), None);
    }
}
