//! Interactive loops shared by the CLI programs.

use super::{
    menu::{
        parse_advanced_choice, parse_multi_choice, render_bedrock_models, AdvancedChoice,
        MultiChoice, ADVANCED_MENU, MODEL_PROMPT, MULTI_MENU,
    },
    profiles::{AgentFactory, AgentProfile},
};
use crate::{
    config::{bedrock_model, ProviderKind},
    Agent, AgentError,
};
use std::{fmt::Display, io::Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

pub const EXIT_WORDS: &[&str] = &["exit", "quit", "خروج"];
pub const BACK_WORDS: &[&str] = &["back", "رجوع"];
pub const API_KEY_HINT: &str = "Make sure the required API keys are configured.";

/// Line-oriented console over any async reader and writer
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `prompt` and read one trimmed line. `None` at end of input.
    pub async fn prompt(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    pub fn say(&mut self, text: impl Display) -> anyhow::Result<()> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

/// How a chat loop presents itself
#[derive(Debug, Clone)]
pub struct ChatStyle {
    pub question_prompt: String,
    pub working: &'static str,
    pub reply_prefix: String,
    pub error_prefix: &'static str,
    pub leave_words: &'static [&'static str],
}

impl ChatStyle {
    fn simple() -> Self {
        Self {
            question_prompt: "👤 Your question: ".to_string(),
            working: "🤖 Thinking...",
            reply_prefix: "🤖 Answer: ".to_string(),
            error_prefix: "❌ Error: ",
            leave_words: EXIT_WORDS,
        }
    }

    fn advanced(label: &str) -> Self {
        Self {
            question_prompt: format!("\n👤 Your question for {}: ", label),
            working: "🤖 Working...",
            reply_prefix: format!("🤖 {}: ", label),
            error_prefix: "❌ Error: ",
            leave_words: BACK_WORDS,
        }
    }

    fn multi(label: &str) -> Self {
        Self {
            question_prompt: format!("\nYour question for {}: ", label),
            working: "Working...",
            reply_prefix: format!("{}: ", label),
            error_prefix: "Error: ",
            leave_words: BACK_WORDS,
        }
    }
}

/// Why a chat loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatEnd {
    /// The user typed one of the leave words
    Left,
    EndOfInput,
}

/// Configuration errors are shown without their kind prefix
fn setup_failure(err: &AgentError) -> String {
    match err {
        AgentError::Config(message) => message.clone(),
        other => other.to_string(),
    }
}

fn is_leave_word(input: &str, words: &[&str]) -> bool {
    let lowered = input.to_lowercase();
    words.iter().any(|word| *word == lowered)
}

/// Forward each line to `agent` and print its reply until a leave word.
///
/// Agent errors are printed and the loop carries on.
pub async fn chat_loop<R, W>(
    console: &mut Console<R, W>,
    agent: &mut Agent,
    style: &ChatStyle,
) -> anyhow::Result<ChatEnd>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    loop {
        let Some(input) = console.prompt(&style.question_prompt).await? else {
            return Ok(ChatEnd::EndOfInput);
        };
        if is_leave_word(&input, style.leave_words) {
            return Ok(ChatEnd::Left);
        }
        if input.is_empty() {
            continue;
        }

        console.say(style.working)?;
        match agent.run(&input).await {
            Ok(response) => console.say(format!("{}{}\n", style.reply_prefix, response))?,
            Err(err) => {
                console.say(format!("{}{}", style.error_prefix, err))?;
                console.say(API_KEY_HINT)?;
            }
        }
    }
}

/// One agent, tools for calculations and HTTP
pub async fn run_simple<R, W>(
    console: &mut Console<R, W>,
    factory: &dyn AgentFactory,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    console.say("🤖 Hello! I'm an agent equipped with a few tools.")?;
    console.say("I can help with calculations and HTTP requests.")?;
    console.say("Type 'exit' to quit.\n")?;

    let mut agent = match factory.build(&AgentProfile::simple()) {
        Ok(agent) => agent,
        Err(err) => {
            console.say(format!("❌ Error: {}", err))?;
            console.say(API_KEY_HINT)?;
            return Ok(());
        }
    };

    if chat_loop(console, &mut agent, &ChatStyle::simple()).await? == ChatEnd::Left {
        console.say("👋 Goodbye!")?;
    }
    Ok(())
}

/// Menu of three providers, each with its own tools and instructions
pub async fn run_advanced<R, W>(
    console: &mut Console<R, W>,
    factory: &dyn AgentFactory,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    console.say("🚀 Welcome to the advanced agent playground!")?;
    console.say(ADVANCED_MENU.render())?;

    loop {
        let Some(choice) = console.prompt(ADVANCED_MENU.prompt).await? else {
            return Ok(());
        };

        let kind = match parse_advanced_choice(&choice) {
            Some(AdvancedChoice::Exit) => {
                console.say("👋 Goodbye!")?;
                return Ok(());
            }
            Some(AdvancedChoice::Agent(kind)) => kind,
            None => {
                console.say("❌ Invalid choice")?;
                continue;
            }
        };

        let profile = AgentProfile::advanced(kind);
        let mut agent = match factory.build(&profile) {
            Ok(agent) => agent,
            Err(err) => {
                console.say(format!(
                    "❌ Error setting up {}: {}",
                    profile.label,
                    setup_failure(&err)
                ))?;
                continue;
            }
        };
        debug!(label = %profile.label, model = agent.model_id(), "agent activated");

        console.say(format!("\n✅ {} Agent activated", profile.label))?;
        console.say("Type 'back' to return to the agent menu")?;

        if chat_loop(console, &mut agent, &ChatStyle::advanced(&profile.label)).await?
            == ChatEnd::EndOfInput
        {
            return Ok(());
        }
    }
}

/// Menu over every provider, including a Bedrock model picker
pub async fn run_multi<R, W>(
    console: &mut Console<R, W>,
    factory: &dyn AgentFactory,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    console.say("Welcome to the multi-provider agent playground!")?;
    console.say(MULTI_MENU.render())?;

    loop {
        let Some(choice) = console.prompt(MULTI_MENU.prompt).await? else {
            return Ok(());
        };

        let profile = match parse_multi_choice(&choice) {
            Some(MultiChoice::Exit) => {
                console.say("Goodbye!")?;
                return Ok(());
            }
            Some(MultiChoice::BedrockDefault) => AgentProfile::multi(ProviderKind::Bedrock),
            Some(MultiChoice::BedrockPickModel) => {
                if let Err(err) = factory.ensure_credentials(ProviderKind::Bedrock) {
                    console.say(setup_failure(&err))?;
                    continue;
                }
                console.say(render_bedrock_models())?;
                let Some(model_choice) = console.prompt(MODEL_PROMPT).await? else {
                    return Ok(());
                };
                match bedrock_model(&model_choice) {
                    Some(model_id) => AgentProfile::multi_bedrock_model(model_id),
                    None => {
                        console.say("Invalid choice")?;
                        continue;
                    }
                }
            }
            Some(MultiChoice::Direct(kind)) => AgentProfile::multi(kind),
            None => {
                console.say("Invalid choice")?;
                continue;
            }
        };

        let mut agent = match factory.build(&profile) {
            Ok(agent) => agent,
            Err(err) => {
                console.say(setup_failure(&err))?;
                continue;
            }
        };
        debug!(label = %profile.label, model = agent.model_id(), "agent activated");

        console.say(format!("\n{} activated", profile.label))?;
        console.say("Type 'back' to return to the provider menu")?;

        if chat_loop(console, &mut agent, &ChatStyle::multi(&profile.label)).await?
            == ChatEnd::EndOfInput
        {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leave_words_ignore_case() {
        assert!(is_leave_word("EXIT", EXIT_WORDS));
        assert!(is_leave_word("خروج", EXIT_WORDS));
        assert!(is_leave_word("Back", BACK_WORDS));
        assert!(!is_leave_word("exit", BACK_WORDS));
    }

    #[tokio::test]
    async fn prompt_trims_and_reports_end_of_input() {
        let input: &[u8] = b"  hello  \n";
        let mut console = Console::new(input, Vec::new());

        assert_eq!(
            console.prompt("> ").await.unwrap(),
            Some("hello".to_string())
        );
        assert_eq!(console.prompt("> ").await.unwrap(), None);
        assert_eq!(String::from_utf8(console.into_output()).unwrap(), "> > ");
    }
}
