#![cfg(feature = "cli")]

use agent_playground::{
    cli::{
        profiles::{AgentFactory, AgentProfile},
        session::{run_advanced, run_multi, run_simple, Console},
    },
    config::ProviderKind,
    Agent, AgentError, AgentStep, ModelProvider, ModelRequest, ModelResponse, Result,
};
use async_trait::async_trait;

/// Answers with the latest task text
#[derive(Debug)]
struct EchoProvider;

#[async_trait]
impl ModelProvider for EchoProvider {
    fn name(&self) -> &'static str {
        "Echo"
    }

    fn model_id(&self) -> &str {
        "echo-1"
    }

    async fn converse(&self, request: &ModelRequest<'_>) -> Result<ModelResponse> {
        let task = request
            .steps
            .iter()
            .rev()
            .find_map(|step| match step {
                AgentStep::Task { content } => Some(content.as_str()),
                _ => None,
            })
            .unwrap_or_default();
        Ok(ModelResponse::text(format!("echo: {}", task)))
    }
}

/// Builds echo agents; providers listed in `missing` have no credentials
struct EchoFactory {
    missing: Vec<ProviderKind>,
}

impl AgentFactory for EchoFactory {
    fn ensure_credentials(&self, kind: ProviderKind) -> Result<()> {
        if self.missing.contains(&kind) {
            return Err(AgentError::Config(format!(
                "{} not found",
                kind.api_key_vars()[0]
            )));
        }
        Ok(())
    }

    fn build(&self, profile: &AgentProfile) -> Result<Agent> {
        self.ensure_credentials(profile.kind)?;
        Ok(Agent::new(EchoProvider, profile.tools.factory())
            .with_system_prompt(&profile.system_prompt))
    }
}

fn scripted(input: &'static str) -> Console<&'static [u8], Vec<u8>> {
    Console::new(input.as_bytes(), Vec::new())
}

fn transcript(console: Console<&'static [u8], Vec<u8>>) -> String {
    String::from_utf8(console.into_output()).unwrap()
}

#[tokio::test]
async fn test_simple_session_answers_until_exit() {
    let factory = EchoFactory { missing: vec![] };
    let mut console = scripted("\nhello there\nEXIT\n");
    run_simple(&mut console, &factory).await.unwrap();
    let output = transcript(console);

    assert!(output.contains("🤖 Answer: echo: hello there"));
    assert_eq!(output.matches("🤖 Thinking...").count(), 1);
    assert!(output.ends_with("👋 Goodbye!\n"));
}

#[tokio::test]
async fn test_simple_session_reports_missing_credentials() {
    let factory = EchoFactory {
        missing: vec![ProviderKind::Bedrock],
    };
    let mut console = scripted("hello\n");
    run_simple(&mut console, &factory).await.unwrap();
    let output = transcript(console);

    assert!(output.contains("❌ Error: Configuration error: AWS_BEDROCK_API_KEY not found"));
    assert!(output.contains("Make sure the required API keys are configured."));
    assert!(!output.contains("Your question"));
}

#[tokio::test]
async fn test_advanced_session_switches_agents() {
    let factory = EchoFactory {
        missing: vec![ProviderKind::OpenAI],
    };
    let mut console = scripted("7\n3\n2\nhow hot?\nرجوع\n4\n");
    run_advanced(&mut console, &factory).await.unwrap();
    let output = transcript(console);

    assert!(output.contains("❌ Invalid choice"));
    assert!(output.contains("❌ Error setting up OpenAI: OPENAI_API_KEY not found"));
    assert!(output.contains("✅ Anthropic Agent activated"));
    assert!(output.contains("🤖 Anthropic: echo: how hot?"));
    assert!(output.ends_with("👋 Goodbye!\n"));
}

#[tokio::test]
async fn test_multi_session_skips_missing_providers() {
    let factory = EchoFactory {
        missing: vec![ProviderKind::Anthropic],
    };
    let mut console = scripted("9\n3\n5\nhi\nback\n6\n");
    run_multi(&mut console, &factory).await.unwrap();
    let output = transcript(console);

    assert!(output.contains("Invalid choice"));
    assert!(output.contains("ANTHROPIC_API_KEY not found\n"));
    assert!(!output.contains("Configuration error"));
    assert!(output.contains("Google Gemini activated"));
    assert!(output.contains("Google Gemini: echo: hi"));
    assert!(output.ends_with("Goodbye!\n"));
}

#[tokio::test]
async fn test_multi_session_picks_bedrock_model() {
    let factory = EchoFactory { missing: vec![] };
    let mut console = scripted("2\n8\n2\n4\nwhich model?\n");
    run_multi(&mut console, &factory).await.unwrap();
    let output = transcript(console);

    assert!(output.contains("Available Bedrock models:"));
    assert_eq!(output.matches("Invalid choice").count(), 1);
    assert!(output.contains("Bedrock (us.amazon.nova-pro-v1:0) activated"));
    assert!(output.contains("Bedrock (us.amazon.nova-pro-v1:0): echo: which model?"));
    assert!(!output.contains("Goodbye!"));
}

#[tokio::test]
async fn test_multi_session_needs_bedrock_key_before_picking() {
    let factory = EchoFactory {
        missing: vec![ProviderKind::Bedrock],
    };
    let mut console = scripted("2\n6\n");
    run_multi(&mut console, &factory).await.unwrap();
    let output = transcript(console);

    assert!(output.contains("AWS_BEDROCK_API_KEY not found"));
    assert!(!output.contains("Available Bedrock models:"));
}
