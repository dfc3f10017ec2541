//! Offline walkthrough of the local tools.

use super::profiles::{AgentFactory, AgentProfile};
use crate::tools::{calculator::simple_calculator, text::analyze_text, units::unit_converter};
use std::io::Write;

const SAMPLE_TEXT: &str = "مرحباً بك في عالم الذكاء الاصطناعي";

/// Try to build the local agent, then call each local tool directly.
///
/// Never contacts a model; a missing credential only changes the first lines.
pub fn run_demo<W: Write>(out: &mut W, factory: &dyn AgentFactory) -> anyhow::Result<()> {
    writeln!(out, "🤖 Agent playground demo")?;
    writeln!(out, "{}", "=".repeat(40))?;

    match factory.build(&AgentProfile::local()) {
        Ok(agent) => {
            writeln!(out, "✅ Agent created successfully!")?;
            writeln!(out, "Tools: {}", agent.tool_names().join(", "))?;
        }
        Err(err) => {
            writeln!(out, "⚠️ Could not create the agent: {}", err)?;
            writeln!(out, "To use a model:")?;
            writeln!(out, "1. Copy .env.example to .env")?;
            writeln!(out, "2. Add your API keys")?;
            writeln!(out, "3. Run `agent-playground keys` to check them")?;
        }
    }

    writeln!(out, "\nTesting tools directly:")?;
    writeln!(out, "Calculator: {}", simple_calculator("15 * 3 + 7"))?;
    writeln!(out, "Text analyzer:\n{}", analyze_text(SAMPLE_TEXT))?;
    writeln!(out, "Unit conversion: {}", unit_converter(100, "cm", "m"))?;

    writeln!(out, "\nNext steps:")?;
    writeln!(out, "  agent-playground keys      check configured API keys")?;
    writeln!(out, "  agent-playground simple    single agent with basic tools")?;
    writeln!(out, "  agent-playground advanced  one agent per provider")?;
    writeln!(out, "  agent-playground multi     every provider, Bedrock model picker")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ProviderKind, Agent, AgentError, Result};

    struct NoCredentials;

    impl AgentFactory for NoCredentials {
        fn ensure_credentials(&self, kind: ProviderKind) -> Result<()> {
            Err(AgentError::Config(format!(
                "{} not found",
                kind.api_key_vars()[0]
            )))
        }

        fn build(&self, profile: &AgentProfile) -> Result<Agent> {
            self.ensure_credentials(profile.kind)?;
            unreachable!()
        }
    }

    #[test]
    fn demo_runs_tools_without_credentials() {
        let mut out = Vec::new();
        run_demo(&mut out, &NoCredentials).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Could not create the agent: Configuration error: AWS_BEDROCK_API_KEY not found"));
        assert!(text.contains("Calculator: Result: 52"));
        assert!(text.contains("Text analyzer:\nText analysis:"));
        assert!(text.contains("Unit conversion: 100 cm = 1.0 m"));
        assert!(text.contains("Next steps:"));
    }
}
