pub mod demo;
pub mod keys;
pub mod menu;
pub mod profiles;
pub mod session;

use crate::{config::RuntimeSettings, env::load_env_file};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use profiles::EnvAgentFactory;
use session::{run_advanced, run_multi, run_simple, Console};
use std::{path::PathBuf, time::Duration};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line definition for the agent playground
pub fn command() -> Command {
    Command::new("agent-playground")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Interactive LLM agents for Bedrock, Anthropic, OpenAI and Gemini")
        .arg(
            Arg::new("env-file")
                .long("env-file")
                .value_name("PATH")
                .help("File of KEY=VALUE lines loaded before anything else")
                .value_parser(value_parser!(PathBuf))
                .default_value(".env")
                .global(true),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("SECONDS")
                .help("Timeout for each model call in seconds")
                .value_parser(value_parser!(u64))
                .default_value("120")
                .global(true),
        )
        .arg(
            Arg::new("max-iterations")
                .short('i')
                .long("max-iterations")
                .value_name("COUNT")
                .help("Maximum model calls per question")
                .value_parser(value_parser!(usize))
                .default_value("10")
                .global(true),
        )
        .subcommand(
            Command::new("simple").about("Single Bedrock agent with calculator and HTTP tools"),
        )
        .subcommand(
            Command::new("advanced").about("Choose between Bedrock, Anthropic and OpenAI agents"),
        )
        .subcommand(
            Command::new("multi")
                .about("Every provider, including a Bedrock model picker (default)"),
        )
        .subcommand(Command::new("demo").about("Run the local tools without contacting a model"))
        .subcommand(
            Command::new("keys")
                .about("Show which provider API keys are configured")
                .arg(
                    Arg::new("check")
                        .long("check")
                        .help("Also call each provider's model list to confirm the key works")
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn runtime_settings(matches: &ArgMatches) -> anyhow::Result<RuntimeSettings> {
    let env_file = matches
        .get_one::<PathBuf>("env-file")
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("--env-file has no value"))?;
    let timeout = matches
        .get_one::<u64>("timeout")
        .copied()
        .ok_or_else(|| anyhow::anyhow!("--timeout has no value"))?;
    let max_iterations = matches
        .get_one::<usize>("max-iterations")
        .copied()
        .ok_or_else(|| anyhow::anyhow!("--max-iterations has no value"))?;

    Ok(RuntimeSettings {
        env_file,
        timeout: Duration::from_secs(timeout),
        max_iterations,
    })
}

/// CLI entry point for the agent playground
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let matches = command().get_matches();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = runtime_settings(&matches)?;
    if let Err(err) = load_env_file(&settings.env_file) {
        eprintln!("⚠️ {}", err);
    }

    let subcommand = matches.subcommand_name().unwrap_or("multi");
    let check_keys = matches
        .subcommand_matches("keys")
        .is_some_and(|keys| keys.get_flag("check"));
    info!(subcommand, ?settings, "starting agent playground");

    let factory = EnvAgentFactory::new(settings);
    let mut stdout = std::io::stdout();
    let mut console = Console::new(
        tokio::io::BufReader::new(tokio::io::stdin()),
        std::io::stdout(),
    );

    let program = async {
        match subcommand {
            "simple" => run_simple(&mut console, &factory).await,
            "advanced" => run_advanced(&mut console, &factory).await,
            "demo" => demo::run_demo(&mut stdout, &factory),
            "keys" => keys::run_keys(&mut stdout, check_keys).await,
            _ => run_multi(&mut console, &factory).await,
        }
    };

    tokio::select! {
        outcome = program => {
            if let Err(err) = outcome {
                warn!(error = %err, "session ended with an error");
                eprintln!("❌ {}", err);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\nTerminated.");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_MAX_ITERATIONS, DEFAULT_TIMEOUT_SECS};

    #[test]
    fn global_flags_parse_after_subcommand() {
        let matches = command()
            .try_get_matches_from([
                "agent-playground",
                "advanced",
                "--timeout",
                "30",
                "--env-file",
                "keys.env",
            ])
            .unwrap();

        assert_eq!(matches.subcommand_name(), Some("advanced"));
        let (_, sub) = matches.subcommand().unwrap();
        let settings = runtime_settings(sub).unwrap();
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.env_file, PathBuf::from("keys.env"));
        assert_eq!(settings.max_iterations, DEFAULT_MAX_ITERATIONS);
    }

    #[test]
    fn defaults_apply_without_subcommand() {
        let matches = command().try_get_matches_from(["agent-playground"]).unwrap();
        assert_eq!(matches.subcommand_name(), None);

        let settings = runtime_settings(&matches).unwrap();
        assert_eq!(settings.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(settings.env_file, PathBuf::from(".env"));
    }

    #[test]
    fn keys_check_flag_is_optional() {
        let matches = command()
            .try_get_matches_from(["agent-playground", "keys", "--check"])
            .unwrap();
        let keys = matches.subcommand_matches("keys").unwrap();
        assert!(keys.get_flag("check"));

        let matches = command()
            .try_get_matches_from(["agent-playground", "keys"])
            .unwrap();
        assert!(!matches.subcommand_matches("keys").unwrap().get_flag("check"));
    }

    #[test]
    fn timeout_help_names_the_model_call() {
        let mut command = command();
        let help = command.render_long_help().to_string();
        assert!(help.contains("Timeout for each model call in seconds"));
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        assert!(command()
            .try_get_matches_from(["agent-playground", "--timeout", "soon"])
            .is_err());
    }
}
