use crate::{
    config::{bedrock_region, ProviderConfig, ProviderKind, DEFAULT_BEDROCK_REGION},
    env::{credential, mask_secret},
    services::models::list_models,
    AgentError,
};
use reqwest::Client;
use std::{io::Write, time::Duration};

/// Per-request limit for the connectivity check
pub const CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Print which provider credentials are present, masked. Returns how many
/// providers are configured.
pub fn report<W: Write>(out: &mut W) -> anyhow::Result<usize> {
    writeln!(out, "🔑 API key check")?;
    writeln!(out, "{}", "=".repeat(40))?;

    let mut configured = 0;
    for kind in ProviderKind::ALL {
        match credential(kind.api_key_vars()) {
            Some((var, value)) => {
                configured += 1;
                writeln!(
                    out,
                    "✅ {}: {} = {}",
                    kind.display_name(),
                    var,
                    mask_secret(&value)
                )?;
            }
            None => writeln!(
                out,
                "❌ {}: set {}",
                kind.display_name(),
                kind.api_key_vars().join(" or ")
            )?,
        }
    }

    match bedrock_region() {
        Some(region) => writeln!(out, "\nBedrock region: {}", region)?,
        None => writeln!(out, "\nBedrock region: {} (default)", DEFAULT_BEDROCK_REGION)?,
    }
    writeln!(
        out,
        "{} of {} providers configured",
        configured,
        ProviderKind::ALL.len()
    )?;
    Ok(configured)
}

/// Contact the model-list endpoint of every provider that has a credential.
/// Returns how many providers accepted their key.
pub async fn check<W: Write>(out: &mut W) -> anyhow::Result<usize> {
    let client = Client::builder().timeout(CHECK_TIMEOUT).build()?;
    let configs: Vec<ProviderConfig> = ProviderKind::ALL
        .into_iter()
        .filter_map(|kind| ProviderConfig::from_env(kind).ok())
        .collect();
    check_configs(out, &client, &configs).await
}

/// Contact the model-list endpoint for each of `configs`
pub async fn check_configs<W: Write>(
    out: &mut W,
    client: &Client,
    configs: &[ProviderConfig],
) -> anyhow::Result<usize> {
    writeln!(out, "\n🌐 Connectivity check")?;
    writeln!(out, "{}", "-".repeat(40))?;

    let mut valid = 0;
    for config in configs {
        let name = config.kind.display_name();
        match list_models(client, config).await {
            Ok(count) => {
                valid += 1;
                writeln!(out, "✅ {}: key is valid ({} models available)", name, count)?;
            }
            Err(AgentError::Provider {
                status, message, ..
            }) => writeln!(out, "❌ {}: status {}: {}", name, status, message)?,
            Err(AgentError::Http(err)) if err.is_timeout() => {
                writeln!(out, "❌ {}: connection timed out", name)?
            }
            Err(err) => writeln!(out, "❌ {}: {}", name, err)?,
        }
    }

    writeln!(out, "{} of {} keys accepted", valid, configs.len())?;
    Ok(valid)
}

/// The `keys` program: the credential report, then the optional connectivity check
pub async fn run_keys<W: Write>(out: &mut W, check_connectivity: bool) -> anyhow::Result<()> {
    report(out)?;
    if check_connectivity {
        check(out).await?;
    }
    Ok(())
}
