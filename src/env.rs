//! Environment loading and credential lookup.

use crate::{AgentError, Result};
use std::path::Path;
use tracing::{debug, info, warn};

/// Load `KEY=VALUE` pairs from `path` into the process environment.
///
/// Blank lines and `#` comments are skipped and values from the file take
/// precedence over variables that are already set. Lines that do not parse
/// are logged and skipped. A missing file is not an error; the number of
/// variables loaded is returned.
pub fn load_env_file(path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(err) if err.not_found() => {
            debug!(path = %path.display(), "no env file found");
            return Ok(0);
        }
        Err(err) => {
            return Err(AgentError::Config(format!(
                "Failed to read {}: {}",
                path.display(),
                err
            )))
        }
    };

    let mut loaded = 0;
    for entry in entries {
        let (key, value) = match entry {
            Ok(pair) => pair,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping malformed env line");
                continue;
            }
        };
        std::env::set_var(key.trim(), value.trim());
        loaded += 1;
    }

    info!(path = %path.display(), loaded, "loaded environment file");
    Ok(loaded)
}

/// First non-empty value among `vars`, with the name it was found under.
pub fn credential(vars: &[&'static str]) -> Option<(&'static str, String)> {
    vars.iter().find_map(|var| {
        std::env::var(var)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(|value| (*var, value))
    })
}

/// Hide most of a secret, keeping a short prefix and suffix for recognition.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len().clamp(4, 8));
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
