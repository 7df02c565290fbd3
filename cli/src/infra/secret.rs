//! Implementations of the `SecretProvider` port.
//!
//! The caller picks the source once per invocation; services only see
//! `SecretProvider::secret`.

use std::io::BufRead;

use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};

use crate::application::ports::SecretProvider;

/// Where the volume password comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// Interactive hidden prompt on the terminal.
    Prompt,
    /// Named environment variable.
    Env(String),
    /// First line of standard input.
    Stdin,
}

/// Production `SecretProvider` for every [`SecretSource`].
#[derive(Debug)]
pub struct TerminalSecrets {
    source: SecretSource,
}

impl TerminalSecrets {
    #[must_use]
    pub fn new(source: SecretSource) -> Self {
        Self { source }
    }
}

impl SecretProvider for TerminalSecrets {
    fn secret(&self, prompt: &str, confirm: bool) -> Result<SecretString> {
        let secret = match &self.source {
            SecretSource::Prompt => {
                if !console::user_attended() {
                    anyhow::bail!(
                        "no terminal to prompt for the volume password; use --password-env or --password-stdin"
                    );
                }
                let mut input = dialoguer::Password::new().with_prompt(prompt);
                if confirm {
                    input = input.with_confirmation("Confirm password", "Passwords do not match");
                }
                SecretString::from(input.interact().context("reading password")?)
            }
            SecretSource::Env(name) => secret_from_env(name, |key| std::env::var(key).ok())?,
            SecretSource::Stdin => {
                let stdin = std::io::stdin();
                secret_from_reader(&mut stdin.lock())?
            }
        };
        tracing::debug!(source = ?self.source_kind(), "volume password obtained");
        Ok(secret)
    }
}

impl TerminalSecrets {
    fn source_kind(&self) -> &'static str {
        match self.source {
            SecretSource::Prompt => "prompt",
            SecretSource::Env(_) => "env",
            SecretSource::Stdin => "stdin",
        }
    }
}

/// Read the secret from the variable `name` via `lookup`.
///
/// # Errors
///
/// Returns an error when the variable is unset or empty.
pub fn secret_from_env(
    name: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SecretString> {
    let value = lookup(name)
        .ok_or_else(|| anyhow::anyhow!("environment variable {name} is not set"))?;
    non_empty(SecretString::from(value))
        .with_context(|| format!("environment variable {name}"))
}

/// Read one line from `reader`, without its line terminator.
///
/// # Errors
///
/// Returns an error on I/O failure or when the line is empty.
pub fn secret_from_reader(reader: &mut impl BufRead) -> Result<SecretString> {
    let mut line = String::new();
    reader.read_line(&mut line).context("reading password from stdin")?;
    let trimmed = line.trim_end_matches(['\r', '\n']).to_string();
    non_empty(SecretString::from(trimmed)).context("standard input")
}

fn non_empty(secret: SecretString) -> Result<SecretString> {
    if secret.expose_secret().is_empty() {
        anyhow::bail!("volume password must not be empty");
    }
    Ok(secret)
}
