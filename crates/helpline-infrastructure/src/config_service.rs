//! Client configuration loading.
//!
//! Priority (highest first):
//! 1. Command-line flags (applied by the binary)
//! 2. Environment variables (`HELPLINE_BASE_URL`, `HELPLINE_CUSTOMER_EMAIL`)
//! 3. `config.toml`
//! 4. Built-in defaults

use crate::storage::AtomicTomlFile;
use helpline_core::config::ClientConfig;
use helpline_core::error::{HelplineError, Result};
use std::path::PathBuf;

pub const ENV_BASE_URL: &str = "HELPLINE_BASE_URL";
pub const ENV_CUSTOMER_EMAIL: &str = "HELPLINE_CUSTOMER_EMAIL";

pub struct ConfigService {
    file: AtomicTomlFile<ClientConfig>,
}

impl ConfigService {
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path),
        }
    }

    /// Loads `config.toml` and applies the overrides found through `lookup`.
    ///
    /// A missing file is not an error; a malformed one is. The result is not
    /// validated: callers add their own layers (command-line flags) and then
    /// run [`validate`] once on the final value.
    pub fn load_layers<F>(&self, lookup: F) -> Result<ClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(apply_overrides(self.load_file()?, lookup))
    }

    fn load_file(&self) -> Result<ClientConfig> {
        match self.file.load()? {
            Some(config) => {
                tracing::debug!(
                    "[ConfigService] Loaded {}",
                    self.file.path().display()
                );
                Ok(config)
            }
            None => {
                tracing::debug!(
                    "[ConfigService] No config at {}, using defaults",
                    self.file.path().display()
                );
                Ok(ClientConfig::default())
            }
        }
    }
}

/// Applies overrides looked up through `lookup` (the environment in production).
pub fn apply_overrides<F>(mut config: ClientConfig, lookup: F) -> ClientConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
        config.base_url = base_url;
    }
    if let Some(email) = lookup(ENV_CUSTOMER_EMAIL).filter(|v| !v.trim().is_empty()) {
        config.customer_email = Some(email);
    }
    config.base_url = config.base_url.trim().trim_end_matches('/').to_string();
    config
}

/// Rejects settings the scheduler cannot run with.
pub fn validate(config: &ClientConfig) -> Result<()> {
    if config.base_url.is_empty() {
        return Err(HelplineError::config("base_url must not be empty"));
    }
    if !(config.base_url.starts_with("http://") || config.base_url.starts_with("https://")) {
        return Err(HelplineError::config(format!(
            "base_url must start with http:// or https:// (got '{}')",
            config.base_url
        )));
    }
    if config.poll_interval_ms == 0 || config.health_interval_ms == 0 {
        return Err(HelplineError::config("intervals must be greater than zero"));
    }
    Ok(())
}
