use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Port the reference support backend listens on.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3_000;
pub const DEFAULT_HEALTH_INTERVAL_MS: u64 = 5_000;

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_health_interval_ms() -> u64 {
    DEFAULT_HEALTH_INTERVAL_MS
}

/// Client settings read from `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend root, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Period of the background history poll
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Period of the health probe
    #[serde(default = "default_health_interval_ms")]
    pub health_interval_ms: u64,
    /// Per-request deadline; the transport default applies when unset
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Customer identity to start with
    #[serde(default)]
    pub customer_email: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            poll_interval_ms: default_poll_interval_ms(),
            health_interval_ms: default_health_interval_ms(),
            request_timeout_secs: None,
            customer_email: None,
        }
    }
}

impl ClientConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn health_interval(&self) -> Duration {
        Duration::from_millis(self.health_interval_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.poll_interval(), Duration::from_secs(3));
        assert_eq!(config.health_interval(), Duration::from_secs(5));
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_partial_toml() {
        let config: ClientConfig = toml::from_str(
            r#"
            base_url = "https://support.example.com"
            request_timeout_secs = 20
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://support.example.com");
        assert_eq!(config.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(20)));
    }
}
