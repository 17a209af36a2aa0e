//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

// Re-export component configs
pub use crate::insights::InsightsConfig;
pub use crate::profile::ProfileConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
    #[serde(default)]
    pub insights: InsightsConfig,
}

/// Aptos fullnode access
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_node_url")]
    pub node_url: String,
    /// Transactions fetched per wallet
    #[serde(default = "default_tx_limit")]
    pub tx_limit: u32,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_elapsed_ms")]
    pub retry_max_elapsed_ms: u64,
}

fn default_node_url() -> String {
    "https://fullnode.mainnet.aptoslabs.com".to_string()
}

fn default_tx_limit() -> u32 {
    100
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_retry_base_delay_ms() -> u64 {
    250
}

fn default_retry_max_elapsed_ms() -> u64 {
    5_000
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            node_url: default_node_url(),
            tx_limit: default_tx_limit(),
            timeout_ms: default_timeout_ms(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_elapsed_ms: default_retry_max_elapsed_ms(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Start with defaults
            .set_default("ledger.node_url", default_node_url())?
            .set_default("ledger.tx_limit", default_tx_limit() as i64)?
            .set_default("ledger.timeout_ms", default_timeout_ms() as i64)?
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix PROFILER_)
            .add_source(
                config::Environment::with_prefix("PROFILER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !is_http_url(&self.ledger.node_url) {
            anyhow::bail!("ledger.node_url must be an http(s) URL, got '{}'", self.ledger.node_url);
        }

        if self.ledger.tx_limit == 0 {
            anyhow::bail!("ledger.tx_limit must be positive");
        }

        if self.ledger.timeout_ms == 0 {
            anyhow::bail!("ledger.timeout_ms must be positive");
        }

        if self.insights.enabled {
            if !is_http_url(&self.insights.base_url) {
                anyhow::bail!(
                    "insights.base_url must be an http(s) URL, got '{}'",
                    self.insights.base_url
                );
            }

            for (name, temperature) in [
                ("summary_temperature", self.insights.summary_temperature),
                ("handle_temperature", self.insights.handle_temperature),
                ("entity_temperature", self.insights.entity_temperature),
            ] {
                if !(0.0..=2.0).contains(&temperature) {
                    anyhow::bail!("insights.{} must be between 0 and 2, got {}", name, temperature);
                }
            }
        }

        if self.profile.display_transactions == 0 {
            tracing::warn!("profile.display_transactions is 0 - profiles will carry no records");
        }

        Ok(())
    }

    /// Get masked configuration for display (hide secrets)
    pub fn masked_display(&self) -> String {
        format!(
            r#"Configuration:
  Ledger:
    node_url: {}
    tx_limit: {}
    timeout: {}ms
    retry: {}ms base, {}ms max
  Profile:
    display_transactions: {}
  Insights:
    enabled: {}
    base_url: {}
    api_key: {}
    models: summary={}, handle={}, entity={}
    entity_sample: {}
"#,
            mask_url(&self.ledger.node_url),
            self.ledger.tx_limit,
            self.ledger.timeout_ms,
            self.ledger.retry_base_delay_ms,
            self.ledger.retry_max_elapsed_ms,
            self.profile.display_transactions,
            self.insights.enabled,
            mask_url(&self.insights.base_url),
            if self.insights.api_key.is_empty() {
                "(not set)"
            } else {
                "***"
            },
            self.insights.summary_model,
            self.insights.handle_model,
            self.insights.entity_model,
            self.insights.entity_sample,
        )
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Mask URL for display (hide API keys in query params)
fn mask_url(url: &str) -> String {
    if let Some(idx) = url.find('?') {
        format!("{}?***", &url[..idx])
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ledger.tx_limit, 100);
        assert_eq!(config.profile.display_transactions, 20);
        assert_eq!(config.insights.entity_model, "qwen-qwq-32b");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.ledger.node_url, "https://fullnode.mainnet.aptoslabs.com");
        assert_eq!(config.ledger.retry_max_elapsed_ms, 5_000);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profiler.toml");
        std::fs::write(
            &path,
            r#"
[ledger]
node_url = "https://fullnode.testnet.aptoslabs.com"
tx_limit = 25

[profile]
display_transactions = 5

[insights]
enabled = false
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.ledger.node_url, "https://fullnode.testnet.aptoslabs.com");
        assert_eq!(config.ledger.tx_limit, 25);
        assert_eq!(config.profile.display_transactions, 5);
        assert!(!config.insights.enabled);
        assert_eq!(config.insights.handle_max_tokens, 10);
    }

    #[test]
    fn test_rejects_zero_limit() {
        let mut config = Config::default();
        config.ledger.tx_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_temperature() {
        let mut config = Config::default();
        config.insights.handle_temperature = 3.5;
        assert!(config.validate().is_err());

        // Insight settings are not checked when insights are disabled
        config.insights.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_masked_display_hides_key() {
        let mut config = Config::default();
        config.insights.api_key = "gsk_secret".to_string();
        let shown = config.masked_display();
        assert!(!shown.contains("gsk_secret"));
        assert!(shown.contains("api_key: ***"));
    }

    #[test]
    fn test_mask_url() {
        assert_eq!(
            mask_url("https://api.example.com?key=secret"),
            "https://api.example.com?***"
        );
        assert_eq!(
            mask_url("https://api.example.com"),
            "https://api.example.com"
        );
    }
}
