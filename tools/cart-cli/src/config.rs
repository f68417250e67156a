//! CLI configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use turbo_cart::{CartSettings, DEFAULT_STORAGE_KEY};

/// File names searched for, in order, from the working directory upwards.
pub const CONFIG_FILE_NAMES: [&str; 3] =
    ["turbo-cart.toml", ".turbo-cart.toml", "turbo-cart.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Storefront backend.
    #[serde(default)]
    pub api: ApiConfig,

    /// Where the cart is persisted.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Cart session settings.
    pub fn cart_settings(&self) -> CartSettings {
        CartSettings::default().with_storage_key(self.storage.key.clone())
    }

    /// Problems that would make the CLI misbehave.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let url = self.api.base_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(format!("api.base_url must be an http(s) URL, got '{}'", url));
        }
        if self.api.timeout_ms == 0 {
            errors.push("api.timeout_ms must be greater than 0".to_string());
        }
        if self.storage.key.trim().is_empty() {
            errors.push("storage.key must not be empty".to_string());
        }
        if let Err(e) = EnvFilter::try_new(&self.logging.level) {
            errors.push(format!("logging.level '{}' is invalid: {}", self.logging.level, e));
        }

        errors
    }
}

/// Storefront backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the stock and product endpoints.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Bearer token sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl ApiConfig {
    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            token: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3333".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

/// Cart persistence settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the store; relative paths resolve against the
    /// directory of the config file.
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,

    /// Key the cart is stored under.
    #[serde(default = "default_storage_key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            key: default_storage_key(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(".turbo-cart")
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

/// Log settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line human-readable output.
    #[default]
    Compact,
    /// One JSON object per line.
    Json,
}

/// Generate a default config file.
pub fn generate_default_config() -> String {
    format!(
        r#"# TurboCart configuration

[api]
base_url = "{base_url}"
timeout_ms = {timeout_ms}
# token = "..."

[storage]
path = ".turbo-cart"
key = "{key}"

[logging]
level = "warn"
format = "compact"
"#,
        base_url = default_base_url(),
        timeout_ms = default_timeout_ms(),
        key = DEFAULT_STORAGE_KEY,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.api.base_url, "http://localhost:3333");
        assert_eq!(config.storage.key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn test_partial_config() {
        let config: CliConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://shop.example.com/api"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://shop.example.com/api");
        assert_eq!(config.api.timeout(), Duration::from_millis(5000));
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_generated_config_parses_and_validates() {
        let config: CliConfig = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config, CliConfig::default());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut config = CliConfig::default();
        config.api.base_url = "localhost:3333".to_string();
        config.api.timeout_ms = 0;
        config.storage.key = " ".to_string();

        let errors = config.validate();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("api.base_url"));
    }

    #[test]
    fn test_load_json_and_toml() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("turbo-cart.json");
        std::fs::write(&json_path, r#"{"storage": {"key": "@Shop:cart"}}"#).unwrap();
        assert_eq!(CliConfig::load(&json_path).unwrap().storage.key, "@Shop:cart");

        let toml_path = dir.path().join("turbo-cart.toml");
        std::fs::write(&toml_path, "[api]\ntimeout_ms = 250\n").unwrap();
        assert_eq!(CliConfig::load(&toml_path).unwrap().api.timeout_ms, 250);
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("turbo-cart.toml");
        std::fs::write(&path, "[api\n").unwrap();
        let err = CliConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML config"));
    }

    #[test]
    fn test_cart_settings_use_storage_key() {
        let mut config = CliConfig::default();
        config.storage.key = "@Shop:cart".to_string();
        assert_eq!(config.cart_settings().storage_key, "@Shop:cart");
    }
}
