//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use tokio::sync::mpsc::UnboundedReceiver;
use turbo_cache::FileStore;
use turbo_cart::{CartManager, ChannelNotifier, HttpCatalog, Notification};
use turbo_data::FetchClient;

use crate::config::{CliConfig, CONFIG_FILE_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// File the configuration came from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

/// An open cart together with the notifications its operations raise.
pub struct CartSession {
    pub manager: CartManager<FileStore>,
    notifications: UnboundedReceiver<Notification>,
}

impl CartSession {
    /// Print every notification raised so far.
    pub fn flush_notifications(&mut self, output: &Output) {
        while let Ok(notification) = self.notifications.try_recv() {
            output.notification(&notification);
        }
    }
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => {
                let path = PathBuf::from(path);
                (CliConfig::load(&path)?, Some(path))
            }
            None => match find_config(&cwd)? {
                Some((config, path)) => (config, Some(path)),
                None => (CliConfig::default(), None),
            },
        };

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Directory the cart store lives in.
    ///
    /// Relative paths resolve against the config file's directory, or the
    /// working directory when no config file was found.
    pub fn storage_dir(&self) -> PathBuf {
        let path = &self.config.storage.path;
        if path.is_absolute() {
            return path.clone();
        }
        let base = self
            .config_path
            .as_deref()
            .and_then(Path::parent)
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(self.cwd.as_path());
        base.join(path)
    }

    /// HTTP client for the storefront API.
    pub fn fetch_client(&self) -> FetchClient {
        let api = &self.config.api;
        let mut client = FetchClient::new()
            .with_base_url(api.base_url.clone())
            .with_timeout(api.timeout())
            .with_default_header("Accept", "application/json");
        if let Some(token) = &api.token {
            client = client.with_bearer_auth(token.clone());
        }
        client
    }

    /// Open the persisted cart.
    pub fn open_cart(&self) -> Result<CartSession> {
        let dir = self.storage_dir();
        self.output.debug(&format!("Cart store: {}", dir.display()));

        let store = FileStore::open(&dir)
            .with_context(|| format!("Failed to open cart store at {}", dir.display()))?;
        let catalog = HttpCatalog::new(self.fetch_client());
        let (notifier, notifications) = ChannelNotifier::new();

        let manager = CartManager::open(
            store,
            Arc::new(catalog),
            Arc::new(notifier),
            self.config.cart_settings(),
        )
        .with_context(|| format!("Failed to load cart from {}", dir.display()))?;

        Ok(CartSession {
            manager,
            notifications,
        })
    }
}

/// Find a config file in the directory tree, starting at `start`.
fn find_config(start: &Path) -> Result<Option<(CliConfig, PathBuf)>> {
    for dir in start.ancestors() {
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            if path.is_file() {
                return Ok(Some((CliConfig::load(&path)?, path)));
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(config: CliConfig, config_path: Option<PathBuf>, cwd: &Path) -> Context {
        Context {
            config,
            config_path,
            output: Output::new(false, true),
            cwd: cwd.to_path_buf(),
        }
    }

    #[test]
    fn test_find_config_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("turbo-cart.toml"), "[api]\ntimeout_ms = 42\n").unwrap();

        let (config, path) = find_config(&nested).unwrap().unwrap();
        assert_eq!(config.api.timeout_ms, 42);
        assert_eq!(path, dir.path().join("turbo-cart.toml"));
    }

    #[test]
    fn test_find_config_prefers_nearest() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("shop");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("turbo-cart.toml"), "[api]\ntimeout_ms = 1\n").unwrap();
        std::fs::write(nested.join("turbo-cart.json"), r#"{"api": {"timeout_ms": 2}}"#).unwrap();

        let (config, _) = find_config(&nested).unwrap().unwrap();
        assert_eq!(config.api.timeout_ms, 2);
    }

    #[test]
    fn test_storage_dir_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().join("cwd");

        let ctx = context(CliConfig::default(), None, &cwd);
        assert_eq!(ctx.storage_dir(), cwd.join(".turbo-cart"));

        let config_path = dir.path().join("project").join("turbo-cart.toml");
        let ctx = context(CliConfig::default(), Some(config_path), &cwd);
        assert_eq!(ctx.storage_dir(), dir.path().join("project").join(".turbo-cart"));

        let mut config = CliConfig::default();
        config.storage.path = dir.path().join("abs");
        let ctx = context(config, None, &cwd);
        assert_eq!(ctx.storage_dir(), dir.path().join("abs"));
    }

    #[test]
    fn test_open_cart_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(CliConfig::default(), None, dir.path());

        let session = ctx.open_cart().unwrap();
        assert!(session.manager.cart().is_empty());
        assert!(dir.path().join(".turbo-cart").is_dir());
    }

    #[test]
    fn test_open_cart_rejects_corrupt_store() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(CliConfig::default(), None, dir.path());
        drop(ctx.open_cart().unwrap());

        let store = FileStore::open(ctx.storage_dir()).unwrap();
        turbo_cache::KeyValueStore::set(&store, turbo_cart::DEFAULT_STORAGE_KEY, b"not json")
            .unwrap();

        let err = ctx.open_cart().err().unwrap();
        assert!(err.to_string().starts_with("Failed to load cart"));
    }
}
