//! Storefront configuration.
//!
//! Stored as TOML:
//! - Linux: `~/.config/apkstore/storefront.toml`
//! - Windows: `%APPDATA%/apkstore/storefront.toml`

use std::path::{Path, PathBuf};

use apkstore_directory::CategoryFilter;
use serde::{Deserialize, Serialize};

/// Host configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the listing backend.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Bearer token sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Principal the token authenticates as. Enables caller-scoped queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<String>,

    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Search text applied to the directory on start.
    #[serde(default)]
    pub search: String,

    /// Category tab selected on start.
    #[serde(default)]
    pub category: CategoryFilter,
}

fn default_backend_url() -> String {
    "http://127.0.0.1:8080".into()
}

fn default_timeout() -> u64 {
    30
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            api_token: None,
            principal: None,
            request_timeout_secs: default_timeout(),
            search: String::new(),
            category: CategoryFilter::All,
        }
    }
}

impl StoreConfig {
    /// Loads configuration from disk, or creates a default if not found.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            let config = StoreConfig::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Writes the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        // May hold an API token.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }
}

/// Returns the platform-specific configuration file path.
fn config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        PathBuf::from(appdata).join("apkstore").join("storefront.toml")
    }

    #[cfg(not(target_os = "windows"))]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home)
            .join(".config")
            .join("apkstore")
            .join("storefront.toml")
    }
}
