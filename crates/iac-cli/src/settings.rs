//! Persisted CLI settings.
//!
//! Settings live in `config.toml` in the platform config directory. Missing
//! keys fall back to defaults. The backend URL is resolved with this
//! precedence: `--backend-url`, then `IAC_BACKEND_URL`, then the file, then
//! the built-in default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use iac_client::ClientConfig;
use serde::{Deserialize, Serialize};

/// Environment variable overriding the configured backend URL.
pub const BACKEND_URL_ENV: &str = "IAC_BACKEND_URL";

/// CLI settings.
///
/// Serialized to TOML and stored in the user's config directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Analysis backend connection.
    pub backend: ClientConfig,
}

impl Settings {
    /// Load settings from a specific path, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Self::default();
        };
        match toml::from_str(&content) {
            Ok(settings) => settings,
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "ignoring unreadable settings file");
                Self::default()
            }
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create config directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("serialize settings")?;
        std::fs::write(path, content).with_context(|| format!("write {}", path.display()))
    }

    /// Get the default config file path.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("org", "ImageAuthenticityChecker", "iac")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Effective backend configuration after applying overrides.
    ///
    /// Blank values are skipped, so an empty flag does not hide the environment.
    pub fn resolve_backend<'a>(&self, flag: Option<&'a str>, env: Option<&'a str>) -> ClientConfig {
        let mut config = self.backend.clone();
        let non_blank = |url: Option<&'a str>| url.map(str::trim).filter(|url| !url.is_empty());
        if let Some(url) = non_blank(flag).or_else(|| non_blank(env)) {
            config.base_url = url.to_string();
        }
        config
    }
}
