//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: backend
//! URL, where the session token is kept, and the last used email.
//!
//! Configuration is stored at `~/.config/adhyaay/config.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::{FileTokenStore, KeyringTokenStore, MalformedTokenPolicy, TokenStore};

/// Application name used for config/data directory paths
const APP_NAME: &str = "adhyaay";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Backend used when neither the environment nor the config names one
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Environment variable overriding the backend URL
pub const API_URL_ENV: &str = "ADHYAAY_API_URL";

/// Where the session token is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenBackend {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub token_backend: TokenBackend,
    /// Delete stored tokens that cannot be decoded, not only expired ones.
    pub purge_malformed_tokens: bool,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: None,
            token_backend: TokenBackend::default(),
            purge_malformed_tokens: true,
            last_email: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Backend URL: environment first, then config, then the default.
    pub fn api_base_url(&self) -> String {
        self.resolve_api_base_url(std::env::var(API_URL_ENV).ok())
    }

    fn resolve_api_base_url(&self, from_env: Option<String>) -> String {
        from_env
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    pub fn malformed_token_policy(&self) -> MalformedTokenPolicy {
        if self.purge_malformed_tokens {
            MalformedTokenPolicy::Purge
        } else {
            MalformedTokenPolicy::Retain
        }
    }

    /// Open the configured token store.
    pub fn open_token_store(&self) -> Result<Box<dyn TokenStore>> {
        Ok(match self.token_backend {
            TokenBackend::File => Box::new(FileTokenStore::new(&self.data_dir()?)),
            TokenBackend::Keyring => Box::new(KeyringTokenStore::default()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load_from(&dir.path().join("config.json")).expect("load");
        assert_eq!(config.token_backend, TokenBackend::File);
        assert!(config.purge_malformed_tokens);
        assert_eq!(config.malformed_token_policy(), MalformedTokenPolicy::Purge);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            api_base_url: Some("https://api.example.com".to_string()),
            token_backend: TokenBackend::Keyring,
            purge_malformed_tokens: false,
            last_email: Some("asha@example.com".to_string()),
        };
        config.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded.token_backend, TokenBackend::Keyring);
        assert_eq!(loaded.malformed_token_policy(), MalformedTokenPolicy::Retain);
        assert_eq!(loaded.last_email.as_deref(), Some("asha@example.com"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"token_backend": "keyring"}"#).expect("write");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded.token_backend, TokenBackend::Keyring);
        assert!(loaded.purge_malformed_tokens);
    }

    #[test]
    fn test_api_base_url_precedence() {
        let mut config = Config::default();
        assert_eq!(config.resolve_api_base_url(None), DEFAULT_API_BASE_URL);

        config.api_base_url = Some("https://cfg.example.com".to_string());
        assert_eq!(config.resolve_api_base_url(None), "https://cfg.example.com");
        assert_eq!(
            config.resolve_api_base_url(Some("https://env.example.com".to_string())),
            "https://env.example.com"
        );
        assert_eq!(
            config.resolve_api_base_url(Some("  ".to_string())),
            "https://cfg.example.com"
        );
    }
}
