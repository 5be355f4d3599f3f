//! Configuration loading, validation, and management for rumormill.
//!
//! Loads configuration from `rumormill.toml` in the working directory (or a
//! caller-supplied path) with `RUMORMILL_*` environment variable overrides.
//! Missing file means defaults. Validates all settings at load.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `rumormill.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Collection namespace; records written under one app id are invisible
    /// under another, even in the same database file.
    #[serde(default = "default_app_id")]
    pub app_id: String,

    /// Quiet period in milliseconds before a labeling task fires.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Identity configuration
    #[serde(default)]
    pub identity: IdentityConfig,
}

fn default_app_id() -> String {
    "default-app-id".into()
}
fn default_debounce_ms() -> u64 {
    700
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("app_id", &self.app_id)
            .field("debounce_ms", &self.debounce_ms)
            .field("store", &self.store)
            .field("identity", &self.identity)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend name: "sqlite" or "memory".
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// Database path (sqlite backend only).
    #[serde(default = "default_store_path")]
    pub path: String,
}

fn default_store_backend() -> String {
    "sqlite".into()
}
fn default_store_path() -> String {
    "rumormill.db".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            path: default_store_path(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Bootstrap credential to exchange for an identity instead of signing
    /// in anonymously.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bootstrap_token: Option<String>,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("bootstrap_token", &redact(&self.bootstrap_token))
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (`./rumormill.toml`),
    /// honoring `RUMORMILL_CONFIG` for the file location and `RUMORMILL_*`
    /// variables for individual overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("RUMORMILL_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("rumormill.toml"));
        Self::load_from(&path)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
        } else {
            tracing::info!("No config file found at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Environment variable overrides (highest priority).
    fn apply_env_overrides(&mut self) {
        if let Ok(app_id) = std::env::var("RUMORMILL_APP_ID") {
            self.app_id = app_id;
        }
        if let Ok(ms) = std::env::var("RUMORMILL_DEBOUNCE_MS")
            && let Ok(ms) = ms.parse()
        {
            self.debounce_ms = ms;
        }
        if let Ok(backend) = std::env::var("RUMORMILL_STORE_BACKEND") {
            self.store.backend = backend;
        }
        if let Ok(path) = std::env::var("RUMORMILL_STORE_PATH") {
            self.store.path = path;
        }
        if self.identity.bootstrap_token.is_none() {
            self.identity.bootstrap_token = std::env::var("RUMORMILL_BOOTSTRAP_TOKEN").ok();
        }
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.store.backend.as_str() {
            "sqlite" | "memory" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "store.backend must be \"sqlite\" or \"memory\", got \"{other}\""
                )));
            }
        }

        if self.debounce_ms == 0 {
            return Err(ConfigError::ValidationError(
                "debounce_ms must be at least 1".into(),
            ));
        }

        if self.app_id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "app_id must not be empty".into(),
            ));
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_id: default_app_id(),
            debounce_ms: default_debounce_ms(),
            store: StoreConfig::default(),
            identity: IdentityConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}
