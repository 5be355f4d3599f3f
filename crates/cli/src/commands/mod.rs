//! Subcommand implementations and shared wiring.

pub mod history;
pub mod run;

use std::path::Path;
use std::sync::Arc;

use rumormill_config::AppConfig;
use rumormill_core::store::DocumentStore;
use rumormill_store::{InMemoryStore, SqliteStore};

pub(crate) fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    tracing::debug!(?config, "Configuration loaded");
    Ok(config)
}

/// Build the store backend named by the config.
pub(crate) async fn build_store(
    config: &AppConfig,
) -> Result<Arc<dyn DocumentStore>, Box<dyn std::error::Error>> {
    match config.store.backend.as_str() {
        "memory" => Ok(Arc::new(InMemoryStore::new())),
        "sqlite" => Ok(Arc::new(
            SqliteStore::new(&config.store.path, &config.app_id).await?,
        )),
        // Config validation already rejected anything else.
        other => Err(format!("Unknown store backend: {other}").into()),
    }
}

/// Shorten text for single-line display.
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.replace(['\n', '\r'], " ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut: String = flat.chars().take(max_chars).collect();
    format!("{cut}…")
}
