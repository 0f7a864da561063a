//! Configuration loading and store factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::json_file::JsonFileStore;
use crate::memory::MemoryStore;
use crate::store::FormStore;

/// Which backend holds saved forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Forms live for the duration of the process.
    Memory,
    /// Forms live in one JSON file.
    Json {
        #[serde(default = "default_store_path")]
        path: PathBuf,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Json {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./formeval-forms.json")
}

/// Top-level formeval configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormevalConfig {
    /// Saved-form backend.
    #[serde(default)]
    pub store: StoreConfig,
    /// Output directory for submission reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./formeval-results")
}

impl Default for FormevalConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            output_dir: default_output_dir(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Unset variables resolve to the empty string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `formeval.toml` in the current directory
/// 2. `~/.config/formeval/config.toml`
///
/// `FORMEVAL_STORE_PATH` overrides the store with a JSON file at that path.
pub fn load_config() -> Result<FormevalConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<FormevalConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("formeval.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => FormevalConfig::default(),
    };

    if let Ok(path) = std::env::var("FORMEVAL_STORE_PATH") {
        if !path.trim().is_empty() {
            config.store = StoreConfig::Json {
                path: PathBuf::from(path),
            };
        }
    }

    tracing::debug!(
        source = ?config_path,
        store = ?config.store,
        "configuration loaded"
    );
    Ok(config)
}

/// Parse config text and resolve `${VAR}` references in its paths.
pub fn parse_config(content: &str) -> Result<FormevalConfig> {
    let mut config: FormevalConfig = toml::from_str(content)?;
    if let StoreConfig::Json { path } = &mut config.store {
        *path = resolve_path(path);
    }
    config.output_dir = resolve_path(&config.output_dir);
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("formeval"))
}

/// Create a store instance from its configuration.
pub fn create_store(config: &StoreConfig) -> Box<dyn FormStore> {
    match config {
        StoreConfig::Memory => Box::new(MemoryStore::new()),
        StoreConfig::Json { path } => Box::new(JsonFileStore::new(path)),
    }
}
