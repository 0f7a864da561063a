//! Schema file loader.
//!
//! Loads form schemas from JSON or TOML files and directories.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::model::FormSchema;

/// On-disk schema document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    Json,
    Toml,
}

impl SchemaFormat {
    /// Pick a format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "json" => Some(SchemaFormat::Json),
            "toml" => Some(SchemaFormat::Toml),
            _ => None,
        }
    }
}

impl fmt::Display for SchemaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaFormat::Json => write!(f, "JSON"),
            SchemaFormat::Toml => write!(f, "TOML"),
        }
    }
}

/// Parse a single schema file.
pub fn parse_schema(path: &Path) -> Result<FormSchema> {
    let format = SchemaFormat::from_path(path).with_context(|| {
        format!(
            "unsupported schema file (expected .json or .toml): {}",
            path.display()
        )
    })?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read schema file: {}", path.display()))?;

    parse_schema_str(&content, format, path)
}

/// Parse schema text (useful for testing).
pub fn parse_schema_str(
    content: &str,
    format: SchemaFormat,
    source_path: &Path,
) -> Result<FormSchema> {
    match format {
        SchemaFormat::Json => serde_json::from_str(content)
            .with_context(|| format!("failed to parse {format}: {}", source_path.display())),
        SchemaFormat::Toml => toml::from_str(content)
            .with_context(|| format!("failed to parse {format}: {}", source_path.display())),
    }
}

/// Recursively load every `.json` and `.toml` schema in a directory.
///
/// Files that fail to parse are skipped with a warning.
pub fn load_schema_directory(dir: &Path) -> Result<Vec<(PathBuf, FormSchema)>> {
    let mut schemas = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            schemas.extend(load_schema_directory(&path)?);
        } else if SchemaFormat::from_path(&path).is_some() {
            match parse_schema(&path) {
                Ok(schema) => schemas.push((path, schema)),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(schemas)
}

/// Load a file, or every schema under a directory.
pub fn load_schemas(path: &Path) -> Result<Vec<(PathBuf, FormSchema)>> {
    if path.is_dir() {
        load_schema_directory(path)
    } else {
        Ok(vec![(path.to_path_buf(), parse_schema(path)?)])
    }
}
