//! File-backed store: the whole form list as one JSON document.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use formeval_core::FormSchema;

use crate::error::StoreError;
use crate::store::{FormRecord, FormStore};

/// Stores every saved form in a single JSON array on disk.
///
/// A missing, unreadable, or corrupt file reads as an empty list. Writes
/// replace the whole document.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Vec<FormRecord> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!("cannot read {}: {e}; treating as empty", self.path.display());
                return Vec::new();
            }
        };
        if content.trim().is_empty() {
            return Vec::new();
        }
        match serde_json::from_str(&content) {
            Ok(forms) => forms,
            Err(e) => {
                tracing::warn!(
                    "cannot parse {}: {e}; treating as empty",
                    self.path.display()
                );
                Vec::new()
            }
        }
    }

    async fn write(&self, forms: &[FormRecord]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(forms)?;
        let io_err = |source: std::io::Error| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        tokio::fs::write(&self.path, json).await.map_err(io_err)
    }
}

#[async_trait]
impl FormStore for JsonFileStore {
    fn name(&self) -> &str {
        "json"
    }

    async fn list(&self) -> Result<Vec<FormRecord>, StoreError> {
        Ok(self.read().await)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<FormRecord>, StoreError> {
        Ok(self.read().await.into_iter().find(|f| f.id == id))
    }

    async fn save(&self, name: &str, schema: &FormSchema) -> Result<FormRecord, StoreError> {
        let record = FormRecord::new(name, schema)?;
        let _guard = self.write_lock.lock().await;
        let mut forms = self.read().await;
        forms.insert(0, record.clone());
        self.write(&forms).await?;
        tracing::info!(
            id = %record.id,
            name = %record.name,
            "saved form to {}",
            self.path.display()
        );
        Ok(record)
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut forms = self.read().await;
        let before = forms.len();
        forms.retain(|f| f.id != id);
        self.write(&forms).await?;
        let removed = forms.len() != before;
        if removed {
            tracing::info!(id, "deleted form from {}", self.path.display());
        }
        Ok(removed)
    }
}
