//! In-memory store, used by tests and the `memory` config type.

use async_trait::async_trait;
use tokio::sync::RwLock;

use formeval_core::FormSchema;

use crate::error::StoreError;
use crate::store::{FormRecord, FormStore};

/// Keeps records in a vector, newest first. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    forms: RwLock<Vec<FormRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FormStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list(&self) -> Result<Vec<FormRecord>, StoreError> {
        Ok(self.forms.read().await.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<FormRecord>, StoreError> {
        Ok(self.forms.read().await.iter().find(|f| f.id == id).cloned())
    }

    async fn save(&self, name: &str, schema: &FormSchema) -> Result<FormRecord, StoreError> {
        let record = FormRecord::new(name, schema)?;
        self.forms.write().await.insert(0, record.clone());
        Ok(record)
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
        let mut forms = self.forms.write().await;
        let before = forms.len();
        forms.retain(|f| f.id != id);
        Ok(forms.len() != before)
    }
}
