//! The persistence contract and the record it stores.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use formeval_core::FormSchema;

use crate::error::StoreError;

/// A named, saved form schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRecord {
    /// `form_` followed by a random suffix.
    pub id: String,
    pub name: String,
    pub schema: FormSchema,
    pub created_at: DateTime<Utc>,
}

impl FormRecord {
    /// Build a fresh record, trimming the name.
    pub fn new(name: &str, schema: &FormSchema) -> Result<Self, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        Ok(Self {
            id: format!("form_{}", Uuid::new_v4().simple()),
            name: name.to_string(),
            schema: schema.clone(),
            created_at: Utc::now(),
        })
    }
}

/// Trait for saved-form backends.
///
/// `list` returns the newest record first. Deleting an unknown id is not an
/// error.
#[async_trait]
pub trait FormStore: Send + Sync {
    /// Backend name for log and CLI output.
    fn name(&self) -> &str;

    async fn list(&self) -> Result<Vec<FormRecord>, StoreError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<FormRecord>, StoreError>;

    /// Save a new record and return it.
    async fn save(&self, name: &str, schema: &FormSchema) -> Result<FormRecord, StoreError>;

    /// Remove a record. Returns whether anything was removed.
    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use formeval_core::{Field, FieldType};

    #[test]
    fn record_ids_are_prefixed_and_unique() {
        let schema = FormSchema::new(vec![Field::new(FieldType::Text)]);
        let a = FormRecord::new("Contact", &schema).unwrap();
        let b = FormRecord::new("Contact", &schema).unwrap();
        assert!(a.id.starts_with("form_"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn blank_names_are_rejected() {
        let schema = FormSchema::default();
        assert!(matches!(
            FormRecord::new("   ", &schema),
            Err(StoreError::EmptyName)
        ));
        assert_eq!(FormRecord::new("  Survey ", &schema).unwrap().name, "Survey");
    }

    #[test]
    fn record_json_uses_camel_case() {
        let record = FormRecord::new("Contact", &FormSchema::default()).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json["schema"]["fields"].as_array().unwrap().is_empty());
    }
}
