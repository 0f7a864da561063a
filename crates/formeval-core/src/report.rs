//! Submission reports with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{ErrorMap, ValueMap};
use crate::session::FormSession;

/// The outcome of one submit: every value and every error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the form was submitted.
    pub created_at: DateTime<Utc>,
    /// Name of the form, if it came from the store or a named file.
    #[serde(default)]
    pub form_name: Option<String>,
    /// Values at submit time.
    pub values: ValueMap,
    /// Validation errors keyed by value key.
    pub errors: ErrorMap,
}

impl SubmissionReport {
    /// Capture a session's current values and errors.
    pub fn from_session(session: &FormSession, form_name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            form_name,
            values: session.values().clone(),
            errors: session.errors().clone(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: SubmissionReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Render as a markdown summary.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        let title = self.form_name.as_deref().unwrap_or("Form");
        md.push_str(&format!("## {title} submission\n\n"));
        if self.is_valid() {
            md.push_str("All validations passed.\n\n");
        } else {
            md.push_str(&format!("{} field(s) need attention.\n\n", self.errors.len()));
        }

        md.push_str("| Field | Value | Error |\n");
        md.push_str("|-------|-------|-------|\n");
        for (key, value) in self.values.iter() {
            let error = self.errors.get(key).map(String::as_str).unwrap_or("");
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(key),
                escape_cell(&value.to_form_string()),
                escape_cell(error)
            ));
        }
        md
    }
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Field, FieldType, FormSchema};

    fn submitted() -> FormSession {
        let schema = FormSchema::new(vec![
            Field::with_id("a", FieldType::Text).named("name").required(),
            Field::with_id("b", FieldType::Text).named("note"),
        ]);
        let mut session = FormSession::new(&schema);
        session.set_value("note", "a|b").unwrap();
        session.submit();
        session
    }

    #[test]
    fn captures_session_state() {
        let report = SubmissionReport::from_session(&submitted(), Some("Contact".into()));
        assert!(!report.is_valid());
        assert_eq!(report.values.len(), 2);
        assert_eq!(
            report.errors.get("name").map(String::as_str),
            Some("This field is required")
        );
    }

    #[test]
    fn json_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");
        let report = SubmissionReport::from_session(&submitted(), None);
        report.save_json(&path).unwrap();
        let loaded = SubmissionReport::load_json(&path).unwrap();
        assert_eq!(loaded, report);
    }

    #[test]
    fn markdown_escapes_pipes() {
        let md = SubmissionReport::from_session(&submitted(), Some("Contact".into())).to_markdown();
        assert!(md.starts_with("## Contact submission"));
        assert!(md.contains("1 field(s) need attention"));
        assert!(md.contains("| note | a\\|b |  |"));
        assert!(md.contains("| name |  | This field is required |"));
    }
}
