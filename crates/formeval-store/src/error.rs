//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when reading or writing saved forms.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A form needs a non-blank name.
    #[error("form name must not be empty")]
    EmptyName,

    /// The backing file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The form list could not be serialized.
    #[error("failed to serialize forms: {0}")]
    Serialize(#[from] serde_json::Error),
}
