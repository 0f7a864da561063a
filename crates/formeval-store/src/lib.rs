//! formeval-store — saved form persistence.
//!
//! Implements the `FormStore` trait in memory and as a single JSON document
//! on disk, and loads the `formeval.toml` configuration that picks between
//! them.

pub mod config;
pub mod error;
pub mod json_file;
pub mod memory;
pub mod store;

pub use config::{
    create_store, load_config, load_config_from, parse_config, FormevalConfig, StoreConfig,
};
pub use error::StoreError;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use store::{FormRecord, FormStore};
