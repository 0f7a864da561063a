//! The `formeval check` command.

use std::path::PathBuf;

use anyhow::Result;

use formeval_core::parser::load_schemas;
use formeval_core::{check_schema, lint_schema};

pub fn execute(schema_path: PathBuf) -> Result<()> {
    let schemas = load_schemas(&schema_path)?;
    if schemas.is_empty() {
        anyhow::bail!("no schema files found in {}", schema_path.display());
    }

    let mut total_errors = 0;
    let mut total_warnings = 0;

    for (path, schema) in &schemas {
        let derived = schema.fields.iter().filter(|f| f.is_derived()).count();
        println!(
            "Schema: {} ({} fields, {} derived)",
            path.display(),
            schema.fields.len(),
            derived
        );

        let errors = check_schema(schema);
        for e in &errors {
            println!("  [{}] ERROR: {e}", e.field_id());
        }
        total_errors += errors.len();

        let warnings = lint_schema(schema);
        for w in &warnings {
            let prefix = w
                .field_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_errors > 0 {
        anyhow::bail!("{total_errors} structural error(s) found");
    }
    if total_warnings == 0 {
        println!("All schemas valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
