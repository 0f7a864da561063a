//! The `formeval forms` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;

use formeval_core::check_schema;
use formeval_core::parser::parse_schema;
use formeval_store::{create_store, load_config_from, FormStore};

#[derive(Subcommand)]
pub enum FormsAction {
    /// List saved forms, newest first
    List,

    /// Print a saved form's schema as JSON
    Show {
        /// Form id
        id: String,
    },

    /// Save a schema file under a name
    Save {
        /// Display name for the form
        #[arg(long)]
        name: String,

        /// Path to a .json or .toml schema
        #[arg(long)]
        schema: PathBuf,
    },

    /// Delete a saved form
    Delete {
        /// Form id
        id: String,
    },
}

pub async fn execute(action: FormsAction, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = create_store(&config.store);
    run(action, store.as_ref()).await
}

async fn run(action: FormsAction, store: &dyn FormStore) -> Result<()> {
    match action {
        FormsAction::List => list(store).await,
        FormsAction::Show { id } => {
            let record = store
                .get_by_id(&id)
                .await?
                .with_context(|| format!("no saved form with id '{id}'"))?;
            println!("{}", record.schema.to_json_pretty()?);
            Ok(())
        }
        FormsAction::Save { name, schema } => {
            let schema = parse_schema(&schema)?;
            for e in check_schema(&schema) {
                tracing::warn!("{e}");
            }
            let record = store.save(&name, &schema).await?;
            println!("Saved form '{}' as {}", record.name, record.id);
            Ok(())
        }
        FormsAction::Delete { id } => {
            if store.delete_by_id(&id).await? {
                println!("Deleted {id}");
                Ok(())
            } else {
                anyhow::bail!("no saved form with id '{id}'")
            }
        }
    }
}

async fn list(store: &dyn FormStore) -> Result<()> {
    use comfy_table::{Cell, Table};

    let forms = store.list().await?;
    if forms.is_empty() {
        println!(
            "No saved forms. Run `formeval forms save --name <name> --schema <file>` to add one."
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Fields", "Created"]);
    for form in &forms {
        table.add_row(vec![
            Cell::new(&form.id),
            Cell::new(&form.name),
            Cell::new(form.schema.fields.len()),
            Cell::new(form.created_at.format("%Y-%m-%d %H:%M:%S UTC")),
        ]);
    }
    println!("{table}");
    println!("{} form(s) in {} store.", forms.len(), store.name());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use formeval_core::{Field, FieldType, FormSchema};
    use formeval_store::MemoryStore;

    #[tokio::test]
    async fn delete_unknown_id_fails() {
        let store = MemoryStore::new();
        let err = run(
            FormsAction::Delete {
                id: "form_nope".into(),
            },
            &store,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("form_nope"));
    }

    #[tokio::test]
    async fn show_and_delete_saved_form() {
        let store = MemoryStore::new();
        let schema = FormSchema::new(vec![Field::with_id("a", FieldType::Text)]);
        let record = store.save("Contact", &schema).await.unwrap();

        run(FormsAction::Show { id: record.id.clone() }, &store)
            .await
            .unwrap();
        run(FormsAction::Delete { id: record.id }, &store)
            .await
            .unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }
}
