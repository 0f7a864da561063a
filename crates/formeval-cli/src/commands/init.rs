//! The `formeval init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create formeval.toml
    if std::path::Path::new("formeval.toml").exists() {
        println!("formeval.toml already exists, skipping.");
    } else {
        std::fs::write("formeval.toml", SAMPLE_CONFIG)?;
        println!("Created formeval.toml");
    }

    // Create example schema
    std::fs::create_dir_all("schemas")?;
    let example_path = std::path::Path::new("schemas/example.json");
    if example_path.exists() {
        println!("schemas/example.json already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_SCHEMA)?;
        println!("Created schemas/example.json");
    }

    println!("\nNext steps:");
    println!("  1. Run: formeval check --schema schemas/example.json");
    println!(
        "  2. Run: formeval fill --schema schemas/example.json --set email=you@example.com --set dob=1990-05-17"
    );
    println!("  3. Run: formeval forms save --name Example --schema schemas/example.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# formeval configuration

# Where submission reports are written by `formeval fill --save`
output_dir = "./formeval-results"

# Saved forms. Use type = "memory" to keep nothing between runs.
[store]
type = "json"
path = "./formeval-forms.json"
"#;

const EXAMPLE_SCHEMA: &str = r#"{
  "fields": [
    {
      "id": "fld_email",
      "type": "text",
      "label": "Email",
      "name": "email",
      "required": true,
      "placeholder": "you@example.com",
      "validation": { "email": true }
    },
    {
      "id": "fld_dob",
      "type": "date",
      "label": "Date of birth",
      "name": "dob",
      "required": true
    },
    {
      "id": "fld_age",
      "type": "number",
      "label": "Age",
      "name": "age",
      "required": false,
      "derived": {
        "enabled": true,
        "parents": ["fld_dob"],
        "formula": "helpers.age(values.dob)"
      }
    },
    {
      "id": "fld_newsletter",
      "type": "checkbox",
      "label": "Newsletter",
      "name": "newsletter",
      "required": false,
      "checkboxLabel": "Send me occasional updates"
    }
  ]
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use formeval_core::{check_schema, FormSchema};

    #[test]
    fn example_schema_is_clean() {
        let schema = FormSchema::from_json(EXAMPLE_SCHEMA).unwrap();
        assert_eq!(schema.fields.len(), 4);
        assert!(check_schema(&schema).is_empty());
    }

    #[test]
    fn sample_config_parses() {
        let config = formeval_store::parse_config(SAMPLE_CONFIG).unwrap();
        assert_eq!(config.store, formeval_store::StoreConfig::default());
    }
}
