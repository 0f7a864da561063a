//! The `formeval fill` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use formeval_core::parser::parse_schema;
use formeval_core::report::SubmissionReport;
use formeval_core::{check_schema, Field, FieldKind, FormSchema, FormSession, Value};
use formeval_store::{create_store, load_config_from};

use super::{clock_for, parse_assignment};

pub struct FillArgs {
    pub schema: Option<PathBuf>,
    pub form: Option<String>,
    pub set: Vec<String>,
    pub today: Option<NaiveDate>,
    pub format: String,
    pub output: Option<PathBuf>,
    pub save: bool,
    pub fail_on_errors: bool,
    pub config: Option<PathBuf>,
}

pub async fn execute(args: FillArgs) -> Result<()> {
    let (name, schema) = resolve_schema(&args).await?;

    for e in check_schema(&schema) {
        tracing::warn!("{e}");
    }

    let mut session = FormSession::with_clock(&schema, clock_for(args.today));
    for arg in &args.set {
        let (key, raw) = parse_assignment(arg)?;
        let field = session
            .schema()
            .resolve(key)
            .with_context(|| format!("form has no field '{key}'"))?;
        let value = coerce_input(field, raw)?;
        session
            .set_value(key, value)
            .with_context(|| format!("cannot set '{key}'"))?;
    }
    session.submit();

    let report = SubmissionReport::from_session(&session, Some(name));

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "markdown" | "md" => println!("{}", report.to_markdown()),
        _ => print_table(&session),
    }

    let output_dir = match (&args.output, args.save) {
        (Some(dir), _) => Some(dir.clone()),
        (None, true) => Some(load_config_from(args.config.as_deref())?.output_dir),
        (None, false) => None,
    };
    if let Some(dir) = output_dir {
        let path = dir.join(report_filename(&report));
        report.save_json(&path)?;
        eprintln!("Submission saved to: {}", path.display());
    }

    if args.fail_on_errors && !report.is_valid() {
        anyhow::bail!("{} field(s) failed validation", report.errors.len());
    }

    Ok(())
}

/// Timestamp for sorting, report id so that reports from the same second
/// never share a file.
fn report_filename(report: &SubmissionReport) -> String {
    format!(
        "submission-{}-{}.json",
        report.created_at.format("%Y%m%d-%H%M%S"),
        report.id.simple()
    )
}

/// Load the schema named on the command line, from a file or the store.
async fn resolve_schema(args: &FillArgs) -> Result<(String, FormSchema)> {
    if let Some(path) = &args.schema {
        let schema = parse_schema(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Form".to_string());
        return Ok((name, schema));
    }

    let id = args
        .form
        .as_deref()
        .context("either --schema or --form is required")?;
    let config = load_config_from(args.config.as_deref())?;
    let store = create_store(&config.store);
    let record = store
        .get_by_id(id)
        .await?
        .with_context(|| format!("no saved form with id '{id}'"))?;
    Ok((record.name, record.schema))
}

/// Turn command-line text into the value the field's control would produce.
fn coerce_input(field: &Field, raw: &str) -> Result<Value> {
    match &field.kind {
        FieldKind::Checkbox { .. } => match raw.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "off" | "0" | "" => Ok(Value::Bool(false)),
            other => anyhow::bail!(
                "'{}' is a checkbox; expected true or false, got '{other}'",
                field.key()
            ),
        },
        FieldKind::Select { options, .. } | FieldKind::Radio { options, .. } => {
            if !raw.is_empty() && !options.iter().any(|o| o == raw) {
                tracing::warn!("'{raw}' is not one of the options of '{}'", field.key());
            }
            Ok(Value::text(raw))
        }
        FieldKind::Text { .. }
        | FieldKind::Number { .. }
        | FieldKind::Textarea { .. }
        | FieldKind::Date { .. } => Ok(Value::text(raw)),
    }
}

fn print_table(session: &FormSession) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Field", "Key", "Value", "Error"]);

    for field in &session.schema().fields {
        let key = field.key();
        let label = if field.is_derived() {
            format!("{} (derived)", field.display_label())
        } else {
            field.display_label().to_string()
        };
        let value = session
            .value(key)
            .map(Value::to_form_string)
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(label),
            Cell::new(key),
            Cell::new(value),
            Cell::new(session.error_for(key).unwrap_or("")),
        ]);
    }

    println!("{table}");
    if session.is_valid() {
        println!("Form is valid.");
    } else {
        println!("{} field(s) need attention.", session.errors().len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formeval_core::FieldType;

    #[test]
    fn reports_from_the_same_second_get_distinct_files() {
        let schema = FormSchema::new(vec![Field::with_id("a", FieldType::Text)]);
        let session = FormSession::new(&schema);
        let first = SubmissionReport::from_session(&session, None);
        let mut second = SubmissionReport::from_session(&session, None);
        second.created_at = first.created_at;

        let name = report_filename(&first);
        assert_ne!(name, report_filename(&second));
        assert!(name.starts_with(&format!(
            "submission-{}-",
            first.created_at.format("%Y%m%d-%H%M%S")
        )));
        assert!(name.ends_with(&format!("{}.json", first.id.simple())));
    }

    #[test]
    fn checkbox_input_becomes_bool() {
        let field = Field::with_id("agree", FieldType::Checkbox);
        assert_eq!(coerce_input(&field, "yes").unwrap(), Value::Bool(true));
        assert_eq!(coerce_input(&field, "False").unwrap(), Value::Bool(false));
        assert!(coerce_input(&field, "maybe").is_err());
    }

    #[test]
    fn other_inputs_stay_text() {
        let number = Field::with_id("qty", FieldType::Number);
        assert_eq!(coerce_input(&number, "3").unwrap(), Value::text("3"));
        let select = Field::with_id("plan", FieldType::Select);
        assert_eq!(
            coerce_input(&select, "Option 9").unwrap(),
            Value::text("Option 9")
        );
    }
}
