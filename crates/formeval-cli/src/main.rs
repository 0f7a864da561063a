//! formeval CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "formeval",
    version,
    about = "Dynamic form schemas with derived fields and validation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check schema files for structural errors and warnings
    Check {
        /// Path to a .json/.toml schema or a directory of them
        #[arg(long)]
        schema: PathBuf,
    },

    /// Fill in a form and submit it
    Fill {
        /// Schema file to fill
        #[arg(long, conflicts_with = "form", required_unless_present = "form")]
        schema: Option<PathBuf>,

        /// Id of a saved form to fill
        #[arg(long)]
        form: Option<String>,

        /// Field values, in the order they are entered
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Evaluation date for helpers.age (YYYY-MM-DD, default: today)
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Write a submission report into this directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write a submission report into the configured output directory
        #[arg(long)]
        save: bool,

        /// Exit code 1 if validation fails
        #[arg(long)]
        fail_on_errors: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Evaluate a single formula
    Eval {
        /// Formula source, e.g. "num(values.a) * 2"
        #[arg(long)]
        formula: String,

        /// Values visible to the formula
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Evaluation date for helpers.age (YYYY-MM-DD, default: today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Manage saved forms
    Forms {
        #[command(subcommand)]
        action: commands::forms::FormsAction,

        /// Config file path
        #[arg(long, global = true)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example schema
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("formeval=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { schema } => commands::check::execute(schema),
        Commands::Fill {
            schema,
            form,
            set,
            today,
            format,
            output,
            save,
            fail_on_errors,
            config,
        } => {
            commands::fill::execute(commands::fill::FillArgs {
                schema,
                form,
                set,
                today,
                format,
                output,
                save,
                fail_on_errors,
                config,
            })
            .await
        }
        Commands::Eval {
            formula,
            set,
            today,
        } => commands::eval::execute(formula, set, today),
        Commands::Forms { action, config } => commands::forms::execute(action, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
