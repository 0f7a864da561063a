//! The `formeval eval` command.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;

use formeval_core::formula::evaluate;
use formeval_core::{Helpers, Value, ValueMap};

use super::{clock_for, parse_assignment};

pub fn execute(formula: String, set: Vec<String>, today: Option<NaiveDate>) -> Result<()> {
    let mut values = ValueMap::new();
    for arg in &set {
        let (key, raw) = parse_assignment(arg)?;
        values.insert(key, parse_literal(raw));
    }

    let helpers = Helpers::from_clock(clock_for(today).as_ref());
    let value = evaluate(&formula, &values, &helpers).map_err(|e| {
        let stage = if e.is_compile_error() { "compile" } else { "evaluate" };
        anyhow!(e).context(format!("failed to {stage} formula '{formula}'"))
    })?;

    println!("{value}");
    Ok(())
}

/// Booleans and finite numbers become typed values; anything else is text.
fn parse_literal(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => match raw.trim().parse::<f64>() {
            Ok(n) if n.is_finite() && !raw.trim().is_empty() => Value::Number(n),
            _ => Value::text(raw),
        },
    }
}
