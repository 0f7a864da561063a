pub mod check;
pub mod eval;
pub mod fill;
pub mod forms;
pub mod init;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use formeval_core::clock::{Clock, FixedClock, SystemClock};

/// Split a `KEY=VALUE` argument at the first `=`.
pub fn parse_assignment(arg: &str) -> Result<(&str, &str)> {
    let (key, value) = arg
        .split_once('=')
        .with_context(|| format!("expected KEY=VALUE, got '{arg}'"))?;
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("empty key in '{arg}'");
    }
    Ok((key, value))
}

/// The clock formulas see: a pinned date, or the system date.
pub fn clock_for(today: Option<NaiveDate>) -> Box<dyn Clock> {
    match today {
        Some(date) => Box::new(FixedClock(date)),
        None => Box::new(SystemClock),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_splits_on_first_equals() {
        assert_eq!(parse_assignment("a=b=c").unwrap(), ("a", "b=c"));
        assert_eq!(parse_assignment(" name =").unwrap(), ("name", ""));
        assert!(parse_assignment("novalue").is_err());
        assert!(parse_assignment("=x").is_err());
    }
}
