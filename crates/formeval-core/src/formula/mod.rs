//! Formula sandbox.
//!
//! Formulas are single expressions over two inputs: `values` (field key or
//! id to current value) and `helpers` (`age` and `num`). Source text is
//! parsed into an expression tree and interpreted directly. There is no way
//! to reach anything outside those two inputs.
//!
//! ```text
//! helpers.age(values.dob)
//! num(values.qty) * num(values.price)
//! values.country == 'NZ' ? 'GST' : 'VAT'
//! ```

mod eval;
mod lexer;
mod parser;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::clock::Clock;
use crate::error::FormulaError;
use crate::model::{Value, ValueMap};

use parser::Expr;

/// A compiled formula, ready to run against any value map.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

/// Compile formula source into an evaluator.
pub fn compile(source: &str) -> Result<Formula, FormulaError> {
    let tokens = lexer::tokenize(source)?;
    let expr = parser::parse(&tokens, source.len())?;
    Ok(Formula {
        source: source.to_string(),
        expr,
    })
}

/// Compile and run in one step.
pub fn evaluate(source: &str, values: &ValueMap, helpers: &Helpers) -> Result<Value, FormulaError> {
    compile(source)?.run(values, helpers)
}

impl Formula {
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Run against the given values. A non-finite numeric result is an error.
    pub fn run(&self, values: &ValueMap, helpers: &Helpers) -> Result<Value, FormulaError> {
        match eval::evaluate(&self.expr, values, helpers)? {
            Value::Number(n) if !n.is_finite() => Err(FormulaError::NonFinite),
            value => Ok(value),
        }
    }

    /// Keys read through `values`, in first-use order without duplicates.
    pub fn references(&self) -> Vec<&str> {
        let mut keys = Vec::new();
        collect_references(&self.expr, &mut keys);
        keys
    }
}

fn collect_references<'a>(expr: &'a Expr, keys: &mut Vec<&'a str>) {
    match expr {
        Expr::Literal(_) => {}
        Expr::Field(key) => {
            if !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }
        Expr::Call { args, .. } => {
            for arg in args {
                collect_references(arg, keys);
            }
        }
        Expr::Unary { operand, .. } => collect_references(operand, keys),
        Expr::Binary { lhs, rhs, .. } => {
            collect_references(lhs, keys);
            collect_references(rhs, keys);
        }
        Expr::Conditional {
            cond,
            then,
            otherwise,
        } => {
            collect_references(cond, keys);
            collect_references(then, keys);
            collect_references(otherwise, keys);
        }
    }
}

/// The fixed helper table visible to formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Helpers {
    today: NaiveDate,
}

impl Helpers {
    /// Helpers evaluating dates relative to `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn from_clock(clock: &dyn Clock) -> Self {
        Self::new(clock.today())
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Whole years between a date and today. Blank input yields blank text.
    pub fn age(&self, date: &Value) -> Result<Value, FormulaError> {
        let text = date.to_form_string();
        let text = text.trim();
        if text.is_empty() {
            return Ok(Value::text(""));
        }
        let date = parse_date(text).ok_or_else(|| FormulaError::InvalidDate(text.to_string()))?;
        let (from, to) = if date <= self.today {
            (date, self.today)
        } else {
            (self.today, date)
        };
        let mut years = to.year() - from.year();
        if (to.month(), to.day()) < (from.month(), from.day()) {
            years -= 1;
        }
        Ok(Value::Number(f64::from(years)))
    }

    /// Numeric coercion, 0 when not numeric.
    pub fn num(&self, value: &Value) -> Value {
        let n = value.to_number();
        Value::Number(if n.is_nan() { 0.0 } else { n })
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M")
                .ok()
                .map(|dt| dt.date())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn age_counts_whole_years() {
        let helpers = Helpers::from_clock(&FixedClock(today()));
        assert_eq!(
            helpers.age(&Value::text("1996-10-18")).unwrap(),
            Value::Number(30.0)
        );
        assert_eq!(
            helpers.age(&Value::text("1996-10-19")).unwrap(),
            Value::Number(29.0)
        );
        assert_eq!(
            helpers.age(&Value::text("2000-02-29T08:00:00Z")).unwrap(),
            Value::Number(26.0)
        );
        assert_eq!(
            helpers.age(&Value::text("2036-10-18")).unwrap(),
            Value::Number(10.0)
        );
        assert_eq!(helpers.age(&Value::Null).unwrap(), Value::text(""));
        assert!(matches!(
            helpers.age(&Value::text("not a date")),
            Err(FormulaError::InvalidDate(_))
        ));
    }

    #[test]
    fn num_defaults_to_zero() {
        let helpers = Helpers::new(today());
        assert_eq!(helpers.num(&Value::text("12")), Value::Number(12.0));
        assert_eq!(helpers.num(&Value::text("twelve")), Value::Number(0.0));
        assert_eq!(helpers.num(&Value::Bool(true)), Value::Number(1.0));
    }

    #[test]
    fn age_formula_end_to_end() {
        let mut values = ValueMap::new();
        values.insert("dob", "1996-10-18");
        let result = evaluate("helpers.age(values.dob)", &values, &Helpers::new(today()));
        assert_eq!(result.unwrap(), Value::Number(30.0));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let values = ValueMap::new();
        let result = evaluate("1 / 0", &values, &Helpers::new(today()));
        assert_eq!(result, Err(FormulaError::NonFinite));
        assert!(!FormulaError::NonFinite.is_compile_error());
    }

    #[test]
    fn deeply_nested_formula_fails_to_compile() {
        let err = compile(&"(".repeat(10_000)).unwrap_err();
        assert!(matches!(err, FormulaError::TooDeep(_)));
        assert!(err.is_compile_error());
        let result = evaluate(&format!("{}1", "-".repeat(10_000)), &ValueMap::new(), &Helpers::new(today()));
        assert!(matches!(result, Err(FormulaError::TooDeep(_))));
    }

    #[test]
    fn references_are_deduplicated() {
        let formula = compile("values.a + values['b'] + num(values.a)").unwrap();
        assert_eq!(formula.references(), vec!["a", "b"]);
        assert_eq!(formula.source(), "values.a + values['b'] + num(values.a)");
    }
}
