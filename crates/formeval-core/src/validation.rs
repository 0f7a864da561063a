//! Per-field validation rules.
//!
//! Rules run in a fixed order and the first violated rule wins:
//! required, minimum length, maximum length, email, password.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::model::{ErrorMap, Field, FormSchema, Value, ValueMap};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern is valid"));

const PASSWORD_MIN_CHARS: usize = 8;

/// A single violated rule. The display text is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleViolation {
    #[error("This field is required")]
    Required,
    #[error("Minimum length is {0}")]
    MinLength(u32),
    #[error("Maximum length is {0}")]
    MaxLength(u32),
    #[error("Please enter a valid email")]
    Email,
    #[error("Password must be 8+ chars and contain a number")]
    Password,
}

/// The first rule `value` violates, if any.
pub fn first_violation(field: &Field, value: &Value) -> Option<RuleViolation> {
    let rules = field.rules();
    let text = value.to_form_string();
    let length = text.chars().count();

    if (field.required || rules.not_empty())
        && (text.trim().is_empty() || *value == Value::Bool(false))
    {
        return Some(RuleViolation::Required);
    }
    if let Some(min) = rules.min_length() {
        if length < min as usize {
            return Some(RuleViolation::MinLength(min));
        }
    }
    if let Some(max) = rules.max_length() {
        if length > max as usize {
            return Some(RuleViolation::MaxLength(max));
        }
    }
    if rules.email() && !EMAIL_RE.is_match(&text) {
        return Some(RuleViolation::Email);
    }
    if rules.password_rule()
        && !(length >= PASSWORD_MIN_CHARS && text.chars().any(|c| c.is_ascii_digit()))
    {
        return Some(RuleViolation::Password);
    }
    None
}

/// Validate one value. Returns the error message, or an empty string if valid.
pub fn validate_field(field: &Field, value: &Value) -> String {
    first_violation(field, value)
        .map(|v| v.to_string())
        .unwrap_or_default()
}

/// Validate every field in schema order. Valid fields are omitted.
pub fn validate_form(schema: &FormSchema, values: &ValueMap) -> ErrorMap {
    let mut errors = ErrorMap::new();
    for field in &schema.fields {
        let value = values.get(field.key()).unwrap_or(&Value::Null);
        if let Some(violation) = first_violation(field, value) {
            errors.insert(field.key().to_string(), violation.to_string());
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldType, ValidationRules};

    fn field(rules: ValidationRules) -> Field {
        Field::with_id("f", FieldType::Text).named("f").with_rules(rules)
    }

    #[test]
    fn required_rejects_blank_and_false() {
        let f = Field::with_id("f", FieldType::Checkbox).required();
        assert_eq!(validate_field(&f, &Value::Bool(false)), "This field is required");
        assert_eq!(validate_field(&f, &Value::Null), "This field is required");
        assert_eq!(validate_field(&f, &Value::Bool(true)), "");

        let f = field(ValidationRules {
            not_empty: Some(true),
            ..Default::default()
        });
        assert_eq!(validate_field(&f, &Value::text("   ")), "This field is required");
        assert_eq!(validate_field(&f, &Value::text("x")), "");
        assert_eq!(validate_field(&f, &Value::Number(0.0)), "");
    }

    #[test]
    fn optional_blank_passes_when_no_rules() {
        let f = field(ValidationRules::default());
        assert_eq!(validate_field(&f, &Value::text("")), "");
        assert_eq!(validate_field(&f, &Value::Bool(false)), "");
    }

    #[test]
    fn first_violated_rule_wins() {
        let f = field(ValidationRules {
            min_length: Some(5),
            email: Some(true),
            ..Default::default()
        })
        .required();
        assert_eq!(validate_field(&f, &Value::text("")), "This field is required");
        assert_eq!(validate_field(&f, &Value::text("a@b")), "Minimum length is 5");
        assert_eq!(
            validate_field(&f, &Value::text("abcdef")),
            "Please enter a valid email"
        );
        assert_eq!(validate_field(&f, &Value::text("ada@example.com")), "");
    }

    #[test]
    fn length_limits() {
        let f = field(ValidationRules {
            min_length: Some(2),
            max_length: Some(4),
            ..Default::default()
        });
        assert_eq!(validate_field(&f, &Value::text("a")), "Minimum length is 2");
        assert_eq!(validate_field(&f, &Value::text("abcde")), "Maximum length is 4");
        assert_eq!(validate_field(&f, &Value::text("äöü")), "");
    }

    #[test]
    fn zero_length_limits_are_ignored() {
        let f = field(ValidationRules {
            max_length: Some(0),
            ..Default::default()
        });
        assert_eq!(validate_field(&f, &Value::text("anything")), "");
    }

    #[test]
    fn password_rule() {
        let f = field(ValidationRules {
            password_rule: Some(true),
            ..Default::default()
        });
        assert_eq!(
            validate_field(&f, &Value::text("abc")),
            "Password must be 8+ chars and contain a number"
        );
        assert_eq!(
            validate_field(&f, &Value::text("abcdefgh")),
            "Password must be 8+ chars and contain a number"
        );
        assert_eq!(validate_field(&f, &Value::text("abcdefg1")), "");
    }

    #[test]
    fn form_errors_keyed_by_value_key() {
        let schema = FormSchema::new(vec![
            Field::with_id("a", FieldType::Text).named("email").required(),
            Field::with_id("b", FieldType::Text).required(),
            Field::with_id("c", FieldType::Text).named("note"),
        ]);
        let mut values = ValueMap::new();
        values.insert("email", "ada@example.com");
        let errors = validate_form(&schema, &values);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("b").map(String::as_str), Some("This field is required"));
    }
}
