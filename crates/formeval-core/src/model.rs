//! Core data model types for formeval.
//!
//! These are the fundamental types the rest of the engine works with:
//! field definitions, the form schema, and the runtime value domain.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Opaque, immutable field identifier.
pub type FieldId = String;

/// Mapping from value-map key to a single human-readable error message.
pub type ErrorMap = BTreeMap<String, String>;

/// Options given to a freshly created select or radio field.
const STARTER_OPTIONS: [&str; 2] = ["Option 1", "Option 2"];

const NO_RULES: ValidationRules = ValidationRules {
    not_empty: None,
    email: None,
    min_length: None,
    max_length: None,
    password_rule: None,
};

/// One form field definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Unique identifier, assigned at creation.
    pub id: FieldId,
    /// Field type and the attributes that only make sense for it.
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Display label.
    #[serde(default)]
    pub label: String,
    /// Value-map key. Empty means the id is used instead.
    #[serde(default)]
    pub name: String,
    /// Help text shown under the input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether a value must be supplied.
    #[serde(default)]
    pub required: bool,
    /// Constraint rules checked on submit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRules>,
    /// Formula-driven derivation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived: Option<Derivation>,
}

impl Field {
    /// Create a field of the given type with a fresh id and starter attributes.
    pub fn new(field_type: FieldType) -> Self {
        Self::with_id(format!("fld_{}", Uuid::new_v4().simple()), field_type)
    }

    /// Create a field with an explicit id.
    pub fn with_id(id: impl Into<FieldId>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            kind: FieldKind::new(field_type),
            label: String::new(),
            name: String::new(),
            hint: None,
            required: false,
            validation: Some(ValidationRules::default()),
            derived: Some(Derivation::default()),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_rules(mut self, rules: ValidationRules) -> Self {
        self.validation = Some(rules);
        self
    }

    pub fn derived_from<I, S>(mut self, parents: I, formula: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<FieldId>,
    {
        self.derived = Some(Derivation::new(parents, formula));
        self
    }

    /// The key this field's value is stored under.
    pub fn key(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Label for display: label, then name, then id.
    pub fn display_label(&self) -> &str {
        if !self.label.is_empty() {
            &self.label
        } else {
            self.key()
        }
    }

    pub fn field_type(&self) -> FieldType {
        self.kind.field_type()
    }

    /// Whether the value is computed by a formula rather than edited.
    pub fn is_derived(&self) -> bool {
        self.derived.as_ref().is_some_and(|d| d.enabled)
    }

    pub fn rules(&self) -> &ValidationRules {
        self.validation.as_ref().unwrap_or(&NO_RULES)
    }

    /// Initial value: the configured default, or empty string / `false`.
    pub fn initial_value(&self) -> Value {
        match &self.kind {
            FieldKind::Checkbox { default_value, .. } => Value::Bool(default_value.unwrap_or(false)),
            FieldKind::Text { default_value, .. }
            | FieldKind::Number { default_value, .. }
            | FieldKind::Textarea { default_value, .. }
            | FieldKind::Select { default_value, .. }
            | FieldKind::Radio { default_value, .. }
            | FieldKind::Date { default_value, .. } => {
                Value::Text(default_value.clone().unwrap_or_default())
            }
        }
    }
}

/// The seven supported field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Date,
}

impl FieldType {
    pub const ALL: [FieldType; 7] = [
        FieldType::Text,
        FieldType::Number,
        FieldType::Textarea,
        FieldType::Select,
        FieldType::Radio,
        FieldType::Checkbox,
        FieldType::Date,
    ];
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Text => write!(f, "text"),
            FieldType::Number => write!(f, "number"),
            FieldType::Textarea => write!(f, "textarea"),
            FieldType::Select => write!(f, "select"),
            FieldType::Radio => write!(f, "radio"),
            FieldType::Checkbox => write!(f, "checkbox"),
            FieldType::Date => write!(f, "date"),
        }
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(FieldType::Text),
            "number" => Ok(FieldType::Number),
            "textarea" => Ok(FieldType::Textarea),
            "select" => Ok(FieldType::Select),
            "radio" => Ok(FieldType::Radio),
            "checkbox" => Ok(FieldType::Checkbox),
            "date" => Ok(FieldType::Date),
            other => Err(format!("unknown field type: {other}")),
        }
    }
}

/// Field type together with its type-specific attributes.
///
/// Switching a field's type keeps attributes that only the old type used, so
/// saved documents can carry a boolean `defaultValue` on a text field or an
/// `options` list on a date field. Such defaults load as absent and such
/// options are kept but never offered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum FieldKind {
    Text {
        #[serde(
            default,
            deserialize_with = "text_default",
            skip_serializing_if = "Option::is_none"
        )]
        default_value: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        options: Vec<String>,
    },
    Number {
        #[serde(
            default,
            deserialize_with = "text_default",
            skip_serializing_if = "Option::is_none"
        )]
        default_value: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        options: Vec<String>,
    },
    Textarea {
        #[serde(
            default,
            deserialize_with = "text_default",
            skip_serializing_if = "Option::is_none"
        )]
        default_value: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        options: Vec<String>,
    },
    Select {
        #[serde(default)]
        options: Vec<String>,
        #[serde(
            default,
            deserialize_with = "text_default",
            skip_serializing_if = "Option::is_none"
        )]
        default_value: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    Radio {
        #[serde(default)]
        options: Vec<String>,
        #[serde(
            default,
            deserialize_with = "text_default",
            skip_serializing_if = "Option::is_none"
        )]
        default_value: Option<String>,
    },
    Checkbox {
        #[serde(
            default,
            deserialize_with = "flag_default",
            skip_serializing_if = "Option::is_none"
        )]
        default_value: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        checkbox_label: Option<String>,
    },
    Date {
        #[serde(
            default,
            deserialize_with = "text_default",
            skip_serializing_if = "Option::is_none"
        )]
        default_value: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        options: Vec<String>,
    },
}

/// Text default; numbers keep their JSON spelling, anything else is absent.
fn text_default<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Checkbox default; `"true"` and `"false"` count, anything else is absent.
fn flag_default<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(b) => Some(b),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

impl FieldKind {
    /// Starter attributes for a new field of the given type.
    pub fn new(field_type: FieldType) -> Self {
        let starter_options = || STARTER_OPTIONS.iter().map(|s| s.to_string()).collect();
        match field_type {
            FieldType::Text => FieldKind::Text {
                default_value: Some(String::new()),
                placeholder: None,
                options: Vec::new(),
            },
            FieldType::Number => FieldKind::Number {
                default_value: Some(String::new()),
                placeholder: None,
                options: Vec::new(),
            },
            FieldType::Textarea => FieldKind::Textarea {
                default_value: Some(String::new()),
                placeholder: None,
                options: Vec::new(),
            },
            FieldType::Select => FieldKind::Select {
                options: starter_options(),
                default_value: Some(String::new()),
                placeholder: None,
            },
            FieldType::Radio => FieldKind::Radio {
                options: starter_options(),
                default_value: Some(String::new()),
            },
            FieldType::Checkbox => FieldKind::Checkbox {
                default_value: Some(false),
                checkbox_label: None,
            },
            FieldType::Date => FieldKind::Date {
                default_value: Some(String::new()),
                options: Vec::new(),
            },
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            FieldKind::Text { .. } => FieldType::Text,
            FieldKind::Number { .. } => FieldType::Number,
            FieldKind::Textarea { .. } => FieldType::Textarea,
            FieldKind::Select { .. } => FieldType::Select,
            FieldKind::Radio { .. } => FieldType::Radio,
            FieldKind::Checkbox { .. } => FieldType::Checkbox,
            FieldKind::Date { .. } => FieldType::Date,
        }
    }

    /// Choice list for select and radio fields; empty for every other type.
    pub fn options(&self) -> &[String] {
        match self {
            FieldKind::Select { options, .. } | FieldKind::Radio { options, .. } => options,
            _ => &[],
        }
    }
}

/// Optional constraint rules, each toggled independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_empty: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_rule: Option<bool>,
}

impl ValidationRules {
    pub fn not_empty(&self) -> bool {
        self.not_empty.unwrap_or(false)
    }

    pub fn email(&self) -> bool {
        self.email.unwrap_or(false)
    }

    pub fn password_rule(&self) -> bool {
        self.password_rule.unwrap_or(false)
    }

    /// Minimum length, if set to something other than zero.
    pub fn min_length(&self) -> Option<u32> {
        self.min_length.filter(|n| *n > 0)
    }

    /// Maximum length, if set to something other than zero.
    pub fn max_length(&self) -> Option<u32> {
        self.max_length.filter(|n| *n > 0)
    }
}

/// How a derived field computes its value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Derivation {
    #[serde(default)]
    pub enabled: bool,
    /// Ids of the fields this one is computed from.
    #[serde(default)]
    pub parents: Vec<FieldId>,
    #[serde(default)]
    pub formula: String,
}

impl Derivation {
    pub fn new<I, S>(parents: I, formula: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<FieldId>,
    {
        let mut derivation = Self {
            enabled: true,
            parents: Vec::new(),
            formula: formula.into(),
        };
        for parent in parents {
            derivation.add_parent(parent);
        }
        derivation
    }

    /// Add a parent id; duplicates are ignored.
    pub fn add_parent(&mut self, parent: impl Into<FieldId>) {
        let parent = parent.into();
        if !self.parents.contains(&parent) {
            self.parents.push(parent);
        }
    }

    pub fn remove_parent(&mut self, parent: &str) {
        self.parents.retain(|p| p != parent);
    }
}

/// An ordered list of fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl FormSchema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn field_by_id(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn field_by_key(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key() == key)
    }

    /// Look a field up by value-map key first, then by id.
    pub fn resolve(&self, key_or_id: &str) -> Option<&Field> {
        self.field_by_key(key_or_id)
            .or_else(|| self.field_by_id(key_or_id))
    }

    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Remove a field by id and drop it from every derivation's parents.
    pub fn remove(&mut self, id: &str) -> Option<Field> {
        let index = self.fields.iter().position(|f| f.id == id)?;
        let removed = self.fields.remove(index);
        for field in &mut self.fields {
            if let Some(derived) = &mut field.derived {
                derived.remove_parent(id);
            }
        }
        Some(removed)
    }

    /// Swap the field at `index` with its predecessor. Returns `false` at the top.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.fields.len() {
            return false;
        }
        self.fields.swap(index - 1, index);
        true
    }

    /// Swap the field at `index` with its successor. Returns `false` at the bottom.
    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.fields.len() {
            return false;
        }
        self.fields.swap(index, index + 1);
        true
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// A runtime field value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// String form used for length and pattern checks. Null becomes empty.
    pub fn to_form_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
        }
    }

    /// Numeric coercion. Blank text is 0, unparseable text is NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return 0.0;
                }
                match trimmed.parse::<f64>() {
                    Ok(n) if n.is_finite() => n,
                    _ => f64::NAN,
                }
            }
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Text(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_form_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let s = if n > 0.0 { "Infinity" } else { "-Infinity" };
        s.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Live mapping from field key to current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueMap(BTreeMap<String, Value>);

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one value per field from its default.
    pub fn from_defaults(schema: &FormSchema) -> Self {
        schema
            .fields
            .iter()
            .map(|f| (f.key().to_string(), f.initial_value()))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for ValueMap {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<String, Value>> for ValueMap {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_display_and_parse() {
        assert_eq!(FieldType::Textarea.to_string(), "textarea");
        assert_eq!("Checkbox".parse::<FieldType>().unwrap(), FieldType::Checkbox);
        for t in FieldType::ALL {
            assert_eq!(t.to_string().parse::<FieldType>().unwrap(), t);
        }
        assert!("slider".parse::<FieldType>().is_err());
    }

    #[test]
    fn key_falls_back_to_id() {
        let field = Field::with_id("fld_1", FieldType::Text);
        assert_eq!(field.key(), "fld_1");
        let field = field.named("email");
        assert_eq!(field.key(), "email");
        assert_eq!(field.display_label(), "email");
        assert_eq!(field.labelled("E-mail").display_label(), "E-mail");
    }

    #[test]
    fn new_fields_get_unique_ids_and_starter_options() {
        let a = Field::new(FieldType::Select);
        let b = Field::new(FieldType::Select);
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("fld_"));
        assert_eq!(a.kind.options(), ["Option 1", "Option 2"]);
        assert!(Field::new(FieldType::Date).kind.options().is_empty());
    }

    #[test]
    fn initial_values() {
        assert_eq!(
            Field::with_id("a", FieldType::Checkbox).initial_value(),
            Value::Bool(false)
        );
        let mut text = Field::with_id("b", FieldType::Text);
        text.kind = FieldKind::Text {
            default_value: None,
            placeholder: None,
            options: Vec::new(),
        };
        assert_eq!(text.initial_value(), Value::text(""));
        text.kind = FieldKind::Text {
            default_value: Some("hi".into()),
            placeholder: None,
            options: Vec::new(),
        };
        assert_eq!(text.initial_value(), Value::text("hi"));
    }

    #[test]
    fn schema_json_roundtrip_preserves_order_and_absence() {
        let json = r#"{
  "fields": [
    {
      "id": "a",
      "type": "select",
      "options": ["Zeta", "Alpha", "Mid"],
      "label": "Pick",
      "name": "pick",
      "required": true,
      "validation": {
        "notEmpty": true,
        "minLength": 2
      }
    },
    {
      "id": "b",
      "type": "checkbox",
      "defaultValue": true,
      "label": "",
      "name": "",
      "required": false,
      "derived": {
        "enabled": false,
        "parents": ["a"],
        "formula": ""
      }
    }
  ]
}"#;
        let schema = FormSchema::from_json(json).unwrap();
        assert_eq!(schema.fields[0].kind.options(), ["Zeta", "Alpha", "Mid"]);
        assert!(schema.fields[0].derived.is_none());
        assert!(schema.fields[1].validation.is_none());

        let out = schema.to_json_pretty().unwrap();
        let reparsed = FormSchema::from_json(&out).unwrap();
        assert_eq!(reparsed, schema);
        let input: serde_json::Value = serde_json::from_str(json).unwrap();
        let written: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(input, written);
    }

    #[test]
    fn attributes_left_over_from_a_type_switch_still_load() {
        let json = r#"{
  "fields": [
    { "id": "a", "type": "text", "defaultValue": false, "options": ["Yes", "No"] },
    { "id": "b", "type": "number", "defaultValue": 7 },
    { "id": "c", "type": "date", "defaultValue": null, "options": [] },
    { "id": "d", "type": "checkbox", "defaultValue": "" },
    { "id": "e", "type": "checkbox", "defaultValue": "true" },
    { "id": "f", "type": "select", "defaultValue": true, "options": ["x"] }
  ]
}"#;
        let schema = FormSchema::from_json(json).unwrap();
        let initial: Vec<Value> = schema.fields.iter().map(Field::initial_value).collect();
        assert_eq!(
            initial,
            vec![
                Value::text(""),
                Value::text("7"),
                Value::text(""),
                Value::Bool(false),
                Value::Bool(true),
                Value::text(""),
            ]
        );

        let FieldKind::Text { options, .. } = &schema.fields[0].kind else {
            panic!("expected a text field");
        };
        assert_eq!(options, &["Yes", "No"]);
        assert!(schema.fields[0].kind.options().is_empty());

        let written: serde_json::Value =
            serde_json::from_str(&schema.to_json_pretty().unwrap()).unwrap();
        assert_eq!(written["fields"][0]["options"], serde_json::json!(["Yes", "No"]));
        assert!(written["fields"][0].get("defaultValue").is_none());
        assert!(written["fields"][2].get("options").is_none());
    }

    #[test]
    fn value_coercions() {
        assert_eq!(Value::Number(30.0).to_form_string(), "30");
        assert_eq!(Value::Number(2.5).to_form_string(), "2.5");
        assert_eq!(Value::Null.to_form_string(), "");
        assert_eq!(Value::Bool(false).to_form_string(), "false");
        assert_eq!(Value::text(" 42 ").to_number(), 42.0);
        assert_eq!(Value::text("").to_number(), 0.0);
        assert!(Value::text("abc").to_number().is_nan());
        assert!(Value::text("inf").to_number().is_nan());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(Value::text("0").is_truthy());
    }

    #[test]
    fn value_untagged_json() {
        let map: ValueMap =
            serde_json::from_str(r#"{"a": null, "b": true, "c": 3, "d": "x"}"#).unwrap();
        assert_eq!(map.get("a"), Some(&Value::Null));
        assert_eq!(map.get("b"), Some(&Value::Bool(true)));
        assert_eq!(map.get("c"), Some(&Value::Number(3.0)));
        assert_eq!(map.get("d"), Some(&Value::text("x")));
    }

    #[test]
    fn remove_detaches_parents_and_moves() {
        let mut schema = FormSchema::new(vec![
            Field::with_id("a", FieldType::Text),
            Field::with_id("b", FieldType::Text),
            Field::with_id("c", FieldType::Text).derived_from(["a", "b"], "values.a"),
        ]);
        assert!(!schema.move_up(0));
        assert!(schema.move_up(1));
        assert_eq!(schema.fields[0].id, "b");
        assert!(!schema.move_down(2));
        assert!(schema.remove("a").is_some());
        assert_eq!(schema.fields[1].derived.as_ref().unwrap().parents, vec!["b"]);
        assert!(schema.remove("missing").is_none());
    }

    #[test]
    fn derivation_parents_are_a_set() {
        let d = Derivation::new(["a", "b", "a"], "1");
        assert_eq!(d.parents, vec!["a", "b"]);
        assert!(d.enabled);
    }
}
