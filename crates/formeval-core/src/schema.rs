//! Structural checks and soft warnings for form schemas.
//!
//! Neither check is enforced by the evaluator. A schema that fails them still
//! evaluates, it just may produce stale or missing derived values.

use std::collections::{HashMap, HashSet};

use crate::error::SchemaError;
use crate::formula::compile;
use crate::model::{FieldId, FieldKind, FormSchema};

/// Report duplicate ids, dangling parents, self-references, and cycles.
pub fn check_schema(schema: &FormSchema) -> Vec<SchemaError> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for field in &schema.fields {
        if !seen.insert(field.id.as_str()) && reported.insert(field.id.as_str()) {
            errors.push(SchemaError::DuplicateId {
                id: field.id.clone(),
            });
        }
    }

    for field in &schema.fields {
        let Some(derived) = &field.derived else {
            continue;
        };
        for parent in &derived.parents {
            if *parent == field.id {
                errors.push(SchemaError::SelfReference {
                    field: field.id.clone(),
                });
            } else if !seen.contains(parent.as_str()) {
                errors.push(SchemaError::DanglingParent {
                    field: field.id.clone(),
                    parent: parent.clone(),
                });
            }
        }
    }

    errors.extend(find_cycles(schema));
    errors
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Depth-first search over "derives from" edges of enabled derived fields.
fn find_cycles(schema: &FormSchema) -> Vec<SchemaError> {
    let ids: HashSet<&str> = schema.fields.iter().map(|f| f.id.as_str()).collect();
    let mut edges: HashMap<&str, Vec<&str>> = HashMap::new();
    for field in &schema.fields {
        if edges.contains_key(field.id.as_str()) {
            continue;
        }
        let parents: Vec<&str> = field
            .derived
            .as_ref()
            .filter(|d| d.enabled)
            .map(|d| {
                d.parents
                    .iter()
                    .map(String::as_str)
                    .filter(|p| *p != field.id && ids.contains(p))
                    .collect()
            })
            .unwrap_or_default();
        edges.insert(&field.id, parents);
    }

    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let mut cycles = Vec::new();
    // Each frame is a node and the index of the next parent to follow.
    let mut stack: Vec<(&str, usize)> = Vec::new();
    for field in &schema.fields {
        let root = field.id.as_str();
        if marks.contains_key(root) {
            continue;
        }
        marks.insert(root, Mark::Visiting);
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let (node, next) = *frame;
            frame.1 += 1;
            let Some(&parent) = edges.get(node).and_then(|parents| parents.get(next)) else {
                marks.insert(node, Mark::Done);
                stack.pop();
                continue;
            };
            match marks.get(parent) {
                Some(Mark::Visiting) => {
                    let start = stack.iter().position(|(n, _)| *n == parent).unwrap_or(0);
                    let mut path: Vec<FieldId> =
                        stack[start..].iter().map(|(n, _)| n.to_string()).collect();
                    path.push(parent.to_string());
                    cycles.push(SchemaError::Cycle { path });
                }
                Some(Mark::Done) => {}
                None => {
                    marks.insert(parent, Mark::Visiting);
                    stack.push((parent, 0));
                }
            }
        }
    }
    cycles
}

/// A soft problem with a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaWarning {
    /// The field the warning is about (if applicable).
    pub field_id: Option<FieldId>,
    /// Warning message.
    pub message: String,
}

impl SchemaWarning {
    fn new(field_id: &str, message: impl Into<String>) -> Self {
        Self {
            field_id: Some(field_id.to_string()),
            message: message.into(),
        }
    }
}

/// Check a schema for issues that do not break evaluation but probably
/// surprise the person filling the form.
pub fn lint_schema(schema: &FormSchema) -> Vec<SchemaWarning> {
    let mut warnings = Vec::new();

    // Two fields writing to the same value-map key
    let mut keys = HashSet::new();
    for field in &schema.fields {
        if !keys.insert(field.key()) {
            warnings.push(SchemaWarning::new(
                &field.id,
                format!("value key '{}' is used by more than one field", field.key()),
            ));
        }
    }

    // Choice fields with nothing to choose
    for field in &schema.fields {
        let no_options = matches!(
            &field.kind,
            FieldKind::Select { options, .. } | FieldKind::Radio { options, .. } if options.is_empty()
        );
        if no_options {
            warnings.push(SchemaWarning::new(
                &field.id,
                format!("{} field has no options", field.field_type()),
            ));
        }
    }

    // Formulas
    for (position, field) in schema.fields.iter().enumerate() {
        let Some(derived) = field.derived.as_ref().filter(|d| d.enabled) else {
            continue;
        };
        if derived.formula.trim().is_empty() {
            warnings.push(SchemaWarning::new(
                &field.id,
                "derived field has no formula and will never update",
            ));
            continue;
        }
        let formula = match compile(&derived.formula) {
            Ok(formula) => formula,
            Err(e) => {
                warnings.push(SchemaWarning::new(
                    &field.id,
                    format!("formula does not compile: {e}"),
                ));
                continue;
            }
        };

        let mut read_positions = Vec::new();
        for key in formula.references() {
            match schema.fields.iter().position(|f| f.key() == key || f.id == key) {
                Some(p) => read_positions.push(p),
                None => warnings.push(SchemaWarning::new(
                    &field.id,
                    format!("formula reads '{key}', which matches no field"),
                )),
            }
        }
        for parent in &derived.parents {
            if let Some(p) = schema.fields.iter().position(|f| f.id == *parent) {
                read_positions.push(p);
            }
        }
        read_positions.sort_unstable();
        read_positions.dedup();

        for p in read_positions {
            let source = &schema.fields[p];
            if p > position && source.is_derived() {
                warnings.push(SchemaWarning::new(
                    &field.id,
                    format!(
                        "reads derived field '{}' defined later in the schema; \
                         its value lags one recomputation behind",
                        source.key()
                    ),
                ));
            }
        }
    }

    warnings
}
