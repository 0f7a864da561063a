//! Derived field recomputation.
//!
//! One pass walks the schema in order and evaluates every enabled derived
//! field exactly once. Formulas see a working copy of the values keyed by
//! both value-map key and field id. A derived field that reads another
//! derived field positioned later in the schema therefore sees that field's
//! value from before the pass. This ordering is observable and kept as is.

use crate::error::FormulaError;
use crate::formula::{compile, Formula, Helpers};
use crate::model::{FieldId, FormSchema, Value, ValueMap};

/// A derived field with its formula compiled once.
#[derive(Debug, Clone)]
struct DerivedSlot {
    key: String,
    id: FieldId,
    formula: Result<Formula, FormulaError>,
}

/// Recomputes derived fields for one frozen schema, reusing compiled formulas
/// across passes.
#[derive(Debug, Clone)]
pub struct Recomputer {
    /// `(key, id)` for every field, in schema order.
    keys: Vec<(String, FieldId)>,
    slots: Vec<DerivedSlot>,
}

impl Recomputer {
    pub fn new(schema: &FormSchema) -> Self {
        let keys = schema
            .fields
            .iter()
            .map(|f| (f.key().to_string(), f.id.clone()))
            .collect();

        let slots = schema
            .fields
            .iter()
            .filter_map(|f| {
                let derived = f.derived.as_ref().filter(|d| d.enabled)?;
                if derived.formula.trim().is_empty() {
                    return None;
                }
                Some(DerivedSlot {
                    key: f.key().to_string(),
                    id: f.id.clone(),
                    formula: compile(&derived.formula),
                })
            })
            .collect();

        Self { keys, slots }
    }

    /// Number of derived fields that take part in a pass.
    pub fn derived_count(&self) -> usize {
        self.slots.len()
    }

    /// Run one recomputation pass and return the updated value map.
    pub fn recompute(&self, values: &ValueMap, helpers: &Helpers) -> ValueMap {
        let mut result = values.clone();
        if self.slots.is_empty() {
            return result;
        }

        let mut working = ValueMap::new();
        for (key, id) in &self.keys {
            if let Some(value) = values.get(key) {
                working.insert(key.clone(), value.clone());
                working.insert(id.clone(), value.clone());
            }
        }

        for slot in &self.slots {
            let outcome = match &slot.formula {
                Ok(formula) => formula.run(&working, helpers),
                Err(e) => Err(e.clone()),
            };
            match outcome {
                Ok(value) => {
                    working.insert(slot.key.clone(), value.clone());
                    working.insert(slot.id.clone(), value.clone());
                    result.insert(slot.key.clone(), value);
                }
                Err(e) => {
                    tracing::debug!(
                        field = %slot.id,
                        "derived formula failed, keeping previous value: {e}"
                    );
                }
            }
        }

        result
    }
}

/// Run one recomputation pass over `schema`, compiling each formula afresh.
pub fn recompute(schema: &FormSchema, values: &ValueMap, helpers: &Helpers) -> ValueMap {
    Recomputer::new(schema).recompute(values, helpers)
}

/// Seed defaults and run the first pass, as a new session does.
pub fn initial_values(schema: &FormSchema, helpers: &Helpers) -> ValueMap {
    recompute(schema, &ValueMap::from_defaults(schema), helpers)
}

/// Convenience for reading a derived value in tests and reports.
pub fn value_of<'a>(values: &'a ValueMap, key: &str) -> &'a Value {
    const NULL: &Value = &Value::Null;
    values.get(key).unwrap_or(NULL)
}
