//! formeval-core — form schema model, formula sandbox, derived fields, and
//! validation.
//!
//! This crate is the evaluation engine behind formeval. It knows nothing
//! about rendering or storage: give it a [`FormSchema`] and it tracks values,
//! recomputes derived fields, and validates on submit.

pub mod clock;
pub mod derived;
pub mod error;
pub mod formula;
pub mod model;
pub mod parser;
pub mod report;
pub mod schema;
pub mod session;
pub mod validation;

pub use derived::{recompute, Recomputer};
pub use error::{FormulaError, SchemaError, SessionError};
pub use formula::{compile, Formula, Helpers};
pub use model::{
    Derivation, ErrorMap, Field, FieldId, FieldKind, FieldType, FormSchema, ValidationRules,
    Value, ValueMap,
};
pub use schema::{check_schema, lint_schema, SchemaWarning};
pub use session::{FormSession, SessionState};
pub use validation::{validate_field, validate_form};
