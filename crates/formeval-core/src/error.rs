//! Error types for the form evaluation engine.
//!
//! None of these are fatal. Schema errors are advisory, formula errors are
//! swallowed by the derived-field evaluator, and session errors only mean an
//! edit was ignored.

use thiserror::Error;

use crate::model::FieldId;

/// A structural problem found by [`crate::schema::check_schema`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Two or more fields share one id.
    #[error("duplicate field id: {id}")]
    DuplicateId { id: FieldId },

    /// A derivation lists a parent that is not in the schema.
    #[error("field {field} derives from unknown field {parent}")]
    DanglingParent { field: FieldId, parent: FieldId },

    /// A derivation lists its own field as a parent.
    #[error("field {field} derives from itself")]
    SelfReference { field: FieldId },

    /// Derived fields depend on each other in a loop. The path starts and
    /// ends on the same id.
    #[error("derived fields form a cycle: {}", path.join(" -> "))]
    Cycle { path: Vec<FieldId> },
}

impl SchemaError {
    /// The field the error is reported against.
    pub fn field_id(&self) -> &str {
        match self {
            SchemaError::DuplicateId { id } => id,
            SchemaError::DanglingParent { field, .. } | SchemaError::SelfReference { field } => {
                field
            }
            SchemaError::Cycle { path } => path.first().map(String::as_str).unwrap_or_default(),
        }
    }
}

/// A formula that failed to compile or run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("formula is empty")]
    Empty,

    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unterminated string starting at offset {0}")]
    UnterminatedString(usize),

    #[error("unexpected '{found}' at offset {offset}, expected {expected}")]
    UnexpectedToken {
        found: String,
        offset: usize,
        expected: String,
    },

    #[error("unexpected end of formula, expected {0}")]
    UnexpectedEnd(String),

    /// Brackets, prefix operators, conditionals or operator chains nest past
    /// the limit.
    #[error("formula nests deeper than {0} levels")]
    TooDeep(usize),

    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),

    #[error("unknown helper '{0}'")]
    UnknownHelper(String),

    #[error("helper '{name}' takes {expected} argument(s), got {got}")]
    Arity {
        name: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("invalid date '{0}'")]
    InvalidDate(String),

    #[error("formula produced a non-finite number")]
    NonFinite,
}

impl FormulaError {
    /// Returns `true` if the formula never compiled, as opposed to failing on
    /// the current values.
    pub fn is_compile_error(&self) -> bool {
        !matches!(self, FormulaError::InvalidDate(_) | FormulaError::NonFinite)
    }
}

/// An edit rejected by [`crate::session::FormSession::set_value`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The targeted field is derived and cannot be written directly.
    #[error("field '{key}' is derived and read-only")]
    ReadOnlyField { key: String },

    /// No field has this key or id.
    #[error("no field with key '{key}'")]
    UnknownField { key: String },
}
