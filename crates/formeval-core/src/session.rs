//! Form session: live values and errors for one schema.

use std::fmt;

use crate::clock::{Clock, SystemClock};
use crate::derived::Recomputer;
use crate::error::SessionError;
use crate::formula::Helpers;
use crate::model::{ErrorMap, FormSchema, Value, ValueMap};
use crate::validation::validate_form;

/// Where a session is in its edit/submit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Defaults seeded and one derived pass run.
    Idle,
    /// At least one value changed since the last submit.
    Editing,
    /// A validation pass has run. Not terminal.
    Submitted,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Editing => write!(f, "editing"),
            SessionState::Submitted => write!(f, "submitted"),
        }
    }
}

/// Owns the value map and error map for one frozen schema.
pub struct FormSession {
    schema: FormSchema,
    recomputer: Recomputer,
    clock: Box<dyn Clock>,
    values: ValueMap,
    errors: ErrorMap,
    state: SessionState,
}

impl fmt::Debug for FormSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormSession")
            .field("fields", &self.schema.fields.len())
            .field("values", &self.values)
            .field("errors", &self.errors)
            .field("state", &self.state)
            .finish()
    }
}

impl FormSession {
    /// Start a session on the system clock.
    pub fn new(schema: &FormSchema) -> Self {
        Self::with_clock(schema, Box::new(SystemClock))
    }

    /// Start a session with an explicit evaluation-date source.
    pub fn with_clock(schema: &FormSchema, clock: Box<dyn Clock>) -> Self {
        let mut session = Self {
            schema: FormSchema::default(),
            recomputer: Recomputer::new(&FormSchema::default()),
            clock,
            values: ValueMap::new(),
            errors: ErrorMap::new(),
            state: SessionState::Idle,
        };
        session.reset(schema);
        session
    }

    /// Replace the schema and reinitialize: seed defaults, run one derived
    /// pass, clear errors.
    pub fn reset(&mut self, schema: &FormSchema) -> &ValueMap {
        self.schema = schema.clone();
        self.recomputer = Recomputer::new(&self.schema);
        let defaults = ValueMap::from_defaults(&self.schema);
        self.values = self.recomputer.recompute(&defaults, &self.helpers());
        self.errors.clear();
        self.state = SessionState::Idle;
        tracing::debug!(
            fields = self.schema.fields.len(),
            derived = self.recomputer.derived_count(),
            "form session initialized"
        );
        &self.values
    }

    /// Write a value and recompute every derived field.
    ///
    /// Derived fields are read-only and unknown keys are rejected; in both
    /// cases nothing changes.
    pub fn set_value(&mut self, key: &str, value: impl Into<Value>) -> Result<(), SessionError> {
        let field = self
            .schema
            .resolve(key)
            .ok_or_else(|| SessionError::UnknownField {
                key: key.to_string(),
            })?;
        if field.is_derived() {
            return Err(SessionError::ReadOnlyField {
                key: field.key().to_string(),
            });
        }
        let key = field.key().to_string();

        let mut next = self.values.clone();
        next.insert(key, value.into());
        self.values = self.recomputer.recompute(&next, &self.helpers());
        self.state = SessionState::Editing;
        Ok(())
    }

    /// Validate every field against the current values. Values are untouched.
    pub fn submit(&mut self) -> &ErrorMap {
        self.errors = validate_form(&self.schema, &self.values);
        self.state = SessionState::Submitted;
        tracing::debug!(errors = self.errors.len(), "form submitted");
        &self.errors
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn values(&self) -> &ValueMap {
        &self.values
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn error_for(&self, key: &str) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// `true` once submitted with no errors.
    pub fn is_valid(&self) -> bool {
        self.state == SessionState::Submitted && self.errors.is_empty()
    }

    fn helpers(&self) -> Helpers {
        Helpers::from_clock(self.clock.as_ref())
    }
}
