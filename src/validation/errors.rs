//! Field-addressable validation errors
//!
//! Data-validity problems are values, not control flow: validators return
//! an ordered collection, and an empty collection means valid. Nothing in
//! this family aborts a call.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Pseudo-field used when the failure concerns the table itself
pub const TABLE_FIELD: &str = "_table";

/// One field-scoped validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Input field the message is addressed to
    pub field: String,

    /// Human-readable explanation
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Ordered collection of validation errors; empty means valid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    /// An empty (valid) collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an error built from field and message
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(ValidationError::new(field, message));
    }

    /// Append an already-built error
    pub fn push_error(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// Append all errors from another collection, preserving order
    pub fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    /// Whether any error was recorded
    pub fn has_errors(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// First error in recorded order
    pub fn first(&self) -> Option<&ValidationError> {
        self.0.first()
    }

    /// Consume the collection, keeping only the first error
    pub fn into_first(self) -> Option<ValidationError> {
        self.0.into_iter().next()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// Group messages by field, for serialization into a per-field error map
    pub fn by_field(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut map: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for error in &self.0 {
            map.entry(error.field.as_str())
                .or_default()
                .push(error.message.as_str());
        }
        map
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => write!(f, "no validation errors"),
            [only] => write!(f, "{}", only),
            all => {
                write!(f, "validation failed ({} errors): ", all.len())?;
                for (i, error) in all.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", error)?;
                }
                Ok(())
            }
        }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }
}
