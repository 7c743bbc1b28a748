//! Descriptor-driven validation
//!
//! Checks a weakly-typed data map against a table's live schema: unknown
//! columns (hard errors in strict mode), per-type value checks, and
//! create-time presence of non-nullable columns. Unknown-column errors
//! suppress value-level checks for the whole call, so a caller never
//! receives value diagnostics for a payload whose shape is already wrong.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::schema::{column, SchemaCache};

use super::errors::{ValidationErrors, TABLE_FIELD};

/// Which mutation the data map is destined for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Insert of a new row
    Create,
    /// Partial update of an existing row
    Update,
}

/// Validates data maps against the schema cache
pub struct SchemaValidator {
    cache: Arc<SchemaCache>,
    strict_mode: bool,
}

impl SchemaValidator {
    /// Create a validator over a shared schema snapshot
    pub fn new(cache: Arc<SchemaCache>, strict_mode: bool) -> Self {
        Self { cache, strict_mode }
    }

    /// Validate `data` for the given operation on `table`.
    ///
    /// Invalid data never aborts the call; invalidity is only the returned
    /// collection.
    pub fn validate(
        &self,
        table: &str,
        data: &HashMap<String, Value>,
        operation: Operation,
    ) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        let Some(descriptor) = self.cache.get(table) else {
            errors.push(TABLE_FIELD, format!("table '{}' not found", table));
            return errors;
        };

        // Deterministic reporting order regardless of map iteration order
        let mut fields: Vec<&String> = data.keys().collect();
        fields.sort();

        if self.strict_mode {
            for field in &fields {
                if !descriptor.has_column(field.as_str()) {
                    errors.push(
                        field.as_str(),
                        format!(
                            "unknown column '{}' in table '{}'",
                            field,
                            descriptor.name()
                        ),
                    );
                }
            }
            if errors.has_errors() {
                return errors;
            }
        }

        for field in &fields {
            let Some(col) = descriptor.column(field.as_str()) else {
                continue;
            };
            if operation == Operation::Create && col.is_auto_increment {
                continue;
            }
            if operation == Operation::Update && col.is_primary_key {
                continue;
            }
            if let Err(message) = column::check_value(col, &data[field.as_str()]) {
                errors.push(field.as_str(), message);
            }
        }

        if operation == Operation::Create {
            for col in descriptor.columns() {
                if col.is_auto_increment || col.nullable {
                    continue;
                }
                let present = data.keys().any(|key| key.eq_ignore_ascii_case(&col.name));
                if !present {
                    errors.push(
                        col.name.as_str(),
                        format!(
                            "column '{}' is required and does not allow NULL",
                            col.name
                        ),
                    );
                }
            }
        }

        errors
    }
}
