//! Query builder errors
//!
//! Structural failures: each one aborts the build call and maps to a
//! client-facing 4xx-class response in the gateway. Data-validity problems
//! are not represented here; they travel as validation error collections.

use thiserror::Error;

/// Result type for query building
pub type QueryResult<T> = Result<T, QueryError>;

/// Structural query building errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Requested table is not in the schema cache
    #[error("table '{0}' not found")]
    TableNotFound(String),

    /// A caller-supplied field resolves to no column
    #[error("unknown column '{column}' in table '{table}'")]
    UnknownColumn { column: String, table: String },

    /// Operation requires a primary key the table does not have
    #[error("table '{0}' has no primary key")]
    NoPrimaryKey(String),

    /// Update payload contains nothing writable
    #[error("no updatable columns provided")]
    NoUpdatableColumns,

    /// Descriptor names a primary key column the column listing lacks
    #[error("primary key column '{column}' missing from table '{table}'")]
    PrimaryKeyColumnMissing { column: String, table: String },
}

impl QueryError {
    /// Shorthand for the unknown-column case
    pub fn unknown_column(column: impl Into<String>, table: impl Into<String>) -> Self {
        Self::UnknownColumn {
            column: column.into(),
            table: table.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_identifiers() {
        let err = QueryError::unknown_column("phone", "users");
        assert_eq!(err.to_string(), "unknown column 'phone' in table 'users'");

        let err = QueryError::TableNotFound("orders".into());
        assert_eq!(err.to_string(), "table 'orders' not found");
    }
}
