//! Table and column descriptors
//!
//! Descriptors are a read-only snapshot of live database metadata. They are
//! built once by the introspection layer, registered in the [`SchemaCache`],
//! and shared across arbitrarily many concurrent callers.
//!
//! [`SchemaCache`]: super::cache::SchemaCache

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Declared column types distinguished by the value checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Variable-length string with a declared maximum
    Varchar,
    /// Fixed-length string
    Char,
    /// Unbounded text
    Text,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    BigInt,
    /// 32-bit floating point
    Float,
    /// 64-bit floating point
    Double,
    /// Fixed-precision decimal
    Decimal,
    /// Boolean
    Bool,
    /// Calendar date (YYYY-MM-DD)
    Date,
    /// Date and time
    DateTime,
    /// Date and time, timezone-normalized
    Timestamp,
    /// RFC 4122 UUID stored as text
    Uuid,
    /// Arbitrary JSON document
    Json,
}

impl ColumnType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnType::Varchar => "varchar",
            ColumnType::Char => "char",
            ColumnType::Text => "text",
            ColumnType::Int => "int",
            ColumnType::BigInt => "bigint",
            ColumnType::Float => "float",
            ColumnType::Double => "double",
            ColumnType::Decimal => "decimal",
            ColumnType::Bool => "bool",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Uuid => "uuid",
            ColumnType::Json => "json",
        }
    }

    /// Whether values of this type are textual
    pub fn is_textual(&self) -> bool {
        matches!(self, ColumnType::Varchar | ColumnType::Char | ColumnType::Text)
    }
}

/// Metadata for a single column, using the database's original-case name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name exactly as declared in the database
    pub name: String,

    /// Declared type
    #[serde(rename = "type")]
    pub column_type: ColumnType,

    /// Whether NULL is allowed
    #[serde(default)]
    pub nullable: bool,

    /// Whether this column is (part of) the primary key
    #[serde(default)]
    pub is_primary_key: bool,

    /// Whether the database assigns this column's value on insert
    #[serde(default)]
    pub is_auto_increment: bool,

    /// Declared size for textual types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl ColumnDescriptor {
    /// Create a nullable column of the given type
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
            is_primary_key: false,
            is_auto_increment: false,
            max_length: None,
        }
    }

    /// Mark the column NOT NULL
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Mark the column as the primary key (implies NOT NULL)
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.nullable = false;
        self
    }

    /// Mark the column auto-increment
    pub fn auto_increment(mut self) -> Self {
        self.is_auto_increment = true;
        self
    }

    /// Set the declared maximum length
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }
}

/// Metadata for a table: columns in declaration order plus a
/// case-insensitive lookup index.
///
/// Declaration order is the deterministic expansion order when a caller
/// requests all columns. The lookup index is keyed by lower-cased column
/// name; identifier emission always goes through the descriptor's
/// original-case [`ColumnDescriptor::name`].
#[derive(Debug, Clone)]
pub struct TableDescriptor {
    name: String,
    columns: Vec<ColumnDescriptor>,
    index: HashMap<String, usize>,
    primary_key: Option<String>,
}

impl TableDescriptor {
    /// Build a descriptor from columns in declaration order.
    ///
    /// The primary key is taken from the first column flagged
    /// `is_primary_key`, if any.
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        let mut index = HashMap::with_capacity(columns.len());
        let mut primary_key = None;
        for (position, column) in columns.iter().enumerate() {
            let key = column.name.to_lowercase();
            if column.is_primary_key && primary_key.is_none() {
                primary_key = Some(key.clone());
            }
            index.insert(key, position);
        }
        Self {
            name: name.into(),
            columns,
            index,
            primary_key,
        }
    }

    /// Override the primary key column name.
    ///
    /// Introspection may report a key constraint naming a column the column
    /// listing does not carry; the mismatch surfaces at build time, not here.
    pub fn with_primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = Some(column.into().to_lowercase());
        self
    }

    /// Table name as declared in the database
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Columns in declaration order
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Case-insensitive column lookup
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.index
            .get(&name.to_lowercase())
            .map(|&position| &self.columns[position])
    }

    /// Whether a column with this name exists (case-insensitive)
    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_lowercase())
    }

    /// Lower-cased primary key column name, if the table has one
    pub fn primary_key_name(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    /// Descriptor of the primary key column, if it resolves
    pub fn primary_key_column(&self) -> Option<&ColumnDescriptor> {
        self.primary_key_name().and_then(|name| self.column(name))
    }
}
