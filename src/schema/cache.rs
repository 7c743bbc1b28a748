//! In-memory table registry keyed by lower-cased table name
//!
//! The cache is populated once by the introspection layer and read-only
//! afterwards; callers share it behind an `Arc`. Refreshing the snapshot
//! means building a new cache and swapping it in, not mutating this one.

use std::collections::HashMap;

use crate::observability::Logger;

use super::types::TableDescriptor;

/// Live snapshot of database table metadata
#[derive(Debug, Default)]
pub struct SchemaCache {
    tables: HashMap<String, TableDescriptor>,
}

impl SchemaCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table descriptor, replacing any previous entry with the
    /// same (case-insensitive) name.
    pub fn register(&mut self, table: TableDescriptor) {
        Logger::info(
            "SCHEMA_TABLE_REGISTERED",
            &[
                ("table", table.name()),
                ("columns", &table.columns().len().to_string()),
            ],
        );
        self.tables.insert(table.name().to_lowercase(), table);
    }

    /// Case-insensitive table lookup
    pub fn get(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.get(&name.to_lowercase())
    }

    /// Number of registered tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the cache holds no tables
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Registered table names (lower-cased), sorted
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
