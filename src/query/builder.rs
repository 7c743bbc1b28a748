//! Dynamic SQL construction against the schema cache
//!
//! Every operation resolves the table first, then resolves each
//! caller-supplied field case-insensitively against the table's columns,
//! failing fast on the first miss. Emitted identifiers always use the
//! descriptor's original-case name; caller casing never reaches SQL text.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::schema::{ColumnDescriptor, SchemaCache, TableDescriptor};

use super::errors::{QueryError, QueryResult};
use super::params::{Filter, FilterOperator, QueryParams, SortDirection};
use super::statement::{placeholders, quote_identifier, StatementBuilder};

/// Builds parameterized single-table statements from structured requests
pub struct QueryBuilder {
    schema: Arc<SchemaCache>,
}

impl QueryBuilder {
    /// Create a builder over a shared schema snapshot
    pub fn new(schema: Arc<SchemaCache>) -> Self {
        Self { schema }
    }

    /// SELECT with fields, filters, sorting, and pagination
    pub fn build_select(
        &self,
        table: &str,
        params: &QueryParams,
    ) -> QueryResult<(String, Vec<Value>)> {
        let descriptor = self.table(table)?;
        let columns = select_columns(descriptor, &params.fields)?;

        let mut stmt = StatementBuilder::new();
        stmt.push(format!(
            "SELECT {} FROM {}",
            columns.join(", "),
            quote_identifier(descriptor.name())
        ));

        apply_filters(descriptor, &params.filters, &mut stmt)?;

        if let Some(sorting) = &params.sorting {
            let column = resolve(descriptor, &sorting.field)?;
            let direction = match sorting.direction {
                SortDirection::Desc => "DESC",
                SortDirection::Asc => "ASC",
            };
            stmt.push(format!(
                "ORDER BY {} {}",
                quote_identifier(&column.name),
                direction
            ));
        }

        if let Some(pagination) = &params.pagination {
            if pagination.limit > 0 {
                stmt.push(format!("LIMIT {}", pagination.limit));
            }
            if pagination.offset > 0 {
                stmt.push(format!("OFFSET {}", pagination.offset));
            }
        }

        Ok(stmt.finish())
    }

    /// SELECT one row by primary key
    pub fn build_select_by_id(
        &self,
        table: &str,
        id: Value,
        fields: &[String],
    ) -> QueryResult<(String, Vec<Value>)> {
        let descriptor = self.table(table)?;
        let primary_key = primary_key(descriptor)?;
        let columns = select_columns(descriptor, fields)?;

        let mut stmt = StatementBuilder::new();
        stmt.push(format!(
            "SELECT {} FROM {} WHERE {} = ? LIMIT 1",
            columns.join(", "),
            quote_identifier(descriptor.name()),
            quote_identifier(&primary_key.name)
        ));
        stmt.bind(id);

        Ok(stmt.finish())
    }

    /// COUNT over the filtered row set; fields, sorting, and pagination are
    /// ignored.
    pub fn build_count(
        &self,
        table: &str,
        params: &QueryParams,
    ) -> QueryResult<(String, Vec<Value>)> {
        let descriptor = self.table(table)?;

        let mut stmt = StatementBuilder::new();
        stmt.push(format!(
            "SELECT COUNT(*) AS count FROM {}",
            quote_identifier(descriptor.name())
        ));
        apply_filters(descriptor, &params.filters, &mut stmt)?;

        Ok(stmt.finish())
    }

    /// INSERT one row. Auto-increment columns are dropped even if supplied.
    ///
    /// A payload consisting solely of auto-increment columns produces an
    /// insert with empty column and value lists; the execution layer decides
    /// what to do with it.
    pub fn build_insert(
        &self,
        table: &str,
        data: &HashMap<String, Value>,
    ) -> QueryResult<(String, Vec<Value>)> {
        let descriptor = self.table(table)?;
        let writable = writable_columns(descriptor, data, |column| column.is_auto_increment)?;

        let columns: Vec<String> = writable
            .iter()
            .map(|(column, _)| quote_identifier(&column.name))
            .collect();

        let mut stmt = StatementBuilder::new();
        stmt.push(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_identifier(descriptor.name()),
            columns.join(", "),
            placeholders(writable.len())
        ));
        for (_, value) in writable {
            stmt.bind(value.clone());
        }

        Ok(stmt.finish())
    }

    /// UPDATE one row by primary key. Primary-key and auto-increment columns
    /// are dropped even if supplied.
    pub fn build_update(
        &self,
        table: &str,
        id: Value,
        data: &HashMap<String, Value>,
    ) -> QueryResult<(String, Vec<Value>)> {
        let descriptor = self.table(table)?;
        let primary_key = primary_key(descriptor)?;
        let writable = writable_columns(descriptor, data, |column| {
            column.is_primary_key || column.is_auto_increment
        })?;
        if writable.is_empty() {
            return Err(QueryError::NoUpdatableColumns);
        }

        let assignments: Vec<String> = writable
            .iter()
            .map(|(column, _)| format!("{} = ?", quote_identifier(&column.name)))
            .collect();

        let mut stmt = StatementBuilder::new();
        stmt.push(format!(
            "UPDATE {} SET {} WHERE {} = ?",
            quote_identifier(descriptor.name()),
            assignments.join(", "),
            quote_identifier(&primary_key.name)
        ));
        for (_, value) in writable {
            stmt.bind(value.clone());
        }
        stmt.bind(id);

        Ok(stmt.finish())
    }

    /// DELETE one row by primary key
    pub fn build_delete(&self, table: &str, id: Value) -> QueryResult<(String, Vec<Value>)> {
        let descriptor = self.table(table)?;
        let primary_key = primary_key(descriptor)?;

        let mut stmt = StatementBuilder::new();
        stmt.push(format!(
            "DELETE FROM {} WHERE {} = ?",
            quote_identifier(descriptor.name()),
            quote_identifier(&primary_key.name)
        ));
        stmt.bind(id);

        Ok(stmt.finish())
    }

    fn table(&self, name: &str) -> QueryResult<&TableDescriptor> {
        self.schema
            .get(name)
            .ok_or_else(|| QueryError::TableNotFound(name.to_string()))
    }
}

/// Case-insensitive field resolution, failing with the caller's spelling
fn resolve<'a>(
    descriptor: &'a TableDescriptor,
    field: &str,
) -> QueryResult<&'a ColumnDescriptor> {
    descriptor
        .column(field)
        .ok_or_else(|| QueryError::unknown_column(field, descriptor.name()))
}

/// Primary key descriptor, or the structural error explaining its absence
fn primary_key(descriptor: &TableDescriptor) -> QueryResult<&ColumnDescriptor> {
    let name = descriptor
        .primary_key_name()
        .ok_or_else(|| QueryError::NoPrimaryKey(descriptor.name().to_string()))?;
    descriptor
        .column(name)
        .ok_or_else(|| QueryError::PrimaryKeyColumnMissing {
            column: name.to_string(),
            table: descriptor.name().to_string(),
        })
}

/// Quoted column list: requested fields, or all columns in declaration order
fn select_columns(descriptor: &TableDescriptor, fields: &[String]) -> QueryResult<Vec<String>> {
    if fields.is_empty() {
        return Ok(descriptor
            .columns()
            .iter()
            .map(|column| quote_identifier(&column.name))
            .collect());
    }
    fields
        .iter()
        .map(|field| resolve(descriptor, field).map(|column| quote_identifier(&column.name)))
        .collect()
}

/// Resolve a mutation payload, dropping columns matching `skip`.
///
/// The surviving pairs are sorted by resolved column name so that repeated
/// builds of the same payload emit identical SQL; column/value pairing is
/// preserved through the sort.
fn writable_columns<'a>(
    descriptor: &'a TableDescriptor,
    data: &'a HashMap<String, Value>,
    skip: impl Fn(&ColumnDescriptor) -> bool,
) -> QueryResult<Vec<(&'a ColumnDescriptor, &'a Value)>> {
    let mut writable = Vec::with_capacity(data.len());
    for (field, value) in data {
        let column = resolve(descriptor, field)?;
        if skip(column) {
            continue;
        }
        writable.push((column, value));
    }
    writable.sort_by(|a, b| a.0.name.cmp(&b.0.name));
    Ok(writable)
}

/// Append a WHERE clause for the filters, resolving each field in order
fn apply_filters(
    descriptor: &TableDescriptor,
    filters: &[Filter],
    stmt: &mut StatementBuilder,
) -> QueryResult<()> {
    if filters.is_empty() {
        return Ok(());
    }

    let mut predicates = Vec::with_capacity(filters.len());
    for filter in filters {
        let column = resolve(descriptor, &filter.field)?;
        predicates.push(predicate(column, filter, stmt));
    }
    stmt.push(format!("WHERE {}", predicates.join(" AND ")));
    Ok(())
}

/// Render one filter as a predicate fragment, binding its arguments
fn predicate(column: &ColumnDescriptor, filter: &Filter, stmt: &mut StatementBuilder) -> String {
    let identifier = quote_identifier(&column.name);
    match filter.operator {
        FilterOperator::Eq => unary(stmt, filter, format!("{identifier} = ?")),
        FilterOperator::Neq => unary(stmt, filter, format!("{identifier} <> ?")),
        FilterOperator::Gt => unary(stmt, filter, format!("{identifier} > ?")),
        FilterOperator::Gte => unary(stmt, filter, format!("{identifier} >= ?")),
        FilterOperator::Lt => unary(stmt, filter, format!("{identifier} < ?")),
        FilterOperator::Lte => unary(stmt, filter, format!("{identifier} <= ?")),
        FilterOperator::Like => unary(stmt, filter, format!("{identifier} LIKE ?")),
        FilterOperator::NotLike => unary(stmt, filter, format!("{identifier} NOT LIKE ?")),
        FilterOperator::In => listed(stmt, filter, format!("{identifier} IN")),
        FilterOperator::NotIn => listed(stmt, filter, format!("{identifier} NOT IN")),
    }
}

fn unary(stmt: &mut StatementBuilder, filter: &Filter, fragment: String) -> String {
    stmt.bind(filter.value.clone());
    fragment
}

fn listed(stmt: &mut StatementBuilder, filter: &Filter, prefix: String) -> String {
    for value in &filter.values {
        stmt.bind(value.clone());
    }
    format!("{} ({})", prefix, placeholders(filter.values.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::params::Sorting;
    use crate::schema::ColumnType;
    use serde_json::json;

    fn setup_schema() -> Arc<SchemaCache> {
        let mut cache = SchemaCache::new();
        cache.register(TableDescriptor::new(
            "users",
            vec![
                ColumnDescriptor::new("id", ColumnType::Int)
                    .primary_key()
                    .auto_increment(),
                ColumnDescriptor::new("Email", ColumnType::Varchar)
                    .not_null()
                    .with_max_length(255),
                ColumnDescriptor::new("age", ColumnType::Int),
            ],
        ));
        cache.register(TableDescriptor::new(
            "notes",
            vec![ColumnDescriptor::new("body", ColumnType::Text)],
        ));
        Arc::new(cache)
    }

    fn builder() -> QueryBuilder {
        QueryBuilder::new(setup_schema())
    }

    #[test]
    fn test_select_all_columns_in_declaration_order() {
        let (sql, args) = builder()
            .build_select("users", &QueryParams::new())
            .unwrap();
        assert_eq!(sql, "SELECT `id`, `Email`, `age` FROM `users`");
        assert!(args.is_empty());
    }

    #[test]
    fn test_select_emits_original_case_for_requested_fields() {
        let params = QueryParams::new().with_fields(&["EMAIL"]);
        let (sql, _) = builder().build_select("users", &params).unwrap();
        assert_eq!(sql, "SELECT `Email` FROM `users`");
    }

    #[test]
    fn test_select_unknown_table() {
        let err = builder()
            .build_select("missing", &QueryParams::new())
            .unwrap_err();
        assert_eq!(err, QueryError::TableNotFound("missing".into()));
    }

    #[test]
    fn test_select_unknown_field_fails_fast() {
        let params = QueryParams::new().with_fields(&["id", "phone", "email"]);
        let err = builder().build_select("users", &params).unwrap_err();
        assert_eq!(err, QueryError::unknown_column("phone", "users"));
    }

    #[test]
    fn test_filter_and_sort_and_pagination() {
        let params = QueryParams::new()
            .with_fields(&["id"])
            .with_filter(Filter::new("age", FilterOperator::Gte, json!(18)))
            .with_sorting(Sorting::desc("email"))
            .with_pagination(10, 20);

        let (sql, args) = builder().build_select("users", &params).unwrap();
        assert_eq!(
            sql,
            "SELECT `id` FROM `users` WHERE `age` >= ? ORDER BY `Email` DESC LIMIT 10 OFFSET 20"
        );
        assert_eq!(args, vec![json!(18)]);
    }

    #[test]
    fn test_zero_pagination_left_out() {
        let params = QueryParams::new().with_pagination(0, 0);
        let (sql, _) = builder().build_select("users", &params).unwrap();
        assert!(!sql.contains("LIMIT"));
        assert!(!sql.contains("OFFSET"));
    }

    #[test]
    fn test_select_by_id() {
        let (sql, args) = builder()
            .build_select_by_id("users", json!(7), &["email".to_string()])
            .unwrap();
        assert_eq!(sql, "SELECT `Email` FROM `users` WHERE `id` = ? LIMIT 1");
        assert_eq!(args, vec![json!(7)]);
    }

    #[test]
    fn test_select_by_id_requires_primary_key() {
        let err = builder()
            .build_select_by_id("notes", json!(1), &[])
            .unwrap_err();
        assert_eq!(err, QueryError::NoPrimaryKey("notes".into()));
    }

    #[test]
    fn test_count_ignores_fields_and_sorting() {
        let params = QueryParams::new()
            .with_fields(&["email"])
            .with_filter(Filter::eq("age", json!(30)))
            .with_sorting(Sorting::asc("email"))
            .with_pagination(5, 5);

        let (sql, args) = builder().build_count("users", &params).unwrap();
        assert_eq!(sql, "SELECT COUNT(*) AS count FROM `users` WHERE `age` = ?");
        assert_eq!(args, vec![json!(30)]);
    }

    #[test]
    fn test_count_resolves_filter_fields() {
        let params = QueryParams::new().with_filter(Filter::eq("phone", json!("x")));
        let err = builder().build_count("users", &params).unwrap_err();
        assert_eq!(err, QueryError::unknown_column("phone", "users"));
    }

    #[test]
    fn test_insert_drops_auto_increment() {
        let data = HashMap::from([
            ("id".to_string(), json!(7)),
            ("email".to_string(), json!("a@b.com")),
        ]);
        let (sql, args) = builder().build_insert("users", &data).unwrap();
        assert_eq!(sql, "INSERT INTO `users` (`Email`) VALUES (?)");
        assert_eq!(args, vec![json!("a@b.com")]);
    }

    #[test]
    fn test_insert_pairs_columns_and_values() {
        let data = HashMap::from([
            ("email".to_string(), json!("a@b.com")),
            ("age".to_string(), json!(33)),
        ]);
        let (sql, args) = builder().build_insert("users", &data).unwrap();
        // Sorted by resolved name: Email before age
        assert_eq!(sql, "INSERT INTO `users` (`Email`, `age`) VALUES (?, ?)");
        assert_eq!(args, vec![json!("a@b.com"), json!(33)]);
    }

    #[test]
    fn test_insert_only_auto_increment_passes_through_empty() {
        let data = HashMap::from([("id".to_string(), json!(9))]);
        let (sql, args) = builder().build_insert("users", &data).unwrap();
        assert_eq!(sql, "INSERT INTO `users` () VALUES ()");
        assert!(args.is_empty());
    }

    #[test]
    fn test_update_drops_primary_key_and_pins_where() {
        let data = HashMap::from([
            ("id".to_string(), json!(99)),
            ("email".to_string(), json!("x@y.com")),
        ]);
        let (sql, args) = builder().build_update("users", json!(7), &data).unwrap();
        assert_eq!(sql, "UPDATE `users` SET `Email` = ? WHERE `id` = ?");
        assert_eq!(args, vec![json!("x@y.com"), json!(7)]);
    }

    #[test]
    fn test_update_nothing_writable() {
        let data = HashMap::from([("id".to_string(), json!(99))]);
        let err = builder()
            .build_update("users", json!(7), &data)
            .unwrap_err();
        assert_eq!(err, QueryError::NoUpdatableColumns);
    }

    #[test]
    fn test_update_requires_primary_key() {
        let data = HashMap::from([("body".to_string(), json!("hi"))]);
        let err = builder()
            .build_update("notes", json!(1), &data)
            .unwrap_err();
        assert_eq!(err, QueryError::NoPrimaryKey("notes".into()));
    }

    #[test]
    fn test_delete() {
        let (sql, args) = builder().build_delete("users", json!(4)).unwrap();
        assert_eq!(sql, "DELETE FROM `users` WHERE `id` = ?");
        assert_eq!(args, vec![json!(4)]);
    }

    #[test]
    fn test_delete_requires_primary_key() {
        let err = builder().build_delete("notes", json!(1)).unwrap_err();
        assert_eq!(err, QueryError::NoPrimaryKey("notes".into()));
    }

    #[test]
    fn test_dangling_primary_key_override() {
        let mut cache = SchemaCache::new();
        cache.register(
            TableDescriptor::new(
                "ghosts",
                vec![ColumnDescriptor::new("body", ColumnType::Text)],
            )
            .with_primary_key("spirit"),
        );
        let builder = QueryBuilder::new(Arc::new(cache));

        let err = builder.build_delete("ghosts", json!(1)).unwrap_err();
        assert_eq!(
            err,
            QueryError::PrimaryKeyColumnMissing {
                column: "spirit".into(),
                table: "ghosts".into()
            }
        );
    }
}
