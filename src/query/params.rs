//! Structured query parameters
//!
//! The decoded form of a read request: requested fields, filters, sorting,
//! pagination. Built by the transport layer from query strings or request
//! bodies, then treated as an immutable value here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Filter comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOperator {
    /// Equals
    #[serde(rename = "eq")]
    Eq,

    /// Not equals
    #[serde(rename = "neq")]
    Neq,

    /// Greater than
    #[serde(rename = "gt")]
    Gt,

    /// Greater than or equal
    #[serde(rename = "gte")]
    Gte,

    /// Less than
    #[serde(rename = "lt")]
    Lt,

    /// Less than or equal
    #[serde(rename = "lte")]
    Lte,

    /// Pattern match
    #[serde(rename = "like")]
    Like,

    /// Negated pattern match
    #[serde(rename = "nlike")]
    NotLike,

    /// Value in list
    #[serde(rename = "in")]
    In,

    /// Value not in list
    #[serde(rename = "nin")]
    NotIn,
}

impl FilterOperator {
    /// Get the operator token used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Like => "like",
            FilterOperator::NotLike => "nlike",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "nin",
        }
    }

    /// Parse a wire token; unrecognized tokens fall back to equality
    pub fn parse(token: &str) -> Self {
        match token {
            "eq" => FilterOperator::Eq,
            "neq" => FilterOperator::Neq,
            "gt" => FilterOperator::Gt,
            "gte" => FilterOperator::Gte,
            "lt" => FilterOperator::Lt,
            "lte" => FilterOperator::Lte,
            "like" => FilterOperator::Like,
            "nlike" => FilterOperator::NotLike,
            "in" => FilterOperator::In,
            "nin" => FilterOperator::NotIn,
            _ => FilterOperator::Eq,
        }
    }
}

/// A single filter condition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filter {
    /// Field to filter on (resolved case-insensitively against the schema)
    pub field: String,

    /// Comparison operator
    pub operator: FilterOperator,

    /// Comparison value for unary operators
    #[serde(default)]
    pub value: Value,

    /// Ordered values for `in`/`nin`
    #[serde(default)]
    pub values: Vec<Value>,
}

impl Filter {
    /// Create a filter with a single comparison value
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
            values: Vec::new(),
        }
    }

    /// Create an equality filter
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, FilterOperator::Eq, value)
    }

    /// Create an "in list" filter
    pub fn in_list(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            field: field.into(),
            operator: FilterOperator::In,
            value: Value::Null,
            values,
        }
    }

    /// Create a "not in list" filter
    pub fn not_in_list(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            operator: FilterOperator::NotIn,
            ..Self::in_list(field, values)
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse a direction token; anything other than "desc" sorts ascending
    pub fn parse(token: &str) -> Self {
        if token.eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

/// A sort request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sorting {
    /// Field to sort by
    pub field: String,

    /// Direction
    pub direction: SortDirection,
}

impl Sorting {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Pagination window; zero means unset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub limit: u64,

    #[serde(default)]
    pub offset: u64,
}

impl Pagination {
    pub fn new(limit: u64, offset: u64) -> Self {
        Self { limit, offset }
    }
}

/// The full decoded read request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryParams {
    /// Requested fields; empty means all columns
    #[serde(default)]
    pub fields: Vec<String>,

    /// Filters, applied in order with AND semantics
    #[serde(default)]
    pub filters: Vec<Filter>,

    /// Optional sort
    #[serde(default)]
    pub sorting: Option<Sorting>,

    /// Optional pagination window
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl QueryParams {
    /// Empty parameters: all columns, no filters, no sort, no pagination
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the selected fields
    pub fn with_fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| (*f).to_string()).collect();
        self
    }

    /// Append a filter
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set the sort
    pub fn with_sorting(mut self, sorting: Sorting) -> Self {
        self.sorting = Some(sorting);
        self
    }

    /// Set the pagination window
    pub fn with_pagination(mut self, limit: u64, offset: u64) -> Self {
        self.pagination = Some(Pagination::new(limit, offset));
        self
    }
}
