//! Request data validation
//!
//! Two independently sourced constraint systems with deterministic
//! precedence: schema-derived checks (types, nullability, unknown columns)
//! run before operator-configured rules (required, regex, min, max, enum,
//! length). Both report field-addressable errors; the manager decides
//! whether callers see the first or all of them.

mod errors;
mod manager;
mod rule_validator;
mod schema_validator;

pub use errors::{ValidationError, ValidationErrors, TABLE_FIELD};
pub use manager::ValidationManager;
pub use rule_validator::RuleValidator;
pub use schema_validator::{Operation, SchemaValidator};
