//! Validation orchestration
//!
//! One front door over both validators. Schema findings always precede rule
//! findings; the two entry points differ only in how many errors they
//! surface, never in what they check.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::config::ValidationConfig;
use crate::observability::Logger;
use crate::schema::SchemaCache;

use super::errors::{ValidationError, ValidationErrors};
use super::rule_validator::RuleValidator;
use super::schema_validator::{Operation, SchemaValidator};

/// Orchestrates schema-based and rule-based validation
pub struct ValidationManager {
    enabled: bool,
    schema_validator: SchemaValidator,
    rule_validator: RuleValidator,
}

impl ValidationManager {
    /// Build the manager from configuration and a shared schema snapshot
    pub fn new(config: ValidationConfig, cache: Arc<SchemaCache>) -> Self {
        if !config.enabled {
            Logger::warn("VALIDATION_DISABLED", &[]);
        }
        Self {
            enabled: config.enabled,
            schema_validator: SchemaValidator::new(cache, config.strict_mode),
            rule_validator: RuleValidator::new(config.rules),
        }
    }

    /// Whether validation is active
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Fail-fast entry point: only the first error across both validators,
    /// schema errors checked before rule errors.
    pub fn validate(
        &self,
        table: &str,
        data: &HashMap<String, Value>,
        operation: Operation,
    ) -> Result<(), ValidationError> {
        if !self.enabled {
            return Ok(());
        }
        match self.collect(table, data, operation).into_first() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Collect-all entry point: the full concatenation, schema errors first
    pub fn validate_all(
        &self,
        table: &str,
        data: &HashMap<String, Value>,
        operation: Operation,
    ) -> ValidationErrors {
        if !self.enabled {
            return ValidationErrors::new();
        }
        self.collect(table, data, operation)
    }

    fn collect(
        &self,
        table: &str,
        data: &HashMap<String, Value>,
        operation: Operation,
    ) -> ValidationErrors {
        let mut errors = self.schema_validator.validate(table, data, operation);
        errors.extend(self.rule_validator.validate(table, data));
        errors
    }
}
