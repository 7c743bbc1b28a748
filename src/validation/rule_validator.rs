//! Rule-driven validation
//!
//! Applies operator-configured business rules on top of what the schema
//! already enforces. Rules are indexed by lower-cased table name once at
//! construction; field matching within a table is case-sensitive against
//! the configured key. A rule whose operands don't fit the value's shape
//! (non-numeric min threshold, non-textual regex subject) does not apply:
//! that is a no-op, not a failure.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use regex::Regex;
use serde_json::Value;

use crate::config::{RuleItem, RuleSet, RuleType};
use crate::observability::Logger;

use super::errors::{ValidationError, ValidationErrors};

/// Validates data maps against the configured rule set
pub struct RuleValidator {
    rules: RuleSet,
    // pattern -> compiled regex, or None for patterns that failed to compile
    regex_cache: RwLock<HashMap<String, Option<Arc<Regex>>>>,
}

impl RuleValidator {
    /// Index the rule set by lower-cased table name
    pub fn new(rules: RuleSet) -> Self {
        let mut normalized = RuleSet::with_capacity(rules.len());
        let mut rule_count = 0usize;
        for (table, fields) in rules {
            rule_count += fields.values().map(Vec::len).sum::<usize>();
            normalized.insert(table.to_lowercase(), fields);
        }

        Logger::info(
            "RULESET_INDEXED",
            &[
                ("tables", &normalized.len().to_string()),
                ("rules", &rule_count.to_string()),
            ],
        );

        Self {
            rules: normalized,
            regex_cache: RwLock::new(HashMap::new()),
        }
    }

    /// Run every configured rule for `table` against `data`.
    ///
    /// Tables without configured rules validate trivially.
    pub fn validate(&self, table: &str, data: &HashMap<String, Value>) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        let Some(table_rules) = self.rules.get(&table.to_lowercase()) else {
            return errors;
        };

        // Deterministic field order; rule order within a field is as configured
        let mut fields: Vec<&String> = table_rules.keys().collect();
        fields.sort();

        for field in fields {
            let value = data.get(field.as_str());
            for rule in &table_rules[field] {
                if let Some(error) = self.check_rule(field, value, rule) {
                    errors.push_error(error);
                }
            }
        }

        errors
    }

    fn check_rule(
        &self,
        field: &str,
        value: Option<&Value>,
        rule: &RuleItem,
    ) -> Option<ValidationError> {
        match rule.rule_type {
            RuleType::Required => check_required(field, value, rule),
            RuleType::Regex => self.check_regex(field, value, rule),
            RuleType::Min => check_min(field, value, rule),
            RuleType::Max => check_max(field, value, rule),
            RuleType::Enum => check_enum(field, value, rule),
            RuleType::Length => check_length(field, value, rule),
            RuleType::Unknown => None,
        }
    }

    fn check_regex(
        &self,
        field: &str,
        value: Option<&Value>,
        rule: &RuleItem,
    ) -> Option<ValidationError> {
        let Some(Value::String(text)) = value else {
            return None;
        };
        let pattern = rule.pattern.as_deref()?;
        let regex = self.compiled(pattern)?;
        if regex.is_match(text) {
            None
        } else {
            Some(rule_error(
                field,
                rule,
                format!("'{}' does not match the required pattern", field),
            ))
        }
    }

    /// Compile-or-reuse a pattern from the shared cache.
    ///
    /// A pattern that fails to compile is published as a permanent `None`
    /// entry: the rule never matches and never raises, and the compile is
    /// attempted exactly once across all concurrent callers.
    fn compiled(&self, pattern: &str) -> Option<Arc<Regex>> {
        if let Ok(cache) = self.regex_cache.read() {
            if let Some(entry) = cache.get(pattern) {
                return entry.clone();
            }
        }

        let mut cache = self.regex_cache.write().ok()?;
        // Another caller may have won the race between the locks
        if let Some(entry) = cache.get(pattern) {
            return entry.clone();
        }

        let compiled = Regex::new(pattern).ok().map(Arc::new);
        if compiled.is_none() {
            Logger::warn("RULE_PATTERN_INVALID", &[("pattern", pattern)]);
        }
        cache.insert(pattern.to_string(), compiled.clone());
        compiled
    }
}

fn rule_error(field: &str, rule: &RuleItem, default: String) -> ValidationError {
    let message = rule.message.clone().unwrap_or(default);
    ValidationError::new(field, message)
}

fn check_required(field: &str, value: Option<&Value>, rule: &RuleItem) -> Option<ValidationError> {
    match value {
        None | Some(Value::Null) => {
            Some(rule_error(field, rule, format!("'{}' is required", field)))
        }
        Some(Value::String(text)) if text.trim().is_empty() => {
            Some(rule_error(field, rule, format!("'{}' cannot be empty", field)))
        }
        _ => None,
    }
}

fn check_min(field: &str, value: Option<&Value>, rule: &RuleItem) -> Option<ValidationError> {
    let number = value.and_then(numeric)?;
    let threshold = rule.value.as_ref().and_then(numeric)?;
    if number < threshold {
        Some(rule_error(
            field,
            rule,
            format!("'{}' must be at least {}", field, threshold),
        ))
    } else {
        None
    }
}

fn check_max(field: &str, value: Option<&Value>, rule: &RuleItem) -> Option<ValidationError> {
    let number = value.and_then(numeric)?;
    let threshold = rule.value.as_ref().and_then(numeric)?;
    if number > threshold {
        Some(rule_error(
            field,
            rule,
            format!("'{}' must be at most {}", field, threshold),
        ))
    } else {
        None
    }
}

fn check_enum(field: &str, value: Option<&Value>, rule: &RuleItem) -> Option<ValidationError> {
    let Some(Value::String(text)) = value else {
        return None;
    };
    if rule
        .values
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(text))
    {
        None
    } else {
        Some(rule_error(
            field,
            rule,
            format!("'{}' must be one of: {}", field, rule.values.join(", ")),
        ))
    }
}

fn check_length(field: &str, value: Option<&Value>, rule: &RuleItem) -> Option<ValidationError> {
    let Some(Value::String(text)) = value else {
        return None;
    };
    let max = rule.value.as_ref().and_then(numeric)?;
    if text.chars().count() as f64 > max {
        Some(rule_error(
            field,
            rule,
            format!("'{}' must be at most {} characters", field, max),
        ))
    } else {
        None
    }
}

/// Numeric coercion over the overlapping integer/float JSON representations
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rules_for(field: &str, rules: Vec<RuleItem>) -> RuleSet {
        RuleSet::from([(
            "users".to_string(),
            HashMap::from([(field.to_string(), rules)]),
        )])
    }

    fn data(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_unconfigured_table_validates_trivially() {
        let validator = RuleValidator::new(RuleSet::new());
        let errors = validator.validate("users", &data(&[("email", json!(""))]));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_required_rejects_absent_null_and_blank() {
        let validator = RuleValidator::new(rules_for("email", vec![RuleItem::required()]));

        assert!(validator.validate("users", &data(&[])).has_errors());
        assert!(validator
            .validate("users", &data(&[("email", Value::Null)]))
            .has_errors());
        assert!(validator
            .validate("users", &data(&[("email", json!("   "))]))
            .has_errors());
        assert!(validator
            .validate("users", &data(&[("email", json!("a@b.com"))]))
            .is_empty());
    }

    #[test]
    fn test_field_match_is_case_sensitive() {
        let validator = RuleValidator::new(rules_for("email", vec![RuleItem::required()]));
        // "Email" does not satisfy the rule configured for "email"
        let errors = validator.validate("users", &data(&[("Email", json!("a@b.com"))]));
        assert!(errors.has_errors());
    }

    #[test]
    fn test_table_match_is_case_insensitive() {
        let validator = RuleValidator::new(rules_for("email", vec![RuleItem::required()]));
        let errors = validator.validate("USERS", &data(&[]));
        assert!(errors.has_errors());
    }

    #[test]
    fn test_regex_matches_and_rejects() {
        let validator = RuleValidator::new(rules_for(
            "email",
            vec![RuleItem::regex("^[^@]+@[^@]+$")],
        ));

        assert!(validator
            .validate("users", &data(&[("email", json!("a@b.com"))]))
            .is_empty());
        assert!(validator
            .validate("users", &data(&[("email", json!("nope"))]))
            .has_errors());
    }

    #[test]
    fn test_regex_is_noop_for_absent_or_non_textual() {
        let validator = RuleValidator::new(rules_for("email", vec![RuleItem::regex("^x$")]));

        assert!(validator.validate("users", &data(&[])).is_empty());
        assert!(validator
            .validate("users", &data(&[("email", json!(42))]))
            .is_empty());
    }

    #[test]
    fn test_invalid_pattern_never_raises() {
        let validator = RuleValidator::new(rules_for("email", vec![RuleItem::regex("([unclosed")]));

        for _ in 0..3 {
            let errors = validator.validate("users", &data(&[("email", json!("anything"))]));
            assert!(errors.is_empty());
        }
    }

    #[test]
    fn test_min_and_max() {
        let validator = RuleValidator::new(rules_for(
            "age",
            vec![RuleItem::min(18), RuleItem::max(120)],
        ));

        assert!(validator
            .validate("users", &data(&[("age", json!(17))]))
            .has_errors());
        assert!(validator
            .validate("users", &data(&[("age", json!(121))]))
            .has_errors());
        assert!(validator
            .validate("users", &data(&[("age", json!(42))]))
            .is_empty());
        assert!(validator
            .validate("users", &data(&[("age", json!(18.5))]))
            .is_empty());
    }

    #[test]
    fn test_min_is_noop_for_non_numeric_value() {
        let validator = RuleValidator::new(rules_for("age", vec![RuleItem::min(18)]));
        let errors = validator.validate("users", &data(&[("age", json!("young"))]));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_min_is_noop_for_non_numeric_threshold() {
        let validator = RuleValidator::new(rules_for(
            "age",
            vec![RuleItem::min(json!("eighteen"))],
        ));
        let errors = validator.validate("users", &data(&[("age", json!(3))]));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_enum_is_case_insensitive() {
        let validator = RuleValidator::new(rules_for(
            "status",
            vec![RuleItem::one_of(&["active", "inactive"])],
        ));

        assert!(validator
            .validate("users", &data(&[("status", json!("ACTIVE"))]))
            .is_empty());
        assert!(validator
            .validate("users", &data(&[("status", json!("deleted"))]))
            .has_errors());
    }

    #[test]
    fn test_length_counts_characters() {
        let validator = RuleValidator::new(rules_for("name", vec![RuleItem::length(3)]));

        assert!(validator
            .validate("users", &data(&[("name", json!("äöü"))]))
            .is_empty());
        assert!(validator
            .validate("users", &data(&[("name", json!("abcd"))]))
            .has_errors());
    }

    #[test]
    fn test_custom_message_overrides_default() {
        let validator = RuleValidator::new(rules_for(
            "age",
            vec![RuleItem::min(18).with_message("adults only")],
        ));
        let errors = validator.validate("users", &data(&[("age", json!(3))]));
        assert_eq!(errors.first().unwrap().message, "adults only");
    }

    #[test]
    fn test_rules_apply_in_configured_order() {
        let validator = RuleValidator::new(rules_for(
            "email",
            vec![RuleItem::required(), RuleItem::length(5)],
        ));
        let errors = validator.validate("users", &data(&[("email", json!("toolong"))]));
        assert_eq!(errors.len(), 1);
        assert!(errors.first().unwrap().message.contains("characters"));
    }
}
