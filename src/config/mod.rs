//! Validation configuration
//!
//! Declarative, per-table-per-field business rules plus the two validation
//! flags. Configuration is loaded once (from a JSON document or built in
//! code) and immutable for the process lifetime; a malformed document is a
//! construction-time error, never a per-request concern.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// table -> field -> ordered rule list
pub type RuleSet = HashMap<String, HashMap<String, Vec<RuleItem>>>;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for the expected shape
    #[error("malformed config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Rule kinds; unrecognized kinds deserialize to [`RuleType::Unknown`] and
/// are skipped by the rule validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    /// Value must be present, non-null, and (for strings) non-blank
    Required,
    /// String value must match a configured pattern
    Regex,
    /// Numeric value must be at least the threshold
    Min,
    /// Numeric value must be at most the threshold
    Max,
    /// String value must equal one of the allowed values
    Enum,
    /// String value must not exceed the threshold in characters
    Length,
    /// Forward-compatible catch-all
    #[serde(other)]
    Unknown,
}

/// One configured rule for a (table, field) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleItem {
    /// Rule kind
    #[serde(rename = "type")]
    pub rule_type: RuleType,

    /// Pattern for `regex` rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Numeric threshold for `min`/`max`/`length` rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// Ordered allowed values for `enum` rules
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,

    /// Overrides the default error wording
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RuleItem {
    fn base(rule_type: RuleType) -> Self {
        Self {
            rule_type,
            pattern: None,
            value: None,
            values: Vec::new(),
            message: None,
        }
    }

    /// A `required` rule
    pub fn required() -> Self {
        Self::base(RuleType::Required)
    }

    /// A `regex` rule with the given pattern
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            ..Self::base(RuleType::Regex)
        }
    }

    /// A `min` rule with the given numeric threshold
    pub fn min(threshold: impl Into<Value>) -> Self {
        Self {
            value: Some(threshold.into()),
            ..Self::base(RuleType::Min)
        }
    }

    /// A `max` rule with the given numeric threshold
    pub fn max(threshold: impl Into<Value>) -> Self {
        Self {
            value: Some(threshold.into()),
            ..Self::base(RuleType::Max)
        }
    }

    /// An `enum` rule with the given allowed values
    pub fn one_of(values: &[&str]) -> Self {
        Self {
            values: values.iter().map(|v| (*v).to_string()).collect(),
            ..Self::base(RuleType::Enum)
        }
    }

    /// A `length` rule with the given character limit
    pub fn length(max: u64) -> Self {
        Self {
            value: Some(Value::from(max)),
            ..Self::base(RuleType::Length)
        }
    }

    /// Replace the default error wording
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

fn default_enabled() -> bool {
    true
}

fn default_strict_mode() -> bool {
    true
}

/// Validation settings: the enable switch, strict mode, and the rule set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Disabled turns every validation call into a no-op success
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Strict mode turns unknown input fields into hard errors
    #[serde(default = "default_strict_mode")]
    pub strict_mode: bool,

    /// Per-table, per-field rule lists
    #[serde(default)]
    pub rules: RuleSet,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strict_mode: true,
            rules: RuleSet::new(),
        }
    }
}

impl ValidationConfig {
    /// Load the configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}
