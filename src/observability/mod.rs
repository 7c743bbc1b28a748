//! Structured logging for sqlgate
//!
//! Logging is read-only with respect to execution: no side effects on
//! validation or query construction, no async machinery, deterministic
//! output.

mod logger;

pub use logger::{Logger, Severity};
