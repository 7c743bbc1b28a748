//! Parameterized SQL assembly
//!
//! A statement is an ordered sequence of SQL fragments plus a parallel
//! ordered sequence of bound arguments, joined at the end. Identifier text
//! enters SQL through [`quote_identifier`] and nowhere else; values enter
//! only as `?` placeholders paired with bound arguments.

use serde_json::Value;

/// Quote an identifier for the MySQL dialect.
///
/// Embedded backticks are doubled, so caller-supplied identifier text can
/// never terminate the quoting.
pub fn quote_identifier(name: &str) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('`');
    for c in name.chars() {
        if c == '`' {
            quoted.push_str("``");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('`');
    quoted
}

/// `?` placeholders for a list of n bound values
pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Accumulates SQL fragments and bound arguments in parallel order
#[derive(Debug, Default)]
pub struct StatementBuilder {
    fragments: Vec<String>,
    args: Vec<Value>,
}

impl StatementBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a SQL fragment
    pub fn push(&mut self, fragment: impl Into<String>) -> &mut Self {
        self.fragments.push(fragment.into());
        self
    }

    /// Bind an argument for the next unbound placeholder
    pub fn bind(&mut self, arg: Value) -> &mut Self {
        self.args.push(arg);
        self
    }

    /// Join fragments with single spaces and hand back the argument list
    pub fn finish(self) -> (String, Vec<Value>) {
        (self.fragments.join(" "), self.args)
    }
}
