//! Bound command invocations.

use std::collections::HashMap;

use super::value::Value;

/// A command whose input tokens have been bound and coerced against its schema.
///
/// Every declared option is present: either from the input or its default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandInvocation {
    /// Command name.
    pub command: String,
    /// Argument name to value.
    pub arguments: HashMap<String, Value>,
    /// Option flag to value.
    pub options: HashMap<String, Value>,
    /// Tokens after the command name, as typed.
    pub raw: Vec<String>,
    /// Text after the command name, before tokenizing.
    pub line: String,
}

impl CommandInvocation {
    /// Returns a bound argument.
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }

    /// Returns a bound argument as a string.
    pub fn arg_str(&self, name: &str) -> Option<&str> {
        self.argument(name).and_then(Value::as_str)
    }

    /// Returns an option value.
    pub fn option(&self, flag: &str) -> Option<&Value> {
        self.options.get(flag)
    }

    /// Returns an option as a boolean, `false` when absent or not boolean.
    pub fn flag(&self, flag: &str) -> bool {
        self.option(flag).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Returns an option as an integer.
    pub fn option_int(&self, flag: &str) -> Option<i64> {
        self.option(flag).and_then(Value::as_int)
    }

    /// Returns an option as a float.
    pub fn option_float(&self, flag: &str) -> Option<f64> {
        self.option(flag).and_then(Value::as_float)
    }
}
