//! Method chain parsing.
//!
//! A chain is a dotted sequence of calls such as `get_child(0).get_meta("hp")`.
//! Dots inside parentheses or quotes do not split, so `scale(1.5)` stays whole.

use std::sync::LazyLock;

use regex::Regex;

use super::ChainError;
use crate::commands::value::Value;

static CALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*(?:\((.*)\))?$").expect("method call pattern is valid")
});

/// One call in a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCallStep {
    pub method: String,
    pub args: Vec<Value>,
}

impl MethodCallStep {
    /// Parses `name`, `name()` or `name(arg, ...)`.
    pub fn parse(segment: &str) -> Result<Self, ChainError> {
        let segment = segment.trim();
        let caps = CALL_RE
            .captures(segment)
            .ok_or_else(|| ChainError::Malformed(segment.to_string()))?;

        let method = caps[1].to_string();
        let args = match caps.get(2) {
            Some(list) => split_top_level(list.as_str(), ',')
                .ok_or_else(|| ChainError::Malformed(segment.to_string()))?
                .iter()
                .map(|arg| Value::from_literal(arg))
                .collect(),
            None => Vec::new(),
        };

        Ok(Self { method, args })
    }
}

/// Splits a chain into call segments, dropping empty ones.
pub fn split_chain(input: &str) -> Result<Vec<String>, ChainError> {
    split_top_level(input, '.').ok_or_else(|| ChainError::Malformed(input.trim().to_string()))
}

/// Splits on `separator` outside quotes and parentheses, trimming and dropping
/// empty pieces. Returns `None` when quotes or parentheses are unbalanced.
fn split_top_level(text: &str, separator: char) -> Option<Vec<String>> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut depth: usize = 0;
    let mut quote: Option<char> = None;

    for c in text.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => {
                quote = None;
                current.push(c);
            }
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                current.push(c);
            }
            (None, '(') => {
                depth += 1;
                current.push(c);
            }
            (None, ')') => {
                depth = depth.checked_sub(1)?;
                current.push(c);
            }
            (None, c) if c == separator && depth == 0 => {
                pieces.push(std::mem::take(&mut current));
            }
            (None, c) => current.push(c),
        }
    }

    if quote.is_some() || depth != 0 {
        return None;
    }
    pieces.push(current);

    Some(
        pieces
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect(),
    )
}
