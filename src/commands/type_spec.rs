//! Type descriptors for command slots.
//!
//! A descriptor has the form `name[(min:max)][...]`, for example `int`, `int(0:10)`,
//! `float(5.5:10.5)...` or a union such as `int(0:10)|string`.

use std::fmt;

use thiserror::Error;

use super::value::Value;

/// Errors produced while parsing a type descriptor.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TypeSpecError {
    /// Descriptor was empty.
    #[error("empty type descriptor")]
    Empty,

    /// Type name is not in the table of known types.
    #[error("unknown type '{0}'")]
    UnknownType(String),

    /// Parentheses are unbalanced or misplaced.
    #[error("malformed type descriptor '{0}'")]
    Malformed(String),

    /// A range bound is not a number.
    #[error("invalid range bound '{bound}' in '{spec}'")]
    InvalidBound { spec: String, bound: String },

    /// The upper bound was left out, as in `int(0:)`.
    #[error("missing upper bound in '{0}'")]
    MissingUpperBound(String),

    /// The lower bound is greater than the upper bound.
    #[error("lower bound exceeds upper bound in '{0}'")]
    InvertedRange(String),

    /// A range was attached to a type that does not support one.
    #[error("type '{0}' does not accept a range")]
    RangeNotSupported(String),
}

/// Known type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Signed integer.
    Int,
    /// Floating point number.
    Float,
    /// Free text. A range bounds its length in characters.
    String,
    /// Boolean (`true/false`, `on/off`, `yes/no`, `1/0`).
    Bool,
    /// One of the values listed on the slot definition.
    Choice,
}

impl TypeKind {
    /// Looks up a type name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "string" => Some(Self::String),
            "bool" => Some(Self::Bool),
            "choice" => Some(Self::Choice),
            _ => None,
        }
    }

    /// Returns the descriptor name of this type.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Bool => "bool",
            Self::Choice => "choice",
        }
    }

    /// Whether a `(min:max)` range may be attached.
    pub fn supports_range(&self) -> bool {
        matches!(self, Self::Int | Self::Float | Self::String)
    }
}

/// One accepted shape for a value slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeSpec {
    pub kind: TypeKind,
    pub min: f64,
    pub max: f64,
    pub is_array: bool,
}

impl TypeSpec {
    /// Returns the type name.
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// `min = max = 0` means no range was declared.
    pub fn has_range(&self) -> bool {
        !(self.min == 0.0 && self.max == 0.0)
    }

    /// Parses a single descriptor.
    pub fn parse(spec: &str) -> Result<Self, TypeSpecError> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(TypeSpecError::Empty);
        }

        let (body, is_array) = match spec.strip_suffix("...") {
            Some(body) => (body, true),
            None => (spec, false),
        };

        let (name, range) = match body.find('(') {
            None => (body, None),
            Some(open) => {
                let inner = body[open + 1..]
                    .strip_suffix(')')
                    .filter(|inner| !inner.contains(['(', ')']))
                    .ok_or_else(|| TypeSpecError::Malformed(spec.to_string()))?;
                (&body[..open], Some(inner.trim()))
            }
        };

        if name.contains(')') {
            return Err(TypeSpecError::Malformed(spec.to_string()));
        }

        let kind =
            TypeKind::from_name(name).ok_or_else(|| TypeSpecError::UnknownType(name.to_string()))?;

        let (min, max) = match range {
            None | Some("") => (0.0, 0.0),
            Some(inner) => parse_range(spec, kind, inner)?,
        };

        Ok(Self {
            kind,
            min,
            max,
            is_array,
        })
    }

    /// Coerces one textual value against this spec, ignoring the array flag.
    ///
    /// `choices` lists the accepted values for `choice` slots.
    pub fn coerce_scalar(&self, text: &str, choices: &[String]) -> Option<Value> {
        match self.kind {
            TypeKind::Int => {
                let n: i64 = text.parse().ok()?;
                self.within(n as f64).then_some(Value::Int(n))
            }
            TypeKind::Float => {
                let n: f64 = text.parse().ok()?;
                (n.is_finite() && self.within(n)).then_some(Value::Float(n))
            }
            TypeKind::String => {
                let len = text.chars().count() as f64;
                self.within(len).then(|| Value::String(text.to_string()))
            }
            TypeKind::Bool => parse_bool(text).map(Value::Bool),
            TypeKind::Choice => choices
                .iter()
                .any(|c| c == text)
                .then(|| Value::String(text.to_string())),
        }
    }

    fn within(&self, n: f64) -> bool {
        !self.has_range() || (self.min..=self.max).contains(&n)
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        if self.has_range() {
            write!(f, "({}:{})", self.min, self.max)?;
        }
        if self.is_array {
            write!(f, "...")?;
        }
        Ok(())
    }
}

fn parse_range(spec: &str, kind: TypeKind, inner: &str) -> Result<(f64, f64), TypeSpecError> {
    if !kind.supports_range() {
        return Err(TypeSpecError::RangeNotSupported(kind.name().to_string()));
    }

    let (lo, hi) = inner
        .split_once(':')
        .ok_or_else(|| TypeSpecError::Malformed(spec.to_string()))?;
    let (lo, hi) = (lo.trim(), hi.trim());

    let bound = |text: &str| {
        text.parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| TypeSpecError::InvalidBound {
                spec: spec.to_string(),
                bound: text.to_string(),
            })
    };

    let min = if lo.is_empty() { 0.0 } else { bound(lo)? };

    // Open upper bounds are rejected while an open lower bound defaults to 0.
    if hi.is_empty() {
        return Err(TypeSpecError::MissingUpperBound(spec.to_string()));
    }
    let max = bound(hi)?;

    if min > max {
        return Err(TypeSpecError::InvertedRange(spec.to_string()));
    }

    Ok((min, max))
}

/// Parses the boolean spellings accepted on the command line.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// An ordered union of type specs for one slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeUnion {
    specs: Vec<TypeSpec>,
}

impl TypeUnion {
    /// Parses a `|`-separated descriptor.
    ///
    /// Failing alternatives are dropped and returned alongside the union so the
    /// caller can report them. The union is empty when every alternative failed.
    pub fn parse(descriptor: &str) -> (Self, Vec<TypeSpecError>) {
        let mut specs = Vec::new();
        let mut errors = Vec::new();

        for alternative in descriptor.split('|') {
            match TypeSpec::parse(alternative) {
                Ok(spec) => specs.push(spec),
                Err(e) => errors.push(e),
            }
        }

        (Self { specs }, errors)
    }

    pub fn specs(&self) -> &[TypeSpec] {
        &self.specs
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Whether any alternative is an array.
    pub fn has_array(&self) -> bool {
        self.specs.iter().any(|s| s.is_array)
    }

    /// Whether any alternative is a `choice`.
    pub fn has_choice(&self) -> bool {
        self.specs.iter().any(|s| s.kind == TypeKind::Choice)
    }
}

impl fmt::Display for TypeUnion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, spec) in self.specs.iter().enumerate() {
            if i > 0 {
                write!(f, "|")?;
            }
            write!(f, "{spec}")?;
        }
        Ok(())
    }
}
