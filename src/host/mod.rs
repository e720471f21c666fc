//! Host boundary.
//!
//! The objects a user navigates and invokes methods on are owned by the embedding
//! host, never by the interpreter. The interpreter only holds [`ObjectId`] handles
//! and must ask the host whether a handle is still live before every use.

pub mod tree;

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::commands::value::Value;

pub use tree::NodeTree;

/// Handle to a host-owned object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<object#{}>", self.0)
    }
}

/// Errors a host reports from a method invocation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvokeError {
    /// The method does not exist on the receiver.
    #[error("method '{0}' not found")]
    NotFound(String),

    /// The arguments did not match what the method expects.
    #[error("invalid arguments for '{method}': {reason}")]
    InvalidArguments { method: String, reason: String },

    /// The method ran and failed.
    #[error("{0}")]
    Failed(String),
}

impl InvokeError {
    /// Creates an invalid arguments error.
    pub fn invalid_args(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            method: method.into(),
            reason: reason.into(),
        }
    }
}

/// Capability interface the interpreter uses to reach host objects.
pub trait Host {
    /// The well-known root object.
    fn root(&self) -> ObjectId;

    /// Whether `id` still refers to a live object.
    fn is_live(&self, id: ObjectId) -> bool;

    /// Resolves `path` relative to `from`. Absolute paths ignore `from`.
    fn resolve(&self, from: ObjectId, path: &str) -> Option<ObjectId>;

    /// Whether `method` can be called on `id`.
    fn has_method(&self, id: ObjectId, method: &str) -> bool;

    /// Calls `method` on `id` with already-coerced arguments.
    fn invoke(&mut self, id: ObjectId, method: &str, args: &[Value])
        -> Result<Value, InvokeError>;

    /// Human-readable description of an object, used in messages.
    fn describe(&self, id: ObjectId) -> String {
        id.to_string()
    }

    /// Renders a value for display, describing object handles through the host.
    fn render(&self, value: &Value) -> String {
        match value {
            Value::Object(id) => self.describe(*id),
            Value::List(items) => {
                let items: Vec<String> = items.iter().map(|v| self.render(v)).collect();
                format!("[{}]", items.join(", "))
            }
            other => other.to_string(),
        }
    }
}
