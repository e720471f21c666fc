//! Error types for nodeshell.
//!
//! Defines the application-level error enum. Layer-specific errors (type specs,
//! dispatch, target changes, method chains) live next to the code that raises them
//! and convert into this type where they cross into the application.

use thiserror::Error;

use crate::commands::definitions::DefinitionError;

/// Main error type for nodeshell operations.
#[derive(Error, Debug)]
pub enum NodeshellError {
    /// Command definition errors (malformed type specs, invalid slots, etc.)
    #[error("Definition error: {0}")]
    Definition(#[from] DefinitionError),

    /// Configuration errors (invalid config file, unreadable path, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Host errors (start path missing, root not live, etc.)
    #[error("Host error: {0}")]
    Host(String),
}

impl NodeshellError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a host error with the given message.
    pub fn host(msg: impl Into<String>) -> Self {
        Self::Host(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Definition(_) => "Definition Error",
            Self::Config(_) => "Configuration Error",
            Self::Host(_) => "Host Error",
        }
    }
}

/// Result type alias using NodeshellError.
pub type Result<T> = std::result::Result<T, NodeshellError>;
