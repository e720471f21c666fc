//! Configuration management for nodeshell.
//!
//! Handles loading interpreter preferences from a TOML file. A missing file means
//! defaults; a malformed one is an error naming the file.

use crate::error::{NodeshellError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for nodeshell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Interpreter preferences.
    #[serde(default)]
    pub interpreter: InterpreterOptions,
}

/// Preferences the interpreter reads at runtime. `set` can change them per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpreterOptions {
    /// Prompt shown by the REPL.
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Whether `cm` prints each step's result.
    #[serde(default = "default_print_results")]
    pub print_results: bool,

    /// Target path selected at startup.
    #[serde(default)]
    pub start_path: Option<String>,
}

fn default_prompt() -> String {
    "> ".to_string()
}

fn default_print_results() -> bool {
    true
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            print_results: default_print_results(),
            start_path: None,
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nodeshell")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| NodeshellError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            NodeshellError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }
}
