//! Transport-agnostic command output types.
//!
//! A [`CommandResult`] is the terminal outcome of one dispatch. The REPL prints
//! it as text, `--output json` serializes it, and embedding hosts can inspect it
//! directly.

use serde::Serialize;

/// Outcome of executing a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,
    /// Human-readable message; may be empty.
    pub message: String,
    /// Optional request for the front-end.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ControlAction>,
}

/// Control actions that affect the front-end rather than the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlAction {
    /// Exit the application.
    Exit,
}

impl CommandResult {
    /// Creates a successful result.
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            success: true,
            message: msg.into(),
            action: None,
        }
    }

    /// Creates a failed result.
    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            message: msg.into(),
            action: None,
        }
    }

    /// Attaches a control action.
    pub fn with_action(self, action: ControlAction) -> Self {
        Self {
            action: Some(action),
            ..self
        }
    }

    /// Whether the front-end should exit.
    pub fn is_exit(&self) -> bool {
        self.action == Some(ControlAction::Exit)
    }
}
