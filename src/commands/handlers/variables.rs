//! The extensible `set` command and its built-in extensions.

use tracing::info;

use super::{Command, CommandContext, CommandHandler, CommandResult};
use crate::commands::definitions::{CommandSchema, DefinitionError, SchemaBuilder};
use crate::commands::extension::{Extensible, ExtensionTable};
use crate::commands::invocation::CommandInvocation;
use crate::commands::value::Value;

/// Sets a session variable. Each variable is an extension keyed by its name.
pub struct SetCommand {
    extensions: ExtensionTable,
}

impl SetCommand {
    /// Creates the command with no extensions.
    pub fn new() -> Self {
        Self {
            extensions: ExtensionTable::new("set"),
        }
    }

    /// Creates the command with the built-in variables registered.
    pub fn with_extensions() -> (Self, Vec<DefinitionError>) {
        let mut command = Self::new();
        let errors = register_extensions(&mut command.extensions);
        (command, errors)
    }

    /// Mutable access for registering more variables before installation.
    pub fn extensions_mut(&mut self) -> &mut ExtensionTable {
        &mut self.extensions
    }
}

impl Default for SetCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Extensible for SetCommand {
    fn extensions(&self) -> &ExtensionTable {
        &self.extensions
    }
}

impl Command for SetCommand {
    fn schema(&self) -> SchemaBuilder {
        CommandSchema::builder("set", "Set a session variable")
            .argument("variable", "string", "Variable name")
            .argument("value", "string", "New value")
    }
}

impl CommandHandler for SetCommand {
    fn execute(&self, invocation: &CommandInvocation, ctx: &mut CommandContext<'_>) -> CommandResult {
        if let Some(result) = self.delegate(invocation, ctx) {
            return result;
        }

        let variable = invocation.arg_str("variable").unwrap_or_default();
        let known: Vec<&str> = self.extensions.keys().collect();
        CommandResult::failure(format!(
            "Variable not found: {variable}. Known variables: {}",
            known.join(", ")
        ))
    }
}

/// Registers the built-in `set` extensions.
pub fn register_extensions(table: &mut ExtensionTable) -> Vec<DefinitionError> {
    [
        table.install(PromptVariable),
        table.install(PrintResultsVariable),
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect()
}

/// `set prompt <value>`
pub struct PromptVariable;

impl Command for PromptVariable {
    fn schema(&self) -> SchemaBuilder {
        CommandSchema::builder("prompt", "Prompt shown before each line")
            .usage("set prompt <value>")
            .argument("value", "string(1:32)", "New prompt text")
    }
}

impl CommandHandler for PromptVariable {
    fn execute(&self, invocation: &CommandInvocation, ctx: &mut CommandContext<'_>) -> CommandResult {
        let Some(prompt) = invocation.arg_str("value") else {
            return CommandResult::failure("set prompt: missing value");
        };
        ctx.options.prompt = prompt.to_string();
        info!(prompt = %prompt, "prompt changed");
        CommandResult::success(format!("prompt = {prompt}"))
    }
}

/// `set print_results <bool>`
pub struct PrintResultsVariable;

impl Command for PrintResultsVariable {
    fn schema(&self) -> SchemaBuilder {
        CommandSchema::builder("print_results", "Print each method result in cm")
            .usage("set print_results <bool>")
            .argument("enabled", "bool", "on or off")
    }
}

impl CommandHandler for PrintResultsVariable {
    fn execute(&self, invocation: &CommandInvocation, ctx: &mut CommandContext<'_>) -> CommandResult {
        let Some(enabled) = invocation.argument("enabled").and_then(Value::as_bool) else {
            return CommandResult::failure("set print_results: missing value");
        };
        ctx.options.print_results = enabled;
        info!(enabled, "print_results changed");
        CommandResult::success(format!("print_results = {enabled}"))
    }
}
