//! System command handlers (help, echo, quit).

use std::fmt::Write as _;

use super::{Command, CommandContext, CommandHandler, CommandResult};
use crate::commands::definitions::{CommandSchema, SchemaBuilder};
use crate::commands::invocation::CommandInvocation;
use crate::commands::output::ControlAction;
use crate::commands::value::Value;

/// Lists commands, or shows detailed help for one.
pub struct HelpCommand;

impl Command for HelpCommand {
    fn schema(&self) -> SchemaBuilder {
        CommandSchema::builder("help", "Show available commands or help for one command")
            .usage("help [command]")
    }
}

impl CommandHandler for HelpCommand {
    fn execute(&self, invocation: &CommandInvocation, ctx: &mut CommandContext<'_>) -> CommandResult {
        let registry = ctx.registry;

        if let Some(name) = invocation.raw.first() {
            let Some(entry) = registry.get(name) else {
                return CommandResult::failure(format!("No help for unknown command: {name}"));
            };
            let mut text = entry.schema.help_text();
            let aliases = registry.aliases_of(&entry.schema.name);
            if !aliases.is_empty() {
                let _ = write!(text, "\nAliases: {}", aliases.join(", "));
            }
            return CommandResult::success(text);
        }

        let mut text = String::from("Commands:");
        for schema in registry.schemas() {
            let _ = write!(text, "\n  {:<8} {}", schema.name, schema.description);
            let aliases = registry.aliases_of(&schema.name);
            if !aliases.is_empty() {
                let _ = write!(text, " (alias: {})", aliases.join(", "));
            }
        }
        text.push_str("\n\nType help <command> for details.");
        CommandResult::success(text)
    }
}

/// Prints its arguments back.
pub struct EchoCommand;

impl Command for EchoCommand {
    fn schema(&self) -> SchemaBuilder {
        CommandSchema::builder("echo", "Print text back")
            .argument("text", "string...", "Words to print")
            .flag("-upper", "Print in upper case")
            .option("-repeat", Some("int(1:100)"), "Number of lines to print", 1i64)
    }
}

impl CommandHandler for EchoCommand {
    fn execute(&self, invocation: &CommandInvocation, _ctx: &mut CommandContext<'_>) -> CommandResult {
        let words: Vec<&str> = invocation
            .argument("text")
            .and_then(Value::as_list)
            .unwrap_or_default()
            .iter()
            .filter_map(Value::as_str)
            .collect();

        let mut line = words.join(" ");
        if invocation.flag("-upper") {
            line = line.to_uppercase();
        }

        let repeat = invocation.option_int("-repeat").unwrap_or(1).max(1) as usize;
        CommandResult::success(vec![line; repeat].join("\n"))
    }
}

/// Ends the session.
pub struct QuitCommand;

impl Command for QuitCommand {
    fn schema(&self) -> SchemaBuilder {
        CommandSchema::builder("quit", "Exit the interpreter")
    }
}

impl CommandHandler for QuitCommand {
    fn execute(&self, _invocation: &CommandInvocation, _ctx: &mut CommandContext<'_>) -> CommandResult {
        CommandResult::success("Goodbye.").with_action(ControlAction::Exit)
    }
}
