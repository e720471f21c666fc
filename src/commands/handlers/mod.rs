//! Command handlers for nodeshell.
//!
//! Each built-in command is a small type that declares its schema and runs
//! against a [`CommandContext`]. Handlers never panic on user input; every
//! problem comes back as a failed [`CommandResult`].

pub mod system;
pub mod target;
pub mod variables;

use tracing::warn;

use super::definitions::{DefinitionError, SchemaBuilder};
use super::invocation::CommandInvocation;
use super::registry::CommandRegistry;
use crate::config::InterpreterOptions;
use crate::host::Host;
use crate::target::TargetEngine;

pub use super::output::CommandResult;

/// Context provided to command handlers.
pub struct CommandContext<'a> {
    /// Registered commands, for help and lookups.
    pub registry: &'a CommandRegistry,
    /// Owner of the objects the session navigates.
    pub host: &'a mut dyn Host,
    /// Current target of this session.
    pub target: &'a mut TargetEngine,
    /// Session preferences.
    pub options: &'a mut InterpreterOptions,
}

/// Executes a bound invocation.
pub trait CommandHandler: Send + Sync {
    fn execute(&self, invocation: &CommandInvocation, ctx: &mut CommandContext<'_>)
        -> CommandResult;
}

/// A handler that also declares its own schema.
pub trait Command: CommandHandler {
    fn schema(&self) -> SchemaBuilder;
}

/// Handler backed by a closure.
pub struct FnHandler<F>(F);

impl<F> CommandHandler for FnHandler<F>
where
    F: Fn(&CommandInvocation, &mut CommandContext<'_>) -> CommandResult + Send + Sync,
{
    fn execute(
        &self,
        invocation: &CommandInvocation,
        ctx: &mut CommandContext<'_>,
    ) -> CommandResult {
        (self.0)(invocation, ctx)
    }
}

/// Wraps a closure as a handler.
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&CommandInvocation, &mut CommandContext<'_>) -> CommandResult + Send + Sync,
{
    FnHandler(f)
}

/// Installs every built-in command and alias.
///
/// A command whose definition fails to build is skipped; the errors are logged
/// and returned so the caller can surface them.
pub fn register_all(registry: &mut CommandRegistry) -> Vec<DefinitionError> {
    let mut diagnostics = Vec::new();

    let (set, extension_errors) = variables::SetCommand::with_extensions();
    diagnostics.extend(extension_errors);

    let results = [
        registry.install(system::HelpCommand),
        registry.install(system::EchoCommand),
        registry.install(system::QuitCommand),
        registry.install(target::CnCommand),
        registry.install(target::CmCommand),
        registry.install(set),
    ];
    diagnostics.extend(results.into_iter().filter_map(|r| r.err()));

    registry.add_alias("exit", "quit");

    for error in &diagnostics {
        warn!(error = %error, "skipping command definition");
    }
    diagnostics
}
