//! Extension delegation for commands whose first argument can select a sub-handler.
//!
//! An extensible command owns an [`ExtensionTable`]. Extensions are registered
//! explicitly during startup; at dispatch time the first remaining token is looked
//! up in the table and, on a match, the extension handles the rest of the line.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use super::definitions::{CommandSchema, DefinitionError};
use super::handlers::{Command, CommandContext, CommandHandler};
use super::invocation::CommandInvocation;
use super::output::CommandResult;
use super::registry::RegisteredCommand;
use super::router::CommandRouter;

/// Extensions registered under one command, keyed by their first token.
#[derive(Debug, Default)]
pub struct ExtensionTable {
    command: String,
    entries: BTreeMap<String, RegisteredCommand>,
}

impl ExtensionTable {
    /// Creates an empty table for `command`.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            entries: BTreeMap::new(),
        }
    }

    /// The command this table extends.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Registers an extension under its schema name. Replaces an existing key.
    pub fn register(&mut self, schema: CommandSchema, handler: Arc<dyn CommandHandler>) {
        let key = schema.name.clone();
        if self.entries.contains_key(&key) {
            warn!(command = %self.command, extension = %key, "replacing extension");
        }
        debug!(command = %self.command, extension = %key, "registered extension");
        self.entries.insert(
            key,
            RegisteredCommand {
                schema: Arc::new(schema),
                handler,
            },
        );
    }

    /// Builds a declarative extension's schema and registers it.
    pub fn install<C: Command + 'static>(&mut self, extension: C) -> Result<(), DefinitionError> {
        let schema = extension.schema().build()?;
        self.register(schema, Arc::new(extension));
        Ok(())
    }

    /// Looks up an extension by key.
    pub fn get(&self, key: &str) -> Option<&RegisteredCommand> {
        self.entries.get(key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Mixed into handlers that accept extensions.
pub trait Extensible {
    fn extensions(&self) -> &ExtensionTable;

    /// Hands the invocation to the extension named by its first raw token.
    ///
    /// Returns `None` when no extension matches, so the caller runs its own logic.
    /// The extension's schema is bound against the tokens after the key and its
    /// result is returned unchanged.
    fn delegate(
        &self,
        invocation: &CommandInvocation,
        ctx: &mut CommandContext<'_>,
    ) -> Option<CommandResult> {
        let (key, rest) = invocation.raw.split_first()?;
        let extension = self.extensions().get(key)?;

        debug!(
            command = %invocation.command,
            extension = %key,
            remaining = rest.len(),
            "delegating to extension"
        );
        let result = match CommandRouter::bind(&extension.schema, rest) {
            Ok(bound) => extension.handler.execute(&bound, ctx),
            Err(e) => CommandResult::failure(format!("{} {}", invocation.command, e)),
        };
        Some(result)
    }
}
