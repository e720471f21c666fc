//! Command registry.
//!
//! Maps command names to their schema and handler. Built once at startup, then
//! shared read-only behind an `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use super::definitions::{CommandSchema, DefinitionError};
use super::handlers::{Command, CommandHandler};

/// A registered command.
#[derive(Clone)]
pub struct RegisteredCommand {
    pub schema: Arc<CommandSchema>,
    pub handler: Arc<dyn CommandHandler>,
}

impl std::fmt::Debug for RegisteredCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredCommand")
            .field("schema", &self.schema.name)
            .finish_non_exhaustive()
    }
}

/// Registry mapping command names to implementations.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, RegisteredCommand>,
    /// Alias -> command name
    aliases: HashMap<String, String>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with all built-in commands.
    ///
    /// Definitions that fail to build are skipped and returned as diagnostics.
    pub fn with_builtins() -> (Self, Vec<DefinitionError>) {
        let mut registry = Self::new();
        let diagnostics = super::handlers::register_all(&mut registry);
        (registry, diagnostics)
    }

    /// Registers a schema with its handler. An existing command of the same name is replaced.
    pub fn register(&mut self, schema: CommandSchema, handler: Arc<dyn CommandHandler>) {
        let name = schema.name.clone();
        if self.commands.contains_key(&name) {
            warn!(command = %name, "replacing previously registered command");
        }
        debug!(command = %name, "registered command");

        self.commands.insert(
            name,
            RegisteredCommand {
                schema: Arc::new(schema),
                handler,
            },
        );
    }

    /// Builds a declarative command's schema and registers it.
    pub fn install<C: Command + 'static>(&mut self, command: C) -> Result<(), DefinitionError> {
        let schema = command.schema().build()?;
        self.register(schema, Arc::new(command));
        Ok(())
    }

    /// Adds an alias for a command.
    pub fn add_alias(&mut self, alias: impl Into<String>, command: impl Into<String>) {
        self.aliases.insert(alias.into(), command.into());
    }

    /// Looks up a command by exact name, then by alias.
    pub fn get(&self, name: &str) -> Option<&RegisteredCommand> {
        self.commands.get(name).or_else(|| {
            self.aliases
                .get(name)
                .and_then(|real| self.commands.get(real))
        })
    }

    /// Whether a command or alias exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns all schemas sorted by name.
    pub fn schemas(&self) -> Vec<&CommandSchema> {
        let mut schemas: Vec<&CommandSchema> =
            self.commands.values().map(|c| c.schema.as_ref()).collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    /// Returns the aliases pointing at `command`, sorted.
    pub fn aliases_of(&self, command: &str) -> Vec<&str> {
        let mut aliases: Vec<&str> = self
            .aliases
            .iter()
            .filter(|(_, target)| target.as_str() == command)
            .map(|(alias, _)| alias.as_str())
            .collect();
        aliases.sort_unstable();
        aliases
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
