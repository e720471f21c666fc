//! Interpreter session.
//!
//! Bundles what one session needs between lines: the shared command registry,
//! the session's target engine and its preferences. The host is borrowed per
//! line, so the embedding application keeps ownership of its objects.

use std::sync::Arc;

use tracing::{debug, info};

use crate::commands::definitions::DefinitionError;
use crate::commands::handlers::CommandContext;
use crate::commands::output::CommandResult;
use crate::commands::registry::CommandRegistry;
use crate::commands::router::CommandRouter;
use crate::config::InterpreterOptions;
use crate::error::{NodeshellError, Result};
use crate::host::Host;
use crate::target::{TargetEngine, TargetEvent};

/// One interpreter session.
#[derive(Debug)]
pub struct Interpreter {
    registry: Arc<CommandRegistry>,
    target: TargetEngine,
    options: InterpreterOptions,
    diagnostics: Vec<DefinitionError>,
}

impl Interpreter {
    /// Creates a session with the built-in commands, targeting the host's root.
    pub fn new(host: &dyn Host) -> Self {
        let (registry, diagnostics) = CommandRegistry::with_builtins();
        info!(commands = registry.len(), "command registry ready");
        Self {
            registry: Arc::new(registry),
            target: TargetEngine::for_host(host),
            options: InterpreterOptions::default(),
            diagnostics,
        }
    }

    /// Creates a session over an existing registry. Several sessions may share one.
    pub fn with_registry(registry: Arc<CommandRegistry>, host: &dyn Host) -> Self {
        Self {
            registry,
            target: TargetEngine::for_host(host),
            options: InterpreterOptions::default(),
            diagnostics: Vec::new(),
        }
    }

    /// Applies preferences, selecting `start_path` when one is set.
    pub fn configure(&mut self, host: &dyn Host, options: InterpreterOptions) -> Result<()> {
        if let Some(path) = options.start_path.as_deref() {
            self.target.change_target(host, path).map_err(|reason| {
                NodeshellError::host(format!("start path '{path}': {reason}"))
            })?;
        }
        self.options = options;
        Ok(())
    }

    /// Executes one input line.
    pub fn execute(&mut self, host: &mut dyn Host, line: &str) -> CommandResult {
        debug!(line, "executing");
        let registry = Arc::clone(&self.registry);
        let mut ctx = CommandContext {
            registry: &registry,
            host,
            target: &mut self.target,
            options: &mut self.options,
        };

        let result = CommandRouter::execute_line(line, &mut ctx);
        if !result.success {
            debug!(line, message = %result.message, "command failed");
        }
        result
    }

    /// Registers an observer for target changes and method calls.
    pub fn subscribe(&mut self, observer: impl FnMut(&TargetEvent) + Send + 'static) {
        self.target.subscribe(observer);
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn target(&self) -> &TargetEngine {
        &self.target
    }

    pub fn options(&self) -> &InterpreterOptions {
        &self.options
    }

    /// Definition errors collected while building the registry.
    pub fn diagnostics(&self) -> &[DefinitionError] {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NodeTree;
    use std::sync::Mutex;

    #[test]
    fn test_new_registers_builtins_cleanly() {
        let tree = NodeTree::new();
        let interpreter = Interpreter::new(&tree);
        assert!(interpreter.diagnostics().is_empty());
        assert!(interpreter.registry().contains("cm"));
        assert_eq!(interpreter.target().current(), tree.root());
    }

    #[test]
    fn test_configure_applies_start_path() {
        let mut tree = NodeTree::new();
        let level = tree.add_child(tree.root(), "level").unwrap();
        let mut interpreter = Interpreter::new(&tree);

        let options = InterpreterOptions {
            start_path: Some("/root/level".to_string()),
            ..Default::default()
        };
        interpreter.configure(&tree, options).unwrap();
        assert_eq!(interpreter.target().current(), level);
    }

    #[test]
    fn test_configure_rejects_missing_start_path() {
        let tree = NodeTree::new();
        let mut interpreter = Interpreter::new(&tree);

        let options = InterpreterOptions {
            prompt: "$ ".to_string(),
            start_path: Some("missing".to_string()),
            ..Default::default()
        };
        let err = interpreter.configure(&tree, options).unwrap_err();
        assert_eq!(err.category(), "Host Error");
        assert_eq!(interpreter.options().prompt, "> ");
    }

    #[test]
    fn test_sessions_share_registry_but_not_targets() {
        let mut tree = NodeTree::new();
        tree.add_child(tree.root(), "level").unwrap();
        let mut first = Interpreter::new(&tree);
        let (registry, _) = CommandRegistry::with_builtins();
        let mut second = Interpreter::with_registry(Arc::new(registry), &tree);

        assert!(first.execute(&mut tree, "cn level").success);
        assert_eq!(second.target().current(), tree.root());
        assert!(second.execute(&mut tree, "help").success);
    }

    #[test]
    fn test_subscribe_sees_target_events() {
        let mut tree = NodeTree::new();
        let level = tree.add_child(tree.root(), "level").unwrap();
        let mut interpreter = Interpreter::new(&tree);

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        interpreter.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        interpreter.execute(&mut tree, "cn level");
        assert_eq!(*events.lock().unwrap(), vec![TargetEvent::TargetChanged(level)]);
    }

    #[test]
    fn test_unknown_command_is_a_failed_result() {
        let mut tree = NodeTree::new();
        let mut interpreter = Interpreter::new(&tree);

        let result = interpreter.execute(&mut tree, "fly away");
        assert!(!result.success);
        assert_eq!(
            result.message,
            "Unknown command: fly. Type help for available commands."
        );
    }
}
