//! Target command handlers (cn, cm).

use tracing::debug;

use super::{Command, CommandContext, CommandHandler, CommandResult};
use crate::commands::definitions::{CommandSchema, SchemaBuilder};
use crate::commands::invocation::CommandInvocation;
use crate::commands::value::Value;

/// Changes the current target.
pub struct CnCommand;

impl Command for CnCommand {
    fn schema(&self) -> SchemaBuilder {
        CommandSchema::builder("cn", "Change the current target")
            .argument("path", "string", "Relative or absolute object path")
    }
}

impl CommandHandler for CnCommand {
    fn execute(&self, invocation: &CommandInvocation, ctx: &mut CommandContext<'_>) -> CommandResult {
        let path = invocation.arg_str("path").unwrap_or_default();

        match ctx.target.change_target(&*ctx.host, path) {
            Ok(target) => CommandResult::success(format!("Target: {}", ctx.host.describe(target))),
            Err(reason) => CommandResult::failure(format!("{path}: {reason}")),
        }
    }
}

/// Calls a dotted method chain on the current target.
pub struct CmCommand;

impl Command for CmCommand {
    fn schema(&self) -> SchemaBuilder {
        CommandSchema::builder("cm", "Call methods on the current target")
            .usage("cm <method(args)[.method(args)...]>")
            .argument("chain", "string...", "Method chain, e.g. get_child(0).get_name()")
    }
}

impl CommandHandler for CmCommand {
    fn execute(&self, invocation: &CommandInvocation, ctx: &mut CommandContext<'_>) -> CommandResult {
        // Tokens have lost their quotes; parse the chain from the text as typed.
        let chain = invocation.line.as_str();

        let mut completed: Vec<(String, Value)> = Vec::new();
        let outcome = ctx
            .target
            .invoke_chain_with(&mut *ctx.host, chain, |step| {
                completed.push((step.method.clone(), step.value.clone()))
            });

        let mut lines: Vec<String> = Vec::new();
        if ctx.options.print_results {
            lines.extend(
                completed
                    .iter()
                    .map(|(method, value)| format!("{method}: {}", ctx.host.render(value))),
            );
        }

        match outcome {
            Ok(steps) => {
                debug!(steps = steps.len(), "method chain finished");
                CommandResult::success(lines.join("\n"))
            }
            Err(e) => {
                lines.push(e.to_string());
                CommandResult::failure(lines.join("\n"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::value::Value;
    use crate::host::{Host, NodeTree};
    use crate::interpreter::Interpreter;
    use pretty_assertions::assert_eq;

    fn sample() -> (NodeTree, Interpreter) {
        let mut tree = NodeTree::new();
        let level = tree.add_child(tree.root(), "level").unwrap();
        tree.add_child(level, "player").unwrap();
        let interpreter = Interpreter::new(&tree);
        (tree, interpreter)
    }

    #[test]
    fn test_cn_changes_target() {
        let (mut tree, mut interpreter) = sample();

        let result = interpreter.execute(&mut tree, "cn level/player");
        assert!(result.success);
        assert_eq!(result.message, "Target: /root/level/player");

        let result = interpreter.execute(&mut tree, "cn ..");
        assert_eq!(result.message, "Target: /root/level");
    }

    #[test]
    fn test_cn_rejects_missing_path() {
        let (mut tree, mut interpreter) = sample();

        let result = interpreter.execute(&mut tree, "cn nowhere");
        assert!(!result.success);
        assert!(result.message.starts_with("nowhere: Invalid target"));
        assert_eq!(interpreter.target().current(), tree.root());
    }

    #[test]
    fn test_cm_prints_each_step() {
        let (mut tree, mut interpreter) = sample();

        let result = interpreter.execute(&mut tree, "cm get_child(0).get_child(0).get_path()");
        assert!(result.success);
        assert_eq!(
            result.message,
            "get_child: /root/level\nget_child: /root/level/player\nget_path: /root/level/player"
        );
    }

    #[test]
    fn test_cm_keeps_spaces_and_quotes_inside_arguments() {
        let (mut tree, mut interpreter) = sample();

        let result = interpreter.execute(&mut tree, "cm set_meta( 'k', 'true' )");
        assert!(result.success, "{}", result.message);
        let result = interpreter.execute(&mut tree, "cm set_meta( 'k2', 'a b' )");
        assert!(result.success, "{}", result.message);

        assert_eq!(
            tree.invoke(tree.root(), "get_meta", &[Value::from("k")]),
            Ok(Value::String("true".into()))
        );
        assert_eq!(
            tree.invoke(tree.root(), "get_meta", &[Value::from("k2")]),
            Ok(Value::String("a b".into()))
        );

        let result = interpreter.execute(&mut tree, "cm   get_meta( \"k2\" ).get_name()");
        assert!(result.success, "{}", result.message);
        assert_eq!(result.message, "get_meta: a b\nget_name: root");
    }

    #[test]
    fn test_cm_space_after_comma() {
        let (mut tree, mut interpreter) = sample();

        let result = interpreter.execute(&mut tree, "cm set_meta('hp', 10).get_meta('hp')");
        assert!(result.success, "{}", result.message);
        assert!(result.message.ends_with("get_meta: 10"));
    }

    #[test]
    fn test_cm_failure_keeps_completed_steps() {
        let (mut tree, mut interpreter) = sample();

        let result = interpreter.execute(&mut tree, "cm get_name().fly()");
        assert!(!result.success);
        assert_eq!(result.message, "get_name: root\nmethod 'fly' not found on /root");
    }

    #[test]
    fn test_cm_quiet_when_results_disabled() {
        let (mut tree, mut interpreter) = sample();
        interpreter.execute(&mut tree, "set print_results off");

        let result = interpreter.execute(&mut tree, "cm get_name()");
        assert!(result.success);
        assert_eq!(result.message, "");
    }
}
