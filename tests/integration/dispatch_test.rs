//! Dispatch integration tests.
//!
//! Registers commands through the public API and dispatches token streams.

use std::sync::{Arc, Mutex};

use nodeshell::commands::handlers::variables::SetCommand;
use nodeshell::commands::{
    handler_fn, CommandContext, CommandInvocation, CommandRegistry, CommandResult,
    CommandRouter, CommandSchema, Value,
};
use nodeshell::config::InterpreterOptions;
use nodeshell::host::NodeTree;
use nodeshell::target::TargetEngine;
use pretty_assertions::assert_eq;

type Seen = Arc<Mutex<Vec<CommandInvocation>>>;

fn tokens(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Runs `f` with a context over a fresh tree.
fn with_context<R>(registry: &CommandRegistry, f: impl FnOnce(&mut CommandContext<'_>) -> R) -> R {
    let mut tree = NodeTree::new();
    let mut target = TargetEngine::for_host(&tree);
    let mut options = InterpreterOptions::default();
    let mut ctx = CommandContext {
        registry,
        host: &mut tree,
        target: &mut target,
        options: &mut options,
    };
    f(&mut ctx)
}

fn recording_handler(seen: &Seen, reply: &'static str) -> Arc<dyn nodeshell::commands::CommandHandler> {
    let seen = Arc::clone(seen);
    Arc::new(handler_fn(move |invocation, _| {
        seen.lock().unwrap().push(invocation.clone());
        CommandResult::success(reply)
    }))
}

#[test]
fn test_dispatch_binds_required_argument() {
    let seen: Seen = Arc::default();
    let mut registry = CommandRegistry::new();
    registry.register(
        CommandSchema::builder("cmd", "Takes one string")
            .argument("name", "string", "")
            .build()
            .unwrap(),
        recording_handler(&seen, "ran"),
    );

    let result = with_context(&registry, |ctx| CommandRouter::dispatch(&tokens(&["cmd", "x"]), ctx));
    assert_eq!(result, CommandResult::success("ran"));
    assert_eq!(seen.lock().unwrap()[0].arg_str("name"), Some("x"));

    let result = with_context(&registry, |ctx| CommandRouter::dispatch(&tokens(&["cmd"]), ctx));
    assert!(!result.success);
    assert!(result.message.contains("missing argument 'name'"));
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn test_dispatch_unknown_command() {
    let registry = CommandRegistry::new();
    let result = with_context(&registry, |ctx| CommandRouter::dispatch(&tokens(&["nope"]), ctx));
    assert!(!result.success);
    assert!(result.message.starts_with("Unknown command: nope"));
}

#[test]
fn test_dispatch_fills_option_defaults_and_flags() {
    let seen: Seen = Arc::default();
    let mut registry = CommandRegistry::new();
    registry.register(
        CommandSchema::builder("load", "Loads an object")
            .argument("object_path", "string", "")
            .flag("-hidden", "")
            .option("-x", Some("float"), "", 0.0)
            .option("-z", Some("float"), "", -5.0)
            .build()
            .unwrap(),
        recording_handler(&seen, ""),
    );

    let line = "load -hidden \"levels/main scene\"";
    let result = with_context(&registry, |ctx| CommandRouter::execute_line(line, ctx));
    assert!(result.success, "{}", result.message);

    let invocation = seen.lock().unwrap().pop().unwrap();
    assert!(invocation.flag("-hidden"));
    assert_eq!(invocation.arg_str("object_path"), Some("levels/main scene"));
    assert_eq!(invocation.option("-x"), Some(&Value::Float(0.0)));
    assert_eq!(invocation.option("-z"), Some(&Value::Float(-5.0)));
}

#[test]
fn test_handler_sees_text_as_typed() {
    let seen: Seen = Arc::default();
    let mut registry = CommandRegistry::new();
    registry.register(
        CommandSchema::builder("say", "")
            .argument("words", "string...", "")
            .build()
            .unwrap(),
        recording_handler(&seen, ""),
    );

    let line = "  say   f( 'a  b', \"c\" )  ";
    with_context(&registry, |ctx| CommandRouter::execute_line(line, ctx));
    let invocation = seen.lock().unwrap().pop().unwrap();
    assert_eq!(invocation.line, "f( 'a  b', \"c\" )");
    assert_eq!(invocation.raw, tokens(&["f(", "'a", "b',", "c", ")"]));

    with_context(&registry, |ctx| CommandRouter::dispatch(&tokens(&["say", "x", "y"]), ctx));
    assert_eq!(seen.lock().unwrap().pop().unwrap().line, "x y");
}

#[test]
fn test_extension_receives_remaining_tokens() {
    let seen: Seen = Arc::default();

    let mut set = SetCommand::new();
    set.extensions_mut().register(
        CommandSchema::builder("foo", "")
            .argument("value", "int", "")
            .build()
            .unwrap(),
        recording_handler(&seen, "foo set"),
    );

    let mut registry = CommandRegistry::new();
    registry.install(set).unwrap();

    let result = with_context(&registry, |ctx| {
        CommandRouter::dispatch(&tokens(&["set", "foo", "1"]), ctx)
    });
    assert_eq!(result, CommandResult::success("foo set"));

    let invocation = seen.lock().unwrap().pop().unwrap();
    assert_eq!(invocation.raw, tokens(&["1"]));
    assert_eq!(invocation.argument("value"), Some(&Value::Int(1)));

    let result = with_context(&registry, |ctx| {
        CommandRouter::dispatch(&tokens(&["set", "bar", "1"]), ctx)
    });
    assert!(!result.success);
    assert!(result.message.starts_with("Variable not found: bar"));
}

#[test]
fn test_invalid_definition_is_rejected_at_build() {
    let err = CommandSchema::builder("broken", "")
        .argument("level", "int(0:)", "")
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("broken"));
}

#[test]
fn test_union_with_one_bad_alternative_still_builds() {
    let schema = CommandSchema::builder("pick", "")
        .argument("what", "bogus|int", "")
        .build()
        .unwrap();
    assert_eq!(schema.arguments[0].types.to_string(), "int");
}
