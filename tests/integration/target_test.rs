//! Target and method chain integration tests.

use std::sync::{Arc, Mutex};

use nodeshell::commands::Value;
use nodeshell::host::{Host, NodeTree, ObjectId};
use nodeshell::interpreter::Interpreter;
use nodeshell::target::{ChainError, MethodStatus, Rejection, TargetEngine, TargetEvent};
use pretty_assertions::assert_eq;

fn scene() -> (NodeTree, ObjectId, ObjectId) {
    let mut tree = NodeTree::new();
    let level = tree.add_child(tree.root(), "level").unwrap();
    let player = tree.add_child(level, "player").unwrap();
    (tree, level, player)
}

#[test]
fn test_object_result_becomes_next_receiver() {
    let (mut tree, _, player) = scene();
    let mut engine = TargetEngine::for_host(&tree);

    let results = engine.invoke_chain(&mut tree, "find('player').get_path()").unwrap();
    assert_eq!(results[0].value, Value::Object(player));
    assert_eq!(results[1].value, Value::String("/root/level/player".into()));
}

#[test]
fn test_plain_result_falls_back_to_current() {
    let (mut tree, level, _) = scene();
    let mut engine = TargetEngine::for_host(&tree);
    engine.change_target(&tree, "/root/level").unwrap();

    let results = engine.invoke_chain(&mut tree, "get_name().get_path()").unwrap();
    assert_eq!(results[1].value, Value::String(tree.describe(level)));
}

#[test]
fn test_failed_step_has_no_later_side_effects() {
    let (mut tree, _, _) = scene();
    let mut engine = TargetEngine::for_host(&tree);

    let err = engine
        .invoke_chain(&mut tree, "get_child(5).add_child('ghost')")
        .unwrap_err();
    assert!(matches!(err, ChainError::Invocation { ref method, .. } if method == "get_child"));
    assert_eq!(tree.resolve(tree.root(), "ghost"), None);
}

#[test]
fn test_target_freed_behind_the_session() {
    let (mut tree, level, _) = scene();
    let mut interpreter = Interpreter::new(&tree);
    assert!(interpreter.execute(&mut tree, "cn level/player").success);

    tree.free(level).unwrap();

    let result = interpreter.execute(&mut tree, "cm get_name()");
    assert!(!result.success);
    assert!(result.message.contains("no longer valid"));

    let result = interpreter.execute(&mut tree, "cn level");
    assert!(!result.success);
    assert!(interpreter.execute(&mut tree, "cn /root").success);
}

#[test]
fn test_events_follow_session_activity() {
    let (mut tree, level, _) = scene();
    let mut interpreter = Interpreter::new(&tree);
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    interpreter.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

    interpreter.execute(&mut tree, "cn level");
    interpreter.execute(&mut tree, "cn missing");
    interpreter.execute(&mut tree, "cm get_child_count().jump()");

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            TargetEvent::TargetChanged(level),
            TargetEvent::TargetChangeFailed(Rejection::InvalidTarget),
            TargetEvent::MethodCalled {
                method: "get_child_count".into(),
                result: Value::Int(1),
                status: MethodStatus::Success,
            },
            TargetEvent::MethodCalled {
                method: "jump".into(),
                result: Value::Null,
                status: MethodStatus::Failed,
            },
        ]
    );
}

#[test]
fn test_chain_builds_and_reads_back_tree() {
    let mut tree = NodeTree::new();
    let mut interpreter = Interpreter::new(&tree);

    let result = interpreter.execute(&mut tree, "cm add_child('enemies').add_child('orc').get_path()");
    assert!(result.success, "{}", result.message);
    assert!(result.message.ends_with("get_path: /root/enemies/orc"));

    let result = interpreter.execute(&mut tree, "cm get_children()");
    assert_eq!(result.message, "get_children: [/root/enemies]");
}
