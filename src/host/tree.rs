//! In-memory node tree host.
//!
//! A small hierarchy of named nodes used by the binary and by tests. Nodes are
//! addressed by slash paths (`/root/a/b`, `a/b`, `..`) and can be freed, after
//! which their handles stop being live.

use std::collections::{HashMap, VecDeque};

use super::{Host, InvokeError, ObjectId};
use crate::commands::value::Value;

/// Methods every live node answers to.
pub const METHODS: &[&str] = &[
    "get_name",
    "get_path",
    "get_child_count",
    "get_child",
    "get_children",
    "get_parent",
    "find",
    "add_child",
    "rename",
    "set_meta",
    "get_meta",
    "free",
];

#[derive(Debug, Clone)]
struct Node {
    name: String,
    parent: Option<ObjectId>,
    children: Vec<ObjectId>,
    meta: HashMap<String, Value>,
    live: bool,
}

impl Node {
    fn new(name: impl Into<String>, parent: Option<ObjectId>) -> Self {
        Self {
            name: name.into(),
            parent,
            children: Vec::new(),
            meta: HashMap::new(),
            live: true,
        }
    }
}

/// Arena of nodes. Freed slots are never reused, so stale handles stay dead.
#[derive(Debug, Clone)]
pub struct NodeTree {
    nodes: Vec<Node>,
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTree {
    /// Creates a tree containing only the root node, named `root`.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new("root", None)],
        }
    }

    /// Adds a child node. Fails if the parent is dead, the name is invalid or taken.
    pub fn add_child(&mut self, parent: ObjectId, name: &str) -> Result<ObjectId, InvokeError> {
        if !self.is_live(parent) {
            return Err(InvokeError::Failed("parent node is no longer valid".into()));
        }
        self.check_name("add_child", Some(parent), name, None)?;

        let id = ObjectId(self.nodes.len() as u64);
        self.nodes.push(Node::new(name, Some(parent)));
        self.nodes[parent.0 as usize].children.push(id);
        Ok(id)
    }

    /// Frees a node and all of its descendants. The root cannot be freed.
    pub fn free(&mut self, id: ObjectId) -> Result<(), InvokeError> {
        if !self.is_live(id) {
            return Err(InvokeError::Failed("node is already freed".into()));
        }
        if id == self.root() {
            return Err(InvokeError::Failed("the root node cannot be freed".into()));
        }

        if let Some(parent) = self.node(id).and_then(|n| n.parent) {
            self.nodes[parent.0 as usize].children.retain(|c| *c != id);
        }

        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            let node = &mut self.nodes[current.0 as usize];
            node.live = false;
            queue.extend(node.children.drain(..));
        }
        Ok(())
    }

    /// Returns the absolute path of a node, e.g. `/root/a/b`.
    pub fn path_of(&self, id: ObjectId) -> String {
        let mut parts = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.node(current) else {
                break;
            };
            parts.push(node.name.as_str());
            cursor = node.parent;
        }
        parts.reverse();
        format!("/{}", parts.join("/"))
    }

    /// Returns the name of a live node.
    pub fn name_of(&self, id: ObjectId) -> Option<&str> {
        self.live_node(id).map(|n| n.name.as_str())
    }

    fn node(&self, id: ObjectId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    fn live_node(&self, id: ObjectId) -> Option<&Node> {
        self.node(id).filter(|n| n.live)
    }

    /// Rejects names that break path lookup or that a sibling under `parent`
    /// already uses. `node` is the node being renamed, if any.
    fn check_name(
        &self,
        method: &str,
        parent: Option<ObjectId>,
        name: &str,
        node: Option<ObjectId>,
    ) -> Result<(), InvokeError> {
        if name.is_empty() || name.contains('/') || name == "." || name == ".." {
            return Err(InvokeError::invalid_args(
                method,
                format!("'{name}' is not a valid node name"),
            ));
        }
        if let Some(parent) = parent {
            match self.child_named(parent, name) {
                Some(existing) if Some(existing) != node => {
                    return Err(InvokeError::Failed(format!(
                        "'{}' already has a child named '{name}'",
                        self.path_of(parent)
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn child_named(&self, parent: ObjectId, name: &str) -> Option<ObjectId> {
        self.live_node(parent)?
            .children
            .iter()
            .copied()
            .find(|c| self.name_of(*c) == Some(name))
    }

    fn find_descendant(&self, from: ObjectId, name: &str) -> Option<ObjectId> {
        let mut queue: VecDeque<ObjectId> = self.live_node(from)?.children.iter().copied().collect();
        while let Some(current) = queue.pop_front() {
            let node = self.live_node(current)?;
            if node.name == name {
                return Some(current);
            }
            queue.extend(node.children.iter().copied());
        }
        None
    }

    fn invoke_live(
        &mut self,
        id: ObjectId,
        method: &str,
        args: &[Value],
    ) -> Result<Value, InvokeError> {
        match method {
            "get_name" => {
                expect_args(method, args, 0)?;
                Ok(Value::String(self.nodes[id.0 as usize].name.clone()))
            }
            "get_path" => {
                expect_args(method, args, 0)?;
                Ok(Value::String(self.path_of(id)))
            }
            "get_child_count" => {
                expect_args(method, args, 0)?;
                Ok(Value::Int(self.nodes[id.0 as usize].children.len() as i64))
            }
            "get_child" => {
                expect_args(method, args, 1)?;
                let index = args[0]
                    .as_int()
                    .ok_or_else(|| InvokeError::invalid_args(method, "index must be an integer"))?;
                let children = &self.nodes[id.0 as usize].children;
                usize::try_from(index)
                    .ok()
                    .and_then(|i| children.get(i))
                    .map(|c| Value::Object(*c))
                    .ok_or_else(|| {
                        InvokeError::Failed(format!(
                            "child index {index} out of range (0..{})",
                            children.len()
                        ))
                    })
            }
            "get_children" => {
                expect_args(method, args, 0)?;
                Ok(Value::List(
                    self.nodes[id.0 as usize]
                        .children
                        .iter()
                        .map(|c| Value::Object(*c))
                        .collect(),
                ))
            }
            "get_parent" => {
                expect_args(method, args, 0)?;
                Ok(self.nodes[id.0 as usize]
                    .parent
                    .map(Value::Object)
                    .unwrap_or(Value::Null))
            }
            "find" => {
                expect_args(method, args, 1)?;
                let name = string_arg(method, &args[0])?;
                Ok(self
                    .find_descendant(id, name)
                    .map(Value::Object)
                    .unwrap_or(Value::Null))
            }
            "add_child" => {
                expect_args(method, args, 1)?;
                let name = string_arg(method, &args[0])?.to_string();
                self.add_child(id, &name).map(Value::Object)
            }
            "rename" => {
                expect_args(method, args, 1)?;
                let name = string_arg(method, &args[0])?.to_string();
                let parent = self.nodes[id.0 as usize].parent;
                self.check_name(method, parent, &name, Some(id))?;
                self.nodes[id.0 as usize].name = name;
                Ok(Value::Null)
            }
            "set_meta" => {
                expect_args(method, args, 2)?;
                let key = string_arg(method, &args[0])?.to_string();
                self.nodes[id.0 as usize].meta.insert(key, args[1].clone());
                Ok(Value::Null)
            }
            "get_meta" => {
                expect_args(method, args, 1)?;
                let key = string_arg(method, &args[0])?;
                Ok(self.nodes[id.0 as usize]
                    .meta
                    .get(key)
                    .cloned()
                    .unwrap_or(Value::Null))
            }
            "free" => {
                expect_args(method, args, 0)?;
                self.free(id).map(|_| Value::Null)
            }
            _ => Err(InvokeError::NotFound(method.to_string())),
        }
    }
}

impl Host for NodeTree {
    fn root(&self) -> ObjectId {
        ObjectId(0)
    }

    fn is_live(&self, id: ObjectId) -> bool {
        self.live_node(id).is_some()
    }

    fn resolve(&self, from: ObjectId, path: &str) -> Option<ObjectId> {
        let path = path.trim();
        if path.is_empty() {
            return None;
        }

        let (mut cursor, rest) = match path.strip_prefix('/') {
            Some(rest) => {
                let root = self.root();
                let mut parts = rest.splitn(2, '/');
                if parts.next()? != self.name_of(root)? {
                    return None;
                }
                (root, parts.next().unwrap_or(""))
            }
            None => (from, path),
        };

        self.live_node(cursor)?;

        for part in rest.split('/').filter(|p| !p.is_empty()) {
            cursor = match part {
                "." => cursor,
                ".." => self.live_node(cursor)?.parent?,
                name => self.child_named(cursor, name)?,
            };
        }

        Some(cursor)
    }

    fn has_method(&self, id: ObjectId, method: &str) -> bool {
        self.is_live(id) && METHODS.contains(&method)
    }

    fn invoke(
        &mut self,
        id: ObjectId,
        method: &str,
        args: &[Value],
    ) -> Result<Value, InvokeError> {
        if !self.is_live(id) {
            return Err(InvokeError::Failed("node is no longer valid".into()));
        }
        self.invoke_live(id, method, args)
    }

    fn describe(&self, id: ObjectId) -> String {
        if self.is_live(id) {
            self.path_of(id)
        } else {
            format!("<freed {}>", id)
        }
    }
}

fn expect_args(method: &str, args: &[Value], count: usize) -> Result<(), InvokeError> {
    if args.len() == count {
        Ok(())
    } else {
        Err(InvokeError::invalid_args(
            method,
            format!("expected {count} argument(s), got {}", args.len()),
        ))
    }
}

fn string_arg<'v>(method: &str, value: &'v Value) -> Result<&'v str, InvokeError> {
    value
        .as_str()
        .ok_or_else(|| InvokeError::invalid_args(method, "expected a string argument"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (NodeTree, ObjectId, ObjectId) {
        let mut tree = NodeTree::new();
        let root = tree.root();
        let level = tree.add_child(root, "level").unwrap();
        let player = tree.add_child(level, "player").unwrap();
        (tree, level, player)
    }

    #[test]
    fn test_resolve_paths() {
        let (tree, level, player) = sample();
        let root = tree.root();

        assert_eq!(tree.resolve(root, "level/player"), Some(player));
        assert_eq!(tree.resolve(player, ".."), Some(level));
        assert_eq!(tree.resolve(player, "/root/level"), Some(level));
        assert_eq!(tree.resolve(level, "."), Some(level));
        assert_eq!(tree.resolve(root, "/root"), Some(root));
        assert_eq!(tree.resolve(root, "missing"), None);
        assert_eq!(tree.resolve(root, "/other/level"), None);
        assert_eq!(tree.resolve(root, ".."), None);
        assert_eq!(tree.resolve(root, ""), None);
    }

    #[test]
    fn test_free_invalidates_subtree() {
        let (mut tree, level, player) = sample();
        tree.free(level).unwrap();

        assert!(!tree.is_live(level));
        assert!(!tree.is_live(player));
        assert_eq!(tree.resolve(tree.root(), "level"), None);
        assert!(tree.free(tree.root()).is_err());
    }

    #[test]
    fn test_invoke_methods() {
        let (mut tree, level, player) = sample();

        assert_eq!(
            tree.invoke(player, "get_path", &[]),
            Ok(Value::String("/root/level/player".to_string()))
        );
        assert_eq!(
            tree.invoke(level, "get_child", &[Value::Int(0)]),
            Ok(Value::Object(player))
        );
        assert_eq!(
            tree.invoke(tree.root(), "find", &[Value::from("player")]),
            Ok(Value::Object(player))
        );
        assert_eq!(
            tree.invoke(player, "set_meta", &[Value::from("hp"), Value::Int(3)]),
            Ok(Value::Null)
        );
        assert_eq!(
            tree.invoke(player, "get_meta", &[Value::from("hp")]),
            Ok(Value::Int(3))
        );
    }

    #[test]
    fn test_invoke_errors() {
        let (mut tree, level, _) = sample();

        assert_eq!(
            tree.invoke(level, "fly", &[]),
            Err(InvokeError::NotFound("fly".to_string()))
        );
        assert!(matches!(
            tree.invoke(level, "get_child", &[Value::Int(5)]),
            Err(InvokeError::Failed(_))
        ));
        assert!(matches!(
            tree.invoke(level, "get_name", &[Value::Int(1)]),
            Err(InvokeError::InvalidArguments { .. })
        ));
    }

    #[test]
    fn test_rename_follows_add_child_rules() {
        let (mut tree, level, player) = sample();
        let camera = tree.add_child(level, "camera").unwrap();

        for bad in ["", "a/b", ".", ".."] {
            assert!(matches!(
                tree.invoke(camera, "rename", &[Value::from(bad)]),
                Err(InvokeError::InvalidArguments { .. })
            ));
        }
        assert_eq!(
            tree.invoke(camera, "rename", &[Value::from("player")]),
            Err(InvokeError::Failed(
                "'/root/level' already has a child named 'player'".to_string()
            ))
        );
        assert_eq!(tree.resolve(level, "player"), Some(player));

        assert_eq!(tree.invoke(camera, "rename", &[Value::from("camera")]), Ok(Value::Null));
        assert_eq!(tree.invoke(camera, "rename", &[Value::from("eye")]), Ok(Value::Null));
        assert_eq!(tree.resolve(level, "eye"), Some(camera));
    }

    #[test]
    fn test_has_method_requires_live_node() {
        let (mut tree, level, _) = sample();
        assert!(tree.has_method(level, "get_name"));
        assert!(!tree.has_method(level, "fly"));

        tree.free(level).unwrap();
        assert!(!tree.has_method(level, "get_name"));
    }

    #[test]
    fn test_describe() {
        let (mut tree, level, _) = sample();
        assert_eq!(tree.describe(level), "/root/level");
        tree.free(level).unwrap();
        assert!(tree.describe(level).starts_with("<freed"));
    }
}
