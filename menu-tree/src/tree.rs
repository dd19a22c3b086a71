//! Arena-backed menu tree.
//!
//! [`MenuTree`] owns every node. Children are ordered [`NodeId`] lists, the holder link is a
//! non-owning [`NodeId`], and a single command index covers the whole tree.

use menu_core::{Button, MenuAction};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::text::Text;

/// Handle of a node inside a [`MenuTree`]. Ids of removed nodes may be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Index of a structured section (object or array) owned by the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SectionId(pub(crate) usize);

/// What a node does when it is the routing target.
#[derive(Clone)]
pub(crate) enum NodeKind {
    Root,
    Action(Option<Arc<dyn MenuAction>>),
    Section(SectionId),
    Item {
        section: SectionId,
        index: usize,
    },
    AddItem(SectionId),
    DeleteItem {
        section: SectionId,
        index: usize,
    },
    Field {
        section: SectionId,
        index: Option<usize>,
        key: String,
    },
    Choice {
        section: SectionId,
        index: Option<usize>,
        key: String,
        value: String,
    },
}

pub(crate) struct Node {
    pub(crate) label: Text,
    pub(crate) text: Text,
    pub(crate) command: String,
    pub(crate) group: String,
    pub(crate) holder: Option<NodeId>,
    pub(crate) nested: Vec<NodeId>,
    /// Extra controls drawn between the child grid and the Back/Home/Exit row.
    pub(crate) bottom: Vec<Button>,
    pub(crate) kind: NodeKind,
}

impl Node {
    pub(crate) fn new(
        label: impl Into<Text>,
        command: impl Into<String>,
        text: impl Into<Text>,
        group: impl Into<String>,
        kind: NodeKind,
    ) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
            command: command.into(),
            group: group.into(),
            holder: None,
            nested: Vec::new(),
            bottom: Vec::new(),
            kind,
        }
    }
}

/// A custom node appended by the host: label, command, text, group and an optional action.
pub struct MenuNode {
    label: Text,
    command: Text,
    text: Option<Text>,
    group: String,
    bottom: Vec<Button>,
    action: Option<Arc<dyn MenuAction>>,
}

impl MenuNode {
    pub fn new(label: impl Into<Text>, command: impl Into<Text>) -> Self {
        Self {
            label: label.into(),
            command: command.into(),
            text: None,
            group: String::new(),
            bottom: Vec::new(),
            action: None,
        }
    }

    /// Message text shown when the node is drawn; defaults to the label.
    pub fn text(mut self, text: impl Into<Text>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Adds a control to the row drawn under the children.
    pub fn bottom_button(mut self, label: impl Into<String>, command: impl Into<String>) -> Self {
        self.bottom.push(Button::new(label, command));
        self
    }

    pub fn action(mut self, action: Arc<dyn MenuAction>) -> Self {
        self.action = Some(action);
        self
    }

    pub(crate) fn into_node(self) -> Node {
        let text = self.text.unwrap_or_else(|| self.label.clone());
        let mut node = Node::new(
            self.label,
            self.command.get(),
            text,
            self.group,
            NodeKind::Action(self.action),
        );
        node.bottom = self.bottom;
        node
    }
}

pub struct MenuTree {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    commands: HashMap<String, NodeId>,
    root: NodeId,
}

impl MenuTree {
    pub(crate) fn new(root: Node) -> Self {
        let root_id = NodeId(0);
        let mut commands = HashMap::new();
        commands.insert(root.command.clone(), root_id);
        Self {
            nodes: vec![Some(root)],
            free: Vec::new(),
            commands,
            root: root_id,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of commands in the index (one per live node).
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// Looks a command up in the index.
    pub fn find(&self, command: &str) -> Option<NodeId> {
        self.commands.get(command).copied()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn command(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(|n| n.command.as_str())
    }

    pub fn holder(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.holder)
    }

    pub fn nested(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.nested.as_slice()).unwrap_or(&[])
    }

    pub fn group(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(|n| n.group.as_str())
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub(crate) fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.node(id).map(|n| n.kind.clone())
    }

    /// Attaches `node` under `holder`, at `index` or at the end.
    /// Returns `None` (tree unchanged) when the command already exists or the holder is gone.
    pub(crate) fn append_nested(
        &mut self,
        holder: NodeId,
        mut node: Node,
        index: Option<usize>,
    ) -> Option<NodeId> {
        if !self.contains(holder) {
            warn!(command = %node.command, "Holder is not in the tree, item can't be added");
            return None;
        }
        if self.commands.contains_key(&node.command) {
            warn!(
                command = %node.command,
                "Command already exists, item can't be added to the menu"
            );
            return None;
        }
        node.holder = Some(holder);
        let command = node.command.clone();
        let id = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        };
        self.commands.insert(command.clone(), id);
        if let Some(Some(parent)) = self.nodes.get_mut(holder.0) {
            match index {
                Some(i) if i < parent.nested.len() => parent.nested.insert(i, id),
                _ => parent.nested.push(id),
            }
        }
        debug!(command = %command, commands = self.commands.len(), "Node appended");
        Some(id)
    }

    /// Detaches `id` from its holder and drops it with its whole subtree and their commands.
    pub(crate) fn remove_nested(&mut self, id: NodeId) {
        if id == self.root {
            return;
        }
        if let Some(holder) = self.holder(id) {
            if let Some(Some(parent)) = self.nodes.get_mut(holder.0) {
                parent.nested.retain(|child| *child != id);
            }
        }
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(node) = self.nodes.get_mut(current.0).and_then(Option::take) {
                self.commands.remove(&node.command);
                pending.extend(node.nested);
                self.free.push(current.0);
            }
        }
    }

    /// Walks from `id` up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.holder(id), move |current| self.holder(*current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(command: &str) -> Node {
        Node::new(command, command, command, "", NodeKind::Action(None))
    }

    #[test]
    fn test_duplicate_command_rejected() {
        let mut tree = MenuTree::new(Node::new("Root", "/start", "Root", "", NodeKind::Root));
        let root = tree.root();
        assert!(tree.append_nested(root, plain("/a"), None).is_some());
        let count = tree.command_count();

        assert!(tree.append_nested(root, plain("/a"), None).is_none());
        assert!(tree.append_nested(root, plain("/start"), None).is_none());
        assert_eq!(tree.command_count(), count);
        assert_eq!(tree.nested(root).len(), 1);
    }

    #[test]
    fn test_insert_at_index_and_remove_subtree() {
        let mut tree = MenuTree::new(Node::new("Root", "/start", "Root", "", NodeKind::Root));
        let root = tree.root();
        let a = tree.append_nested(root, plain("/a"), None).unwrap();
        let b = tree.append_nested(root, plain("/b"), Some(0)).unwrap();
        assert_eq!(tree.nested(root), &[b, a]);

        let a1 = tree.append_nested(a, plain("/a/1"), None).unwrap();
        assert_eq!(tree.ancestors(a1).collect::<Vec<_>>(), vec![a, root]);

        tree.remove_nested(a);
        assert_eq!(tree.nested(root), &[b]);
        assert!(tree.find("/a").is_none());
        assert!(tree.find("/a/1").is_none());
        assert!(!tree.contains(a1));
        assert_eq!(tree.command_count(), 2);

        // freed slots are reused
        let c = tree.append_nested(root, plain("/c"), None).unwrap();
        assert!(c == a || c == a1);
        assert_eq!(tree.find("/c"), Some(c));
    }
}
