//! Command routing and materialization of dynamic children.
//!
//! Routing walks the tree from the root, refreshing structured containers on the way, so array
//! items and list choices exist by the time their commands are matched.

use menu_core::{Transport, UserId};
use tracing::{debug, warn};

use crate::command::{
    choice_command, field_command, item_command, ParsedCommand, CMD_EXIT, DELETE_SUFFIX,
};
use crate::menu::{Menu, LABEL_DELETE};
use crate::structured::SectionMode;
use crate::tree::{Node, NodeId, NodeKind, SectionId};

impl<T: Transport> Menu<T> {
    /// Resolves a raw command to its node.
    ///
    /// Stores the `$bo=` offset (0 when absent) in the session, handles `/exit` at the root and
    /// records the stripped command as the last command on success.
    pub fn get_by_command(&mut self, command: &str, user: UserId) -> Option<NodeId> {
        let parsed = ParsedCommand::parse(command);
        let session = self.session(user);
        session.set_buttons_offset(parsed.offset.unwrap_or(0));

        if parsed.path == CMD_EXIT {
            session.clear_pending_input();
            return Some(self.tree.root());
        }

        let root = self.tree.root();
        let found = self.route(root, &parsed.path);
        match found {
            Some(_) => {
                session.set_last_command(&parsed.path);
                debug!(command = %parsed.path, user_id = user, "Command routed");
            }
            None => {
                warn!(command = %parsed.path, user_id = user, "No route for command");
            }
        }
        found
    }

    fn route(&mut self, id: NodeId, path: &str) -> Option<NodeId> {
        let command = self.tree.command(id)?.to_string();
        if command == path {
            return Some(id);
        }
        if id != self.tree.root() && !path.starts_with(&command) {
            return None;
        }
        self.refresh(id, false);
        let nested = self.tree.nested(id).to_vec();
        nested.into_iter().find_map(|child| self.route(child, path))
    }

    /// Brings a node's dynamic children in line with the host data.
    ///
    /// Returns false when the node no longer addresses existing data (an item index past the
    /// end of its list); the caller then falls back to the holder.
    pub fn refresh(&mut self, id: NodeId, force: bool) -> bool {
        let Some(kind) = self.tree.kind(id) else {
            return false;
        };
        match kind {
            NodeKind::Section(section) => {
                self.sync_items(section);
                true
            }
            NodeKind::Item { section, index } | NodeKind::DeleteItem { section, index } => {
                self.item_exists(section, index)
            }
            NodeKind::Field {
                section,
                index,
                key,
            } => {
                if let Some(index) = index {
                    if !self.item_exists(section, index) {
                        return false;
                    }
                }
                self.sync_choices(id, section, index, &key, force);
                true
            }
            NodeKind::Choice { section, index, .. } => {
                index.map_or(true, |index| self.item_exists(section, index))
            }
            NodeKind::Root | NodeKind::Action(_) | NodeKind::AddItem(_) => true,
        }
    }

    fn item_exists(&self, section: SectionId, index: usize) -> bool {
        self.section(section)
            .is_some_and(|s| index < s.len(self.store.as_ref()))
    }

    /// Adds or removes item nodes at the tail so there is one per stored record, kept before "Add".
    pub(crate) fn sync_items(&mut self, section: SectionId) {
        let Some(structured) = self.section(section) else {
            return;
        };
        if structured.mode != SectionMode::Array {
            return;
        }
        let node_id = structured.node;
        let data_id = structured.data_id.clone();
        let keys: Vec<String> = structured.fields.iter().map(|(k, _)| k.clone()).collect();
        let len = structured.len(self.store.as_ref());
        let Some(section_command) = self.tree.command(node_id).map(str::to_string) else {
            return;
        };

        let items: Vec<NodeId> = self
            .tree
            .nested(node_id)
            .iter()
            .copied()
            .filter(|child| matches!(self.tree.kind(*child), Some(NodeKind::Item { .. })))
            .collect();

        for stale in items.iter().skip(len) {
            self.tree.remove_nested(*stale);
        }
        for index in items.len()..len {
            let command = item_command(&section_command, index);
            let item = Node::new(
                "",
                command.clone(),
                "",
                data_id.clone(),
                NodeKind::Item { section, index },
            );
            let Some(item_id) = self.tree.append_nested(node_id, item, Some(index)) else {
                continue;
            };
            for key in &keys {
                self.append_field(item_id, section, Some(index), key);
            }
            let delete = Node::new(
                LABEL_DELETE,
                format!("{}{}", command, DELETE_SUFFIX),
                LABEL_DELETE,
                "actions",
                NodeKind::DeleteItem { section, index },
            );
            self.tree.append_nested(item_id, delete, None);
        }
        if items.len() != len {
            debug!(data_id = %data_id, from = items.len(), to = len, "Items synced");
        }
    }

    pub(crate) fn append_field(
        &mut self,
        holder: NodeId,
        section: SectionId,
        index: Option<usize>,
        key: &str,
    ) -> Option<NodeId> {
        let holder_command = self.tree.command(holder)?.to_string();
        let node = Node::new(
            key,
            field_command(&holder_command, key),
            key,
            key,
            NodeKind::Field {
                section,
                index,
                key: key.to_string(),
            },
        );
        self.tree.append_nested(holder, node, None)
    }

    /// Rebuilds the choice children of a list field when its entries changed.
    fn sync_choices(
        &mut self,
        field_id: NodeId,
        section: SectionId,
        index: Option<usize>,
        key: &str,
        force: bool,
    ) {
        let Some(list) = self
            .sections
            .get_mut(section.0)
            .and_then(|s| s.field_mut(key))
            .and_then(|f| f.list_mut())
        else {
            return;
        };
        let entries: Vec<String> = list.load(force).iter().map(|(k, _)| k.clone()).collect();

        let current: Vec<String> = self
            .tree
            .nested(field_id)
            .iter()
            .filter_map(|child| match self.tree.kind(*child) {
                Some(NodeKind::Choice { value, .. }) => Some(value),
                _ => None,
            })
            .collect();
        if current == entries {
            return;
        }

        for child in self.tree.nested(field_id).to_vec() {
            self.tree.remove_nested(child);
        }
        let Some(field_command) = self.tree.command(field_id).map(str::to_string) else {
            return;
        };
        for value in entries {
            let node = Node::new(
                value.as_str(),
                choice_command(&field_command, &value),
                value.as_str(),
                "",
                NodeKind::Choice {
                    section,
                    index,
                    key: key.to_string(),
                    value: value.clone(),
                },
            );
            self.tree.append_nested(field_id, node, None);
        }
        debug!(command = %field_command, "Choices synced");
    }
}
