//! The menu: tree, structured sections, layout settings and the bound host capabilities.

use menu_core::{NoTranslation, Translator, Transport, UserId, ValueStore};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

use crate::command::{section_command, ADD_SUFFIX};
use crate::field::FieldKind;
use crate::layout::LayoutSettings;
use crate::session::Session;
use crate::structure::MenuStructure;
use crate::structured::{SectionMode, SectionSpec, StructuredNode};
use crate::tree::{MenuNode, MenuTree, Node, NodeId, NodeKind, SectionId};

pub(crate) const LABEL_ADD: &str = "Add new item";
pub(crate) const LABEL_DELETE: &str = "Delete";
const CHOSEN_MARK: &str = "✓ ";

/// A menu bound to a transport and a value store.
///
/// `on_command` takes `&mut self`: the host serializes events (wrap the menu in a mutex to share it).
pub struct Menu<T: Transport> {
    pub(crate) id: String,
    pub(crate) tree: MenuTree,
    pub(crate) sections: Vec<StructuredNode>,
    pub(crate) layout: LayoutSettings,
    pub(crate) transport: T,
    pub(crate) store: Arc<dyn ValueStore>,
    pub(crate) translator: Arc<dyn Translator>,
}

impl<T: Transport> Menu<T> {
    pub fn new<S: ValueStore + 'static>(structure: MenuStructure, transport: T, store: S) -> Self {
        let MenuStructure {
            id,
            label,
            text,
            layout,
            sections,
        } = structure;
        let root_text = text.unwrap_or_else(|| label.clone());
        let root = Node::new(label, section_command(&id), root_text, "", NodeKind::Root);

        let mut menu = Self {
            id,
            tree: MenuTree::new(root),
            sections: Vec::new(),
            layout: layout.validate(),
            transport,
            store: Arc::new(store),
            translator: Arc::new(NoTranslation),
        };
        for (key, spec) in sections {
            menu.attach_section(&key, spec);
        }
        info!(
            menu = %menu.id,
            sections = menu.sections.len(),
            commands = menu.tree.command_count(),
            "Menu built"
        );
        menu
    }

    pub fn with_translator(mut self, translator: impl Translator + 'static) -> Self {
        self.translator = Arc::new(translator);
        self
    }

    fn attach_section(&mut self, key: &str, spec: SectionSpec) {
        let section = SectionId(self.sections.len());
        let command = section_command(key);
        let text = spec.text.clone().unwrap_or_else(|| spec.label.clone());
        let node = Node::new(
            spec.label.clone(),
            command.clone(),
            text,
            key,
            NodeKind::Section(section),
        );
        let root = self.tree.root();
        let Some(node_id) = self.tree.append_nested(root, node, None) else {
            warn!(section = key, "Section skipped");
            return;
        };
        let structured = StructuredNode::new(key, node_id, spec);
        match structured.mode {
            SectionMode::Object => {
                let keys: Vec<String> = structured.fields.iter().map(|(k, _)| k.clone()).collect();
                self.sections.push(structured);
                for key in keys {
                    self.append_field(node_id, section, None, &key);
                }
            }
            SectionMode::Array => {
                self.sections.push(structured);
                let add = Node::new(
                    LABEL_ADD,
                    format!("{}{}", command, ADD_SUFFIX),
                    LABEL_ADD,
                    "actions",
                    NodeKind::AddItem(section),
                );
                self.tree.append_nested(node_id, add, None);
            }
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tree(&self) -> &MenuTree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn command_count(&self) -> usize {
        self.tree.command_count()
    }

    pub fn find(&self, command: &str) -> Option<NodeId> {
        self.tree.find(command)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Live layout settings, shared by every node of the menu.
    pub fn layout(&self) -> &LayoutSettings {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut LayoutSettings {
        &mut self.layout
    }

    pub fn session(&self, user: UserId) -> Session {
        Session::new(self.store.clone(), &self.id, user)
    }

    /// Appends a custom node under `holder`. Rejected (and logged) when its command already exists.
    pub fn append(&mut self, holder: NodeId, node: MenuNode) -> Option<NodeId> {
        self.tree.append_nested(holder, node.into_node(), None)
    }

    pub(crate) fn translate(&self, text: &str) -> String {
        self.translator.translate(text)
    }

    pub(crate) fn section(&self, id: SectionId) -> Option<&StructuredNode> {
        self.sections.get(id.0)
    }

    pub(crate) fn record(&self, section: SectionId, index: Option<usize>) -> Option<Map<String, Value>> {
        self.section(section)
            .and_then(|s| s.record(self.store.as_ref(), index))
    }

    /// Current button label of a node.
    pub fn label(&self, id: NodeId) -> String {
        let Some(node) = self.tree.node(id) else {
            return String::new();
        };
        match &node.kind {
            NodeKind::Root | NodeKind::Action(_) | NodeKind::Section(_) => node.label.get(),
            NodeKind::Item { section, index } => self.item_label(*section, *index),
            NodeKind::AddItem(_) => self.translate(LABEL_ADD),
            NodeKind::DeleteItem { .. } => self.translate(LABEL_DELETE),
            NodeKind::Field {
                section,
                index,
                key,
            } => {
                let Some(field) = self.section(*section).and_then(|s| s.field(key)) else {
                    return node.label.get();
                };
                let record = self.record(*section, *index);
                let status = field.status(
                    record.as_ref().and_then(|r| r.get(key)),
                    self.translator.as_ref(),
                );
                format!("{}: {}", self.translate(field.label()), status)
            }
            NodeKind::Choice {
                section,
                index,
                key,
                value,
            } => {
                let Some(field) = self.section(*section).and_then(|s| s.field(key)) else {
                    return value.clone();
                };
                let label = match field.kind() {
                    FieldKind::List(list) => {
                        list.label_of(value).unwrap_or(value.as_str()).to_string()
                    }
                    _ => value.clone(),
                };
                let chosen = self
                    .record(*section, *index)
                    .and_then(|r| r.get(key).cloned())
                    .is_some_and(|current| current.as_str() == Some(value.as_str()));
                if chosen {
                    format!("{}{}", CHOSEN_MARK, label)
                } else {
                    label
                }
            }
        }
    }

    fn item_label(&self, section: SectionId, index: usize) -> String {
        let Some(structured) = self.section(section) else {
            return format!("#{}", index);
        };
        if let Some(primary_id) = &structured.primary_id {
            if let Some(record) = structured.record(self.store.as_ref(), Some(index)) {
                return primary_id(&Value::Object(record));
            }
        }
        let prefix = self.translate(&structured.item_label);
        format!("{} #{}", prefix, index).trim_start().to_string()
    }

    /// Message text shown when a node is drawn.
    pub fn text(&self, id: NodeId) -> String {
        let Some(node) = self.tree.node(id) else {
            return String::new();
        };
        match &node.kind {
            NodeKind::Root | NodeKind::Action(_) | NodeKind::Section(_) => node.text.get(),
            NodeKind::Item { section, .. } => self
                .section(*section)
                .and_then(|s| s.item_text.as_deref())
                .map(|text| self.translate(text))
                .unwrap_or_else(|| self.label(id)),
            NodeKind::Field { section, key, .. } => self
                .section(*section)
                .and_then(|s| s.field(key))
                .map(|field| self.translate(field.prompt()))
                .unwrap_or_else(|| node.text.get()),
            NodeKind::AddItem(_) | NodeKind::DeleteItem { .. } | NodeKind::Choice { .. } => {
                self.label(id)
            }
        }
    }
}
