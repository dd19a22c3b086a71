//! Structured sections: an object (one record) or an array (a list of records) edited through fields.
//!
//! The data lives in the host [`ValueStore`] under the section's data id. Every change is written
//! back as the whole collection and handed to the section's save callback.

use menu_core::{ValidationError, ValueStore};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

use crate::field::{FieldDescriptor, FieldPath};
use crate::layout::LayoutSettings;
use crate::text::Text;
use crate::tree::NodeId;

/// Receives the full collection after every change.
pub type SaveHook = Arc<dyn Fn(&Value) + Send + Sync>;
/// Display id of an array item, computed from its record.
pub type PrimaryId = Arc<dyn Fn(&Value) -> String + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionMode {
    Object,
    Array,
}

/// Declarative description of a section.
pub struct SectionSpec {
    pub(crate) mode: SectionMode,
    pub(crate) label: Text,
    pub(crate) text: Option<Text>,
    pub(crate) item_label: String,
    pub(crate) item_text: Option<String>,
    pub(crate) primary_id: Option<PrimaryId>,
    pub(crate) fields: Vec<(String, FieldDescriptor)>,
    pub(crate) save: Option<SaveHook>,
}

impl SectionSpec {
    fn with_mode(mode: SectionMode, label: impl Into<Text>) -> Self {
        Self {
            mode,
            label: label.into(),
            text: None,
            item_label: String::new(),
            item_text: None,
            primary_id: None,
            fields: Vec::new(),
            save: None,
        }
    }

    /// A single record edited field by field.
    pub fn object(label: impl Into<Text>) -> Self {
        Self::with_mode(SectionMode::Object, label)
    }

    /// A list of records with add/delete.
    pub fn array(label: impl Into<Text>) -> Self {
        Self::with_mode(SectionMode::Array, label)
    }

    pub fn text(mut self, text: impl Into<Text>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Adds a field; fields keep insertion order.
    pub fn field(mut self, key: impl Into<String>, field: FieldDescriptor) -> Self {
        self.fields.push((key.into(), field));
        self
    }

    pub fn save(mut self, hook: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.save = Some(Arc::new(hook));
        self
    }

    /// Label prefix of array items when no primary id is set.
    pub fn item_label(mut self, label: impl Into<String>) -> Self {
        self.item_label = label.into();
        self
    }

    pub fn item_text(mut self, text: impl Into<String>) -> Self {
        self.item_text = Some(text.into());
        self
    }

    pub fn primary_id(mut self, id: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
        self.primary_id = Some(Arc::new(id));
        self
    }
}

/// Runtime state of a section attached to the tree.
pub(crate) struct StructuredNode {
    pub(crate) data_id: String,
    pub(crate) mode: SectionMode,
    pub(crate) node: NodeId,
    pub(crate) item_label: String,
    pub(crate) item_text: Option<String>,
    pub(crate) primary_id: Option<PrimaryId>,
    pub(crate) fields: Vec<(String, FieldDescriptor)>,
    pub(crate) save: Option<SaveHook>,
}

impl StructuredNode {
    pub(crate) fn new(data_id: &str, node: NodeId, spec: SectionSpec) -> Self {
        Self {
            data_id: data_id.to_string(),
            mode: spec.mode,
            node,
            item_label: spec.item_label,
            item_text: spec.item_text,
            primary_id: spec.primary_id,
            fields: spec.fields,
            save: spec.save,
        }
    }

    pub(crate) fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, f)| f)
    }

    pub(crate) fn field_mut(&mut self, key: &str) -> Option<&mut FieldDescriptor> {
        self.fields
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, f)| f)
    }

    /// A fresh record: every field at its default, or unset.
    pub(crate) fn default_record(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|(key, field)| (key.clone(), field.default.clone().unwrap_or(Value::Null)))
            .collect()
    }

    fn items(&self, store: &dyn ValueStore) -> Vec<Value> {
        match store.get(&self.data_id) {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                warn!(data_id = %self.data_id, value = %other, "Stored data is not a list, treated as empty");
                Vec::new()
            }
        }
    }

    pub(crate) fn len(&self, store: &dyn ValueStore) -> usize {
        self.items(store).len()
    }

    /// The record a field reads from: the object itself, or the item at `index`.
    /// Object records fall back to field defaults for missing keys.
    pub(crate) fn record(&self, store: &dyn ValueStore, index: Option<usize>) -> Option<Map<String, Value>> {
        match (self.mode, index) {
            (SectionMode::Object, _) => {
                let mut record = self.default_record();
                if let Some(Value::Object(stored)) = store.get(&self.data_id) {
                    record.extend(stored);
                }
                Some(record)
            }
            (SectionMode::Array, Some(index)) => match self.items(store).into_iter().nth(index) {
                Some(Value::Object(record)) => Some(record),
                Some(_) => Some(Map::new()),
                None => None,
            },
            (SectionMode::Array, None) => None,
        }
    }

    /// Writes the whole collection to the store and hands it to the save callback.
    fn persist(&self, store: &dyn ValueStore, data: Value) {
        store.set(&self.data_id, data.clone());
        if let Some(save) = &self.save {
            save(&data);
        }
        info!(data_id = %self.data_id, "Section data saved");
    }

    fn write_record(&self, store: &dyn ValueStore, index: Option<usize>, record: Map<String, Value>) -> bool {
        match index {
            None => {
                self.persist(store, Value::Object(record));
                true
            }
            Some(index) => {
                let mut items = self.items(store);
                match items.get_mut(index) {
                    Some(slot) => {
                        *slot = Value::Object(record);
                        self.persist(store, Value::Array(items));
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// Appends a default record and returns its index.
    pub(crate) fn add_item(&self, store: &dyn ValueStore) -> usize {
        let mut items = self.items(store);
        items.push(Value::Object(self.default_record()));
        let index = items.len() - 1;
        self.persist(store, Value::Array(items));
        info!(data_id = %self.data_id, index, "Item added");
        index
    }

    /// Removes the item at `index`; later items shift down by one.
    pub(crate) fn delete_item(&self, store: &dyn ValueStore, index: usize) -> bool {
        let mut items = self.items(store);
        if index >= items.len() {
            warn!(data_id = %self.data_id, index, "Item to delete does not exist");
            return false;
        }
        items.remove(index);
        self.persist(store, Value::Array(items));
        info!(data_id = %self.data_id, index, "Item deleted");
        true
    }

    /// Attempts to set `key` to `candidate`: resets siblings, asks `on_set_before`, persists, then
    /// runs `on_set_after`. On error nothing is written.
    pub(crate) fn commit(
        &self,
        store: &dyn ValueStore,
        layout: &mut LayoutSettings,
        index: Option<usize>,
        key: &str,
        candidate: Value,
    ) -> Result<(), ValidationError> {
        let field = self
            .field(key)
            .ok_or_else(|| ValidationError::UnknownChoice(key.to_string()))?;
        if !field.editable {
            return Err(ValidationError::ReadOnly(key.to_string()));
        }
        let current = self
            .record(store, index)
            .ok_or_else(|| ValidationError::UnknownChoice(format!("{}#{:?}", self.data_id, index)))?;

        let mut next = current.clone();
        next.insert(key.to_string(), candidate);
        for reset in field.hooks.on_set_reset.iter().filter(|k| k.as_str() != key) {
            next.insert(reset.clone(), Value::Null);
        }

        let path = FieldPath {
            data_id: self.data_id.clone(),
            index,
            key: key.to_string(),
        };
        let current = Value::Object(current);
        let next = Value::Object(next);
        if let Some(before) = &field.hooks.on_set_before {
            if !before(&current, key, &next, &path) {
                warn!(path = %path, "Change rejected by on_set_before");
                return Err(ValidationError::Vetoed(key.to_string()));
            }
        }

        let record = match &next {
            Value::Object(record) => record.clone(),
            _ => Map::new(),
        };
        if !self.write_record(store, index, record) {
            return Err(ValidationError::UnknownChoice(path.to_string()));
        }
        info!(path = %path, "Field committed");

        if let Some(after) = &field.hooks.on_set_after {
            after(&next, key, &path, layout);
        }
        Ok(())
    }
}
