//! Host value store.
//!
//! The engine keeps both the edited data and per-user session markers in a [`ValueStore`].
//! [`MemoryStore`] is a process-local implementation for tests and demos.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// get/set/remove capability over JSON values.
pub trait ValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value);
    fn remove(&self, key: &str);
}

impl<S: ValueStore + ?Sized> ValueStore for Arc<S> {
    fn get(&self, key: &str) -> Option<Value> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Value) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

/// In-memory value store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, Value>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of keys in the store.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        debug!(key = %key, "Memory store set");
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        debug!(key = %key, "Memory store remove");
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
    }
}
