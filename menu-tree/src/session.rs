//! Per-user session state kept in the host value store.
//!
//! Keys are scoped as `<root>.<name>.<user>`, so several menus can share one store.

use menu_core::{MessageId, UserId, ValueStore};
use serde_json::{json, Value};
use std::sync::Arc;

const MENU_MESSAGE_ID: &str = "menuMessageId";
const LAST_COMMAND: &str = "lastCommand";
const BUTTONS_OFFSET: &str = "buttonsOffset";
const PENDING_INPUT: &str = "pendingInput";

/// Session accessors for one (menu, user) pair.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn ValueStore>,
    root: String,
    user: UserId,
}

impl Session {
    pub(crate) fn new(store: Arc<dyn ValueStore>, root: &str, user: UserId) -> Self {
        Self {
            store,
            root: root.to_string(),
            user,
        }
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    fn key(&self, name: &str) -> String {
        format!("{}.{}.{}", self.root, name, self.user)
    }

    fn get(&self, name: &str) -> Option<Value> {
        self.store.get(&self.key(name))
    }

    /// Id of the live menu message, if one was sent.
    pub fn message_id(&self) -> Option<MessageId> {
        self.get(MENU_MESSAGE_ID)
            .and_then(|v| v.as_i64())
            .filter(|id| *id != 0)
    }

    pub(crate) fn set_message_id(&self, id: MessageId) {
        self.store.set(&self.key(MENU_MESSAGE_ID), json!(id));
    }

    pub(crate) fn clear_message_id(&self) {
        self.store.remove(&self.key(MENU_MESSAGE_ID));
    }

    pub fn last_command(&self) -> Option<String> {
        self.get(LAST_COMMAND)
            .and_then(|v| v.as_str().map(str::to_string))
    }

    pub(crate) fn set_last_command(&self, command: &str) {
        if !command.is_empty() {
            self.store.set(&self.key(LAST_COMMAND), json!(command));
        }
    }

    pub(crate) fn clear_last_command(&self) {
        self.store.remove(&self.key(LAST_COMMAND));
    }

    /// Offset of the first child button shown on the current page.
    pub fn buttons_offset(&self) -> usize {
        self.get(BUTTONS_OFFSET)
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as usize
    }

    pub(crate) fn set_buttons_offset(&self, offset: usize) {
        self.store.set(&self.key(BUTTONS_OFFSET), json!(offset));
    }

    /// Command of the field waiting for a typed reply.
    pub fn pending_input(&self) -> Option<String> {
        self.get(PENDING_INPUT)
            .and_then(|v| v.as_str().map(str::to_string))
            .filter(|command| !command.is_empty())
    }

    pub(crate) fn set_pending_input(&self, command: &str) {
        self.store.set(&self.key(PENDING_INPUT), json!(command));
    }

    pub(crate) fn clear_pending_input(&self) {
        self.store.remove(&self.key(PENDING_INPUT));
    }
}
