//! Core types: ids, transport-neutral buttons, and the [`MenuAction`] trait for custom nodes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Transport-specific message id (Telegram numeric id, console counter, ...).
pub type MessageId = i64;

/// User (or chat) id that scopes session state.
pub type UserId = i64;

/// A button as computed by the layout engine, before the transport renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub command: String,
}

impl Button {
    pub fn new(label: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            command: command.into(),
        }
    }
}

/// Rows of buttons, top to bottom.
pub type Keyboard = Vec<Vec<Button>>;

/// What a custom node action sees about the command that triggered it.
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub user_id: UserId,
    /// Id of the inbound message (the menu message for button presses), if the transport has one.
    pub message_id: Option<MessageId>,
    /// Raw command as received, modifiers included.
    pub command: String,
    pub is_event: bool,
}

/// Custom behaviour attached to a menu node. Runs when the node is the routing target.
#[async_trait]
pub trait MenuAction: Send + Sync {
    /// Returns true to request a hard redraw: the tracked menu message is deleted and a fresh one is sent.
    /// False redraws in place.
    async fn run(&self, ctx: &ActionContext) -> bool;
}
