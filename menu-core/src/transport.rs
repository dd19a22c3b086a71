//! Transport abstraction for rendering menus.
//!
//! [`Transport`] is what a host implements to bind the engine to a chat service (Telegram, console, tests).
//! Only `make_button` and `send_message` are required; the other capabilities report a
//! configuration error when invoked without an implementation.

use async_trait::async_trait;

use crate::error::{MenuError, Result};
use crate::types::MessageId;

/// Message primitives supplied by the host.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Where messages go (chat id, console handle, ...).
    type Peer: Clone + Send + Sync + std::fmt::Debug;
    /// Rendered button type of the transport.
    type Button: Clone + Send + Sync + std::fmt::Debug;

    /// Builds a transport button carrying `command` as its payload.
    fn make_button(&self, label: &str, command: &str) -> Self::Button;

    /// Sends a new message with a button grid and returns its id.
    async fn send_message(
        &self,
        peer: &Self::Peer,
        text: &str,
        buttons: Vec<Vec<Self::Button>>,
    ) -> Result<MessageId>;

    /// Replaces text and buttons of an already-sent message.
    /// Must return [`MenuError::StaleMessage`] when the message no longer exists.
    async fn edit_message(
        &self,
        _peer: &Self::Peer,
        _message_id: MessageId,
        _text: &str,
        _buttons: Vec<Vec<Self::Button>>,
    ) -> Result<()> {
        Err(MenuError::Config("editMessage is not set".to_string()))
    }

    /// Deletes a message (the menu itself, or a user's typed reply).
    async fn delete_message(&self, _peer: &Self::Peer, _message_id: MessageId) -> Result<()> {
        Err(MenuError::Config("deleteMessage is not set".to_string()))
    }

    /// Acknowledges a button press.
    async fn confirm_callback(&self, _peer: &Self::Peer) -> Result<()> {
        Err(MenuError::Config("confirmCallback is not set".to_string()))
    }
}
