//! [`menu_core::Transport`] over teloxide: inline keyboards carrying commands as callback data.

use async_trait::async_trait;
use menu_core::{MenuError, MessageId, Result, Transport};
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::{ApiError, RequestError};
use tracing::warn;

/// Telegram limits callback data to 64 bytes.
pub const CALLBACK_DATA_MAX: usize = 64;

/// Where a menu is drawn: the chat, plus the button press being answered, if any.
#[derive(Debug, Clone)]
pub struct TelegramPeer {
    pub chat_id: ChatId,
    pub callback: Option<CallbackQuery>,
}

impl TelegramPeer {
    pub fn chat(chat_id: ChatId) -> Self {
        Self {
            chat_id,
            callback: None,
        }
    }
}

/// Thin wrapper around teloxide::Bot that implements the menu transport.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: teloxide::Bot,
}

impl TelegramTransport {
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    /// Returns the underlying teloxide::Bot for direct API use when needed.
    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }
}

fn markup(buttons: Vec<Vec<InlineKeyboardButton>>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(buttons)
}

fn telegram_message_id(message_id: MessageId) -> Result<teloxide::types::MessageId> {
    i32::try_from(message_id)
        .map(teloxide::types::MessageId)
        .map_err(|_| MenuError::Transport(format!("Invalid message_id: {}", message_id)))
}

/// Maps an edit failure: an unchanged message is fine, a missing one is stale.
pub(crate) fn edit_result(result: std::result::Result<(), RequestError>, message_id: MessageId) -> Result<()> {
    match result {
        Ok(()) | Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
        Err(RequestError::Api(ApiError::MessageToEditNotFound | ApiError::MessageIdInvalid)) => {
            Err(MenuError::StaleMessage(message_id))
        }
        Err(e) => Err(MenuError::Transport(e.to_string())),
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    type Peer = TelegramPeer;
    type Button = InlineKeyboardButton;

    fn make_button(&self, label: &str, command: &str) -> InlineKeyboardButton {
        if command.len() > CALLBACK_DATA_MAX {
            warn!(command = %command, "Command exceeds Telegram callback data limit");
        }
        InlineKeyboardButton::callback(label.to_string(), command.to_string())
    }

    async fn send_message(
        &self,
        peer: &TelegramPeer,
        text: &str,
        buttons: Vec<Vec<InlineKeyboardButton>>,
    ) -> Result<MessageId> {
        let sent = self
            .bot
            .send_message(peer.chat_id, text.to_string())
            .reply_markup(markup(buttons))
            .await
            .map_err(|e| MenuError::Transport(e.to_string()))?;
        Ok(i64::from(sent.id.0))
    }

    async fn edit_message(
        &self,
        peer: &TelegramPeer,
        message_id: MessageId,
        text: &str,
        buttons: Vec<Vec<InlineKeyboardButton>>,
    ) -> Result<()> {
        let id = telegram_message_id(message_id)?;
        let result = self
            .bot
            .edit_message_text(peer.chat_id, id, text.to_string())
            .reply_markup(markup(buttons))
            .await
            .map(|_| ());
        edit_result(result, message_id)
    }

    async fn delete_message(&self, peer: &TelegramPeer, message_id: MessageId) -> Result<()> {
        let id = telegram_message_id(message_id)?;
        match self.bot.delete_message(peer.chat_id, id).await {
            Ok(_) => Ok(()),
            Err(RequestError::Api(ApiError::MessageToDeleteNotFound)) => {
                Err(MenuError::StaleMessage(message_id))
            }
            Err(e) => Err(MenuError::Transport(e.to_string())),
        }
    }

    async fn confirm_callback(&self, peer: &TelegramPeer) -> Result<()> {
        let Some(query) = &peer.callback else {
            return Ok(());
        };
        self.bot
            .answer_callback_query(query.id.clone())
            .await
            .map_err(|e| MenuError::Transport(e.to_string()))?;
        Ok(())
    }
}
