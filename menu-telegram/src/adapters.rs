//! Adapters from Telegram (teloxide) updates to menu commands.

use menu_core::{MessageId, UserId};
use teloxide::types::{CallbackQuery, Message, User};

use crate::transport::TelegramPeer;

/// One inbound menu command extracted from a Telegram update.
#[derive(Debug, Clone)]
pub struct Inbound {
    pub peer: TelegramPeer,
    pub user: UserId,
    pub message_id: Option<MessageId>,
    pub command: String,
    pub is_event: bool,
}

pub fn user_id(user: &User) -> UserId {
    user.id.0 as i64
}

impl Inbound {
    /// A typed text message. Non-text messages carry no command.
    pub fn from_message(msg: &Message) -> Option<Self> {
        let text = msg.text()?;
        let user = msg.from.as_ref().map(user_id).unwrap_or(msg.chat.id.0);
        Some(Self {
            peer: TelegramPeer::chat(msg.chat.id),
            user,
            message_id: Some(i64::from(msg.id.0)),
            command: text.to_string(),
            is_event: false,
        })
    }

    /// A button press on a menu message.
    pub fn from_callback(query: &CallbackQuery) -> Option<Self> {
        let command = query.data.clone()?;
        let message = query.regular_message()?;
        Some(Self {
            peer: TelegramPeer {
                chat_id: message.chat.id,
                callback: Some(query.clone()),
            },
            user: user_id(&query.from),
            message_id: Some(i64::from(message.id.0)),
            command,
            is_event: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Test: user_id reads the numeric Telegram user id.**
    #[test]
    fn test_user_id() {
        let user = User {
            id: teloxide::types::UserId(123),
            is_bot: false,
            first_name: "Test".to_string(),
            last_name: Some("User".to_string()),
            username: Some("testuser".to_string()),
            language_code: Some("en".to_string()),
            is_premium: false,
            added_to_attachment_menu: false,
        };

        assert_eq!(user_id(&user), 123);
    }
}
