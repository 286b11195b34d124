//! The single chat message that shows where a download is at

use std::future::Future;

use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode};

use crate::error::BotResult;

/// Handle to a status message that is edited in place
///
/// Implementations remember the text they last set so callers can skip
/// edits that would not change anything.
pub trait StatusHandle: Send {
    /// Text currently shown
    fn current_text(&self) -> &str;

    /// Replace the text (MarkdownV2)
    fn edit_text(&mut self, text: String) -> impl Future<Output = BotResult<()>> + Send;

    /// Remove the message from the chat
    fn delete(self) -> impl Future<Output = BotResult<()>> + Send;
}

/// Status message living in a Telegram chat
pub struct TelegramStatus {
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
    text: String,
}

impl TelegramStatus {
    /// Take over an existing message, e.g. the one carrying the format menu
    pub fn attach(bot: Bot, message: &Message) -> Self {
        Self {
            bot,
            chat_id: message.chat.id,
            message_id: message.id,
            text: message.text().unwrap_or_default().to_string(),
        }
    }
}

impl StatusHandle for TelegramStatus {
    fn current_text(&self) -> &str {
        &self.text
    }

    fn edit_text(&mut self, text: String) -> impl Future<Output = BotResult<()>> + Send {
        async move {
            self.bot
                .edit_message_text(self.chat_id, self.message_id, text.clone())
                .parse_mode(ParseMode::MarkdownV2)
                .await?;
            self.text = text;
            Ok(())
        }
    }

    fn delete(self) -> impl Future<Output = BotResult<()>> + Send {
        async move {
            self.bot.delete_message(self.chat_id, self.message_id).await?;
            Ok(())
        }
    }
}
