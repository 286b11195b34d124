//! Basic bot commands (start, help) and the fallback reply

use crate::constants::messages;
use crate::types::{Command, HandlerResult};
use teloxide::{prelude::*, utils::command::BotCommands};

/// Welcome message when user starts the bot
pub async fn start(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, messages::WELCOME).await?;
    Ok(())
}

/// Display help message with available commands
pub async fn help(bot: Bot, msg: Message) -> HandlerResult {
    let text = format!("{}\n\n{}", Command::descriptions(), messages::HELP_FOOTER);
    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

/// Anything that is neither a command nor text
pub async fn invalid_state(bot: Bot, msg: Message) -> HandlerResult {
    tracing::debug!("Ignoring non-text message {} in chat {}", msg.id, msg.chat.id);
    bot.send_message(msg.chat.id, messages::NOT_TEXT).await?;
    Ok(())
}
