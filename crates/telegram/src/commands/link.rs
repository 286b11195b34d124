//! Link validation and the format choice menu

use teloxide::prelude::*;
use teloxide::types::InlineKeyboardMarkup;

use extractor::MediaMode;

use crate::constants::{emoji, messages, MAX_CALLBACK_DATA_LEN};
use crate::keyboards;
use crate::types::{DownloadRequest, HandlerResult};
use crate::utils::{is_supported_link, short_youtube_link};

/// Reply to an inbound text message
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// Echo the link back with the video/audio buttons
    Menu {
        text: String,
        keyboard: InlineKeyboardMarkup,
    },
    /// Fixed rejection, nothing else happens
    Rejected(&'static str),
}

fn fits_in_payload(url: &str) -> bool {
    [MediaMode::Video, MediaMode::Audio]
        .iter()
        .all(|mode| DownloadRequest::new(url, *mode).to_payload().len() <= MAX_CALLBACK_DATA_LEN)
}

/// Decide how to answer a text message
pub fn route_text(text: &str) -> RouteOutcome {
    let url = text.trim();
    if !is_supported_link(url) {
        return RouteOutcome::Rejected(messages::INVALID_LINK);
    }

    // Long watch links with playlist or tracking parameters do not fit into
    // a button payload; the short form carries the same video
    let payload_url = if fits_in_payload(url) {
        url.to_string()
    } else {
        match short_youtube_link(url).filter(|short| fits_in_payload(short)) {
            Some(short) => short,
            None => return RouteOutcome::Rejected(messages::LINK_TOO_LONG),
        }
    };

    RouteOutcome::Menu {
        text: format!(
            "{} Found Link: {}\n{} Select a format below:",
            emoji::SEARCH,
            url,
            emoji::POINT_DOWN
        ),
        keyboard: keyboards::format_choice_keyboard(&payload_url),
    }
}

/// Handle a plain text message
pub async fn handle_link(bot: Bot, msg: Message, text: String) -> HandlerResult {
    match route_text(&text) {
        RouteOutcome::Menu { text, keyboard } => {
            tracing::info!("Presenting format menu in chat {}", msg.chat.id);
            bot.send_message(msg.chat.id, text)
                .reply_markup(keyboard)
                .await?;
        }
        RouteOutcome::Rejected(reply) => {
            tracing::debug!("Rejected message in chat {}: {}", msg.chat.id, text);
            bot.send_message(msg.chat.id, reply).await?;
        }
    }
    Ok(())
}
