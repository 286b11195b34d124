//! Callback query handler for the format choice buttons

use crate::download;
use crate::types::{DownloadRequest, HandlerResult};
use extractor::YtDlpApi;
use teloxide::prelude::*;

/// Handle a press on one of the format buttons
///
/// The download runs on its own task so the dispatcher keeps serving the
/// chat, including further button presses, while it is in flight.
pub async fn handle_callback(bot: Bot, q: CallbackQuery, extractor: YtDlpApi) -> HandlerResult {
    // Answer callback query to remove loading state
    bot.answer_callback_query(&q.id).await?;

    let data = match q.data {
        Some(ref data) => data,
        None => return Ok(()),
    };

    let request = match DownloadRequest::from_payload(data) {
        Some(request) => request,
        None => {
            tracing::warn!("Unknown callback data: {}", data);
            return Ok(());
        }
    };

    let message = match q.message {
        Some(msg) => msg,
        None => {
            tracing::warn!("Callback from user {} without a message", q.from.id);
            return Ok(());
        }
    };

    tracing::info!(
        "User {} chose {} in chat {}",
        q.from.id,
        request.mode,
        message.chat.id
    );

    tokio::spawn(download::run_for_message(bot, message, extractor, request));
    Ok(())
}
