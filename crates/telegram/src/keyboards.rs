//! Inline keyboard builders for interactive bot menus

use extractor::MediaMode;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::constants::messages;
use crate::types::DownloadRequest;

/// Create the video/audio choice keyboard for a link
///
/// # Arguments
/// * `url` - The link the user sent
///
/// # Returns
/// A single row with one button per output format
pub fn format_choice_keyboard(url: &str) -> InlineKeyboardMarkup {
    let video = DownloadRequest::new(url, MediaMode::Video);
    let audio = DownloadRequest::new(url, MediaMode::Audio);

    let buttons = vec![vec![
        InlineKeyboardButton::callback(messages::VIDEO_BUTTON, video.to_payload()),
        InlineKeyboardButton::callback(messages::AUDIO_BUTTON, audio.to_payload()),
    ]];

    InlineKeyboardMarkup::new(buttons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    fn payloads(keyboard: &InlineKeyboardMarkup) -> Vec<String> {
        keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .map(|button| match &button.kind {
                InlineKeyboardButtonKind::CallbackData(data) => data.clone(),
                other => panic!("Unexpected button kind: {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_format_choice_keyboard() {
        let keyboard = format_choice_keyboard("https://youtu.be/abc123");
        assert_eq!(keyboard.inline_keyboard.len(), 1);
        assert_eq!(keyboard.inline_keyboard[0].len(), 2);
        assert_eq!(
            payloads(&keyboard),
            vec![
                "video|https://youtu.be/abc123".to_string(),
                "audio|https://youtu.be/abc123".to_string(),
            ]
        );
    }

    #[test]
    fn test_button_labels() {
        let keyboard = format_choice_keyboard("https://youtu.be/abc123");
        assert_eq!(keyboard.inline_keyboard[0][0].text, messages::VIDEO_BUTTON);
        assert_eq!(keyboard.inline_keyboard[0][1].text, messages::AUDIO_BUTTON);
    }
}
