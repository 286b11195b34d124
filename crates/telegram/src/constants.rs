//! Constants used throughout the telegram bot

/// Substrings that mark a message as a supported link (canonical and short form)
pub const LINK_MARKERS: [&str; 2] = ["youtube.com", "youtu.be"];

/// Separates the action from the URL in button payloads
pub const PAYLOAD_DELIMITER: char = '|';

/// Telegram rejects callback data longer than this (bytes)
pub const MAX_CALLBACK_DATA_LEN: usize = 64;

/// Largest file the Bot API accepts for upload (50 MiB)
pub const MAX_UPLOAD_SIZE: u64 = 50 * 1024 * 1024;

/// Number of segments in the progress gauge, each worth 10%
pub const GAUGE_WIDTH: usize = 10;

pub const GAUGE_FILLED: &str = "▰";
pub const GAUGE_EMPTY: &str = "▱";

/// Emoji constants for consistent UI
pub mod emoji {
    pub const ERROR: &str = "❌";
    pub const SEARCH: &str = "🔎";
    pub const POINT_DOWN: &str = "👇";
    pub const HOURGLASS: &str = "⏳";
    pub const DOWNLOAD: &str = "⏬";
    pub const UPLOAD: &str = "📤";
    pub const SPEED: &str = "⚡";
}

/// Fixed bot replies
pub mod messages {
    pub const WELCOME: &str = "🤖 YouTube Downloader Bot\n\n\
        Send me any YouTube link (Video or Short) and I will download it for you!\n\n\
        ✨ Features:\n\
        ✅ Best quality MP4 video\n\
        ✅ High Quality Audio (MP3)\n\
        ✅ Real-time Progress Bar";
    pub const INVALID_LINK: &str = "❌ Please send a valid YouTube link.";
    pub const LINK_TOO_LONG: &str = "❌ This link is too long to handle. Please send the short youtu.be link instead.";
    pub const HELP_FOOTER: &str = "Send a YouTube link (video or short) and pick Video or Audio from the menu.";
    pub const NOT_TEXT: &str = "Please send me a YouTube link as a text message. Type /help to see the usage.";
    pub const VIDEO_BUTTON: &str = "🎥 Video (Best Quality)";
    pub const AUDIO_BUTTON: &str = "🎵 Audio Only (MP3)";
    pub const FALLBACK_VIDEO_TITLE: &str = "Video";
    pub const FALLBACK_AUDIO_TITLE: &str = "Audio";
}
