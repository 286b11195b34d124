use extractor::MediaMode;
use teloxide::macros::BotCommands;

use crate::constants::PAYLOAD_DELIMITER;

/// Type alias for handler result types
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Available bot commands
#[derive(BotCommands, Clone)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
pub enum Command {
    #[command(description = "Show the welcome message")]
    Start,
    #[command(description = "Display help information")]
    Help,
}

/// A download the user asked for by pressing a format button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub mode: MediaMode,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>, mode: MediaMode) -> Self {
        Self {
            url: url.into(),
            mode,
        }
    }

    /// Encode as button payload: `<action>|<url>`
    pub fn to_payload(&self) -> String {
        format!("{}{}{}", self.mode.as_str(), PAYLOAD_DELIMITER, self.url)
    }

    /// Decode a button payload
    ///
    /// Only the first delimiter separates the action, so URLs that happen to
    /// contain `|` survive intact.
    pub fn from_payload(data: &str) -> Option<Self> {
        let (action, url) = data.split_once(PAYLOAD_DELIMITER)?;
        if url.is_empty() {
            return None;
        }
        let mode = action.parse::<MediaMode>().ok()?;
        Some(Self::new(url, mode))
    }
}
