//! Telegram front end: link routing, format menu, download orchestration
//! and progress reporting

pub mod callbacks;
pub mod commands;
pub mod constants;
pub mod download;
pub mod error;
pub mod keyboards;
pub mod progress;
pub mod status;
pub mod telegram;
pub mod types;
pub mod utils;

pub use download::{run_download, DownloadStage, MediaSender, TelegramUploader};
pub use error::{BotError, BotResult, UserMessage};
pub use progress::ProgressReporter;
pub use status::{StatusHandle, TelegramStatus};
pub use types::{Command, DownloadRequest, HandlerResult};
