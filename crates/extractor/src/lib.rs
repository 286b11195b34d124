//! yt-dlp wrapper
//!
//! This crate drives the external `yt-dlp` tool for the bot. It turns a
//! download mode into typed tool options, runs the tool off the async
//! runtime, streams its progress back over a channel and works out which
//! file the tool left on disk.

pub mod error;
pub mod options;
pub mod progress;
pub mod utils;
pub mod ytdlp;

pub use error::ExtractError;
pub use options::{ExtractOptions, FormatSelection, MediaMode};
pub use progress::{ProgressEvent, ProgressPhase};
pub use utils::{
    cleanup_partial_download, find_output_file, generate_request_id, normalize_audio_extension,
};
pub use ytdlp::{MediaExtractor, MediaInfo, YtDlpApi};
