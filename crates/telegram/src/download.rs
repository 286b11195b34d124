//! Download orchestration
//!
//! One button press runs one request through
//! `Initializing -> Downloading -> Uploading -> Done | Failed`.
//! Every request owns its status message and a uniquely named file in the
//! download directory; nothing else is shared between requests.

use std::future::Future;
use std::path::{Path, PathBuf};

use extractor::{
    cleanup_partial_download, find_output_file, generate_request_id, normalize_audio_extension,
    ExtractOptions, FormatSelection, MediaExtractor, MediaInfo, MediaMode, YtDlpApi,
};
use teloxide::prelude::*;
use teloxide::types::InputFile;
use tokio::sync::mpsc;

use crate::constants::{emoji, messages, MAX_UPLOAD_SIZE};
use crate::error::{BotError, BotResult, UserMessage};
use crate::progress::ProgressReporter;
use crate::status::{StatusHandle, TelegramStatus};
use crate::types::DownloadRequest;
use crate::utils::{escape_markdown_v2, format_bytes};

/// Lifecycle stage of a download request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStage {
    Initializing,
    Downloading,
    Uploading,
    Done,
    Failed,
}

/// Sends a finished file to the chat
pub trait MediaSender: Send + Sync {
    fn send_media(
        &self,
        mode: MediaMode,
        path: &Path,
        title: &str,
    ) -> impl Future<Output = BotResult<()>> + Send;
}

/// Uploads files to a Telegram chat as audio or video
pub struct TelegramUploader {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramUploader {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

impl MediaSender for TelegramUploader {
    fn send_media(
        &self,
        mode: MediaMode,
        path: &Path,
        title: &str,
    ) -> impl Future<Output = BotResult<()>> + Send {
        let file = InputFile::file(path.to_path_buf());
        let title = title.to_string();
        async move {
            match mode {
                MediaMode::Audio => {
                    self.bot.send_audio(self.chat_id, file).title(title).await?;
                }
                MediaMode::Video => {
                    self.bot
                        .send_video(self.chat_id, file)
                        .caption(title)
                        .supports_streaming(true)
                        .await?;
                }
            }
            Ok(())
        }
    }
}

pub fn initializing_text(mode: MediaMode) -> String {
    format!("{} *Initializing {} download\\.\\.\\.*", emoji::HOURGLASS, mode)
}

pub fn uploading_text() -> String {
    format!("{} *Uploading to Telegram\\.\\.\\.*", emoji::UPLOAD)
}

pub fn error_text(err: &BotError) -> String {
    escape_markdown_v2(&err.user_message())
}

fn fallback_title(mode: MediaMode) -> &'static str {
    match mode {
        MediaMode::Video => messages::FALLBACK_VIDEO_TITLE,
        MediaMode::Audio => messages::FALLBACK_AUDIO_TITLE,
    }
}

/// Run a request from a format button press in a Telegram chat
///
/// `message` is the menu message the button belongs to; it becomes the
/// status message.
pub async fn run_for_message(bot: Bot, message: Message, extractor: YtDlpApi, request: DownloadRequest) {
    let status = TelegramStatus::attach(bot.clone(), &message);
    let uploader = TelegramUploader::new(bot, message.chat.id);
    run_download(request, status, &extractor, &uploader).await;
}

/// Drive one request to a terminal stage
///
/// Never fails: any error is shown in the status message and logged.
///
/// # Returns
/// `DownloadStage::Done` or `DownloadStage::Failed`
pub async fn run_download<S, E, U>(
    request: DownloadRequest,
    mut status: S,
    extractor: &E,
    uploader: &U,
) -> DownloadStage
where
    S: StatusHandle,
    E: MediaExtractor,
    U: MediaSender,
{
    let request_id = generate_request_id();
    tracing::info!("[{}] {} download requested: {}", request_id, request.mode, request.url);

    let mut stage = DownloadStage::Initializing;
    match process(&request, &request_id, &mut status, extractor, uploader, &mut stage).await {
        Ok(()) => {
            if let Err(e) = status.delete().await {
                tracing::warn!("[{}] Failed to delete status message: {}", request_id, e);
            }
            tracing::info!("[{}] Download delivered", request_id);
            DownloadStage::Done
        }
        Err(err) => {
            tracing::error!("[{}] Download failed while {:?}: {}", request_id, stage, err);

            let removed = cleanup_partial_download(extractor.download_dir(), &request_id).await;
            if removed > 0 {
                tracing::debug!("[{}] Removed {} leftover files", request_id, removed);
            }

            if let Err(e) = status.edit_text(error_text(&err)).await {
                tracing::warn!("[{}] Failed to show error: {}", request_id, e);
            }
            DownloadStage::Failed
        }
    }
}

async fn process<S, E, U>(
    request: &DownloadRequest,
    request_id: &str,
    status: &mut S,
    extractor: &E,
    uploader: &U,
    stage: &mut DownloadStage,
) -> BotResult<()>
where
    S: StatusHandle,
    E: MediaExtractor,
    U: MediaSender,
{
    status.edit_text(initializing_text(request.mode)).await?;

    let options = ExtractOptions::for_mode(request.mode, extractor.download_dir(), request_id);
    let format = options.format.clone();

    *stage = DownloadStage::Downloading;
    let info = download_with_progress(extractor, options, &request.url, status).await?;
    let path = resolve_output_path(&info, &format, extractor.download_dir(), request_id).await;
    tracing::debug!("[{}] Downloaded to {}", request_id, path.display());

    *stage = DownloadStage::Uploading;
    status.edit_text(uploading_text()).await?;
    let title = info.title.as_deref().unwrap_or(fallback_title(request.mode));
    let uploaded = upload_file(uploader, request.mode, &path, title).await;

    // The local copy goes whether or not the upload made it
    if let Err(e) = tokio::fs::remove_file(&path).await {
        tracing::warn!("[{}] Failed to remove {}: {}", request_id, path.display(), e);
    }

    uploaded
}

/// Run the extractor while relaying its progress to the status message
async fn download_with_progress<S, E>(
    extractor: &E,
    options: ExtractOptions,
    url: &str,
    status: &mut S,
) -> BotResult<MediaInfo>
where
    S: StatusHandle,
    E: MediaExtractor,
{
    let reporter = ProgressReporter::new();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let extraction = extractor.extract(options, url.to_string(), tx);
    tokio::pin!(extraction);

    let result = loop {
        tokio::select! {
            result = &mut extraction => break result,
            Some(event) = rx.recv() => reporter.on_progress(&event, status).await,
        }
    };

    // Events the tool reported just before it exited
    while let Ok(event) = rx.try_recv() {
        reporter.on_progress(&event, status).await;
    }

    Ok(result?)
}

/// Work out where the finished file actually is
///
/// The predicted name is corrected for the audio post-processor first; if
/// that file is missing, the download directory is searched for the
/// request id.
async fn resolve_output_path(
    info: &MediaInfo,
    format: &FormatSelection,
    download_dir: &Path,
    request_id: &str,
) -> PathBuf {
    let predicted = match format.final_extension() {
        Some(ext) => normalize_audio_extension(&info.predicted_path, ext),
        None => info.predicted_path.clone(),
    };

    if tokio::fs::metadata(&predicted).await.is_ok() {
        return predicted;
    }

    match find_output_file(download_dir, request_id).await {
        Some(found) => {
            tracing::debug!("Predicted {} missing, using {}", predicted.display(), found.display());
            found
        }
        None => predicted,
    }
}

async fn upload_file<U: MediaSender>(uploader: &U, mode: MediaMode, path: &Path, title: &str) -> BotResult<()> {
    let size = tokio::fs::metadata(path).await?.len();
    if size > MAX_UPLOAD_SIZE {
        return Err(BotError::Message(format!(
            "File is too large for Telegram ({}, limit {})",
            format_bytes(size),
            format_bytes(MAX_UPLOAD_SIZE)
        )));
    }
    uploader.send_media(mode, path, title).await
}
