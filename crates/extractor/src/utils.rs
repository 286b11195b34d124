//! Utility functions for naming and cleaning up downloaded files

use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Generate a unique id for a download request
///
/// The id is used as the file stem in the download directory, so two
/// concurrent requests never write to the same file even when the media
/// titles are identical.
///
/// # Returns
/// * 32-character hexadecimal id
pub fn generate_request_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Point a predicted audio filename at the file the post-processor wrote
///
/// yt-dlp predicts the name from the downloaded stream (`.webm`, `.m4a`, ...)
/// but the audio extractor replaces the extension with the target codec.
pub fn normalize_audio_extension(path: &Path, final_extension: &str) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case(final_extension) => path.to_path_buf(),
        _ => path.with_extension(final_extension),
    }
}

/// Pick the most useful error description out of the tool's last output lines
pub fn extract_error_message(lines: &[String]) -> String {
    lines
        .iter()
        .rev()
        .find(|l| l.contains("ERROR:"))
        .or_else(|| lines.iter().rev().find(|l| !l.trim().is_empty()))
        .map(|l| l.trim().to_string())
        .unwrap_or_default()
}

/// Find a file in `dir` produced for `request_id`
///
/// Used when the predicted path does not exist, e.g. because the tool
/// merged or remuxed into another container.
pub async fn find_output_file(dir: &Path, request_id: &str) -> Option<PathBuf> {
    let mut entries = tokio::fs::read_dir(dir).await.ok()?;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if is_request_file(&name, request_id) && !is_partial(&name) {
            return Some(entry.path());
        }
    }
    None
}

/// Remove every file in `dir` that belongs to `request_id`
///
/// Covers the final file as well as `.part`, `.ytdl` and intermediate
/// files left behind by an interrupted download.
///
/// # Returns
/// Number of files removed
pub async fn cleanup_partial_download(dir: &Path, request_id: &str) -> usize {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(e) => e,
        Err(e) => {
            tracing::debug!("Cannot read download dir {}: {}", dir.display(), e);
            return 0;
        }
    };

    let mut removed = 0;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name();
        if !is_request_file(&name.to_string_lossy(), request_id) {
            continue;
        }
        match tokio::fs::remove_file(entry.path()).await {
            Ok(()) => removed += 1,
            Err(e) => tracing::warn!("Failed to remove {}: {}", entry.path().display(), e),
        }
    }
    removed
}

fn is_request_file(name: &str, request_id: &str) -> bool {
    name.strip_prefix(request_id)
        .map(|rest| rest.starts_with('.'))
        .unwrap_or(false)
}

fn is_partial(name: &str) -> bool {
    name.ends_with(".part") || name.ends_with(".ytdl") || name.contains(".part-Frag")
}
