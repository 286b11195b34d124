use serde::Deserialize;
use std::collections::VecDeque;
use std::future::Future;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedSender;

use crate::error::ExtractError;
use crate::options::ExtractOptions;
use crate::progress::{parse_progress_line, ProgressEvent, METADATA_MARKER};
use crate::utils::extract_error_message;

/// Number of output lines kept for error reporting
const OUTPUT_TAIL_LINES: usize = 50;

/// What the tool reported about the downloaded media
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaInfo {
    pub title: Option<String>,
    /// Filename predicted from the output template, before post-processing
    pub predicted_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    title: Option<String>,
    filename: Option<String>,
}

/// Something that can fetch and transcode media to local disk
///
/// Progress is handed back through `progress` from whatever thread the
/// extraction runs on; the receiving side decides what to do with it.
pub trait MediaExtractor: Send + Sync {
    /// Directory downloads are written to
    fn download_dir(&self) -> &Path;

    fn extract(
        &self,
        options: ExtractOptions,
        url: String,
        progress: UnboundedSender<ProgressEvent>,
    ) -> impl Future<Output = Result<MediaInfo, ExtractError>> + Send;
}

/// Wrapper around the yt-dlp executable
#[derive(Debug, Clone)]
pub struct YtDlpApi {
    program: PathBuf,
    base_args: Vec<String>,
    download_dir: PathBuf,
}

impl YtDlpApi {
    /// Create a new YtDlpApi
    ///
    /// # Arguments
    /// * `command` - Executable, optionally followed by leading arguments
    ///   (e.g. `yt-dlp` or `python3 -m yt_dlp`)
    /// * `download_dir` - Directory downloads are written to
    pub fn new(command: &str, download_dir: impl Into<PathBuf>) -> Self {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_else(|| "yt-dlp".to_string());
        Self {
            program: PathBuf::from(program),
            base_args: parts.collect(),
            download_dir: download_dir.into(),
        }
    }

    /// Create the download directory if it does not exist yet
    pub async fn ensure_download_dir(&self) -> Result<(), ExtractError> {
        tokio::fs::create_dir_all(&self.download_dir).await?;
        Ok(())
    }
}

impl MediaExtractor for YtDlpApi {
    fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    fn extract(
        &self,
        options: ExtractOptions,
        url: String,
        progress: UnboundedSender<ProgressEvent>,
    ) -> impl Future<Output = Result<MediaInfo, ExtractError>> + Send {
        let program = self.program.clone();
        let base_args = self.base_args.clone();
        async move {
            tracing::info!("Starting yt-dlp for {}", url);
            // yt-dlp blocks for the whole download, keep it off the runtime threads
            let handle = tokio::task::spawn_blocking(move || {
                run_blocking(&program, &base_args, &options, &url, &progress)
            });
            handle
                .await
                .map_err(|e| ExtractError::Worker(e.to_string()))?
        }
    }
}

/// Run yt-dlp to completion on the current thread
///
/// Every progress line is parsed and pushed into `progress` as soon as it
/// is read. stderr is drained on a helper thread so neither pipe fills up.
fn run_blocking(
    program: &Path,
    base_args: &[String],
    options: &ExtractOptions,
    url: &str,
    progress: &UnboundedSender<ProgressEvent>,
) -> Result<MediaInfo, ExtractError> {
    let args = options.to_args(url);
    tracing::debug!("Running {} {:?} {:?}", program.display(), base_args, args);

    let mut child = Command::new(program)
        .args(base_args)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(ExtractError::Spawn)?;

    let tail = Arc::new(Mutex::new(VecDeque::<String>::new()));

    let stderr_reader = child.stderr.take().map(|stderr| {
        let progress = progress.clone();
        let tail = Arc::clone(&tail);
        std::thread::spawn(move || read_output(stderr, &progress, &tail))
    });

    let mut metadata = match child.stdout.take() {
        Some(stdout) => match read_output(stdout, progress, &tail) {
            Ok(meta) => meta,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        },
        None => None,
    };

    if let Some(reader) = stderr_reader {
        match reader.join() {
            Ok(Ok(meta)) => metadata = metadata.or(meta),
            Ok(Err(e)) => tracing::debug!("Error reading yt-dlp stderr: {}", e),
            Err(_) => tracing::warn!("yt-dlp stderr reader panicked"),
        }
    }

    let status = child.wait()?;
    if !status.success() {
        let lines: Vec<String> = tail
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect();
        let message = extract_error_message(&lines);
        tracing::error!("yt-dlp failed ({}): {}", status, message);
        return Err(ExtractError::Failed {
            status: status.to_string(),
            message,
        });
    }

    let metadata = metadata.ok_or(ExtractError::MissingMetadata)?;
    let filename = metadata.filename.ok_or(ExtractError::MissingMetadata)?;

    Ok(MediaInfo {
        title: metadata.title.filter(|t| !t.trim().is_empty()),
        predicted_path: PathBuf::from(filename),
    })
}

/// Read one output stream line by line
///
/// Progress lines are forwarded, the metadata line is parsed and returned,
/// everything else is kept in `tail` for error reporting.
fn read_output<R: Read>(
    stream: R,
    progress: &UnboundedSender<ProgressEvent>,
    tail: &Mutex<VecDeque<String>>,
) -> Result<Option<RawMetadata>, ExtractError> {
    let mut metadata = None;

    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        // Titles in a non-UTF-8 locale must not abort the download
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']).to_string();

        if let Some(event) = parse_progress_line(&line) {
            // Receiver gone means nobody is watching any more; keep downloading
            let _ = progress.send(event);
            continue;
        }

        if let Some(json) = line.trim_start().strip_prefix(METADATA_MARKER) {
            match serde_json::from_str::<RawMetadata>(json.trim()) {
                Ok(meta) => metadata = Some(meta),
                Err(e) => tracing::warn!("Unparseable yt-dlp metadata line: {}", e),
            }
            continue;
        }

        tracing::debug!("yt-dlp: {}", line);
        let mut tail = tail.lock().unwrap_or_else(|e| e.into_inner());
        tail.push_back(line);
        if tail.len() > OUTPUT_TAIL_LINES {
            tail.pop_front();
        }
    }

    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::MediaMode;
    use crate::progress::ProgressPhase;

    /// Write a shell script standing in for yt-dlp and return an api running it
    fn fake_ytdlp(tag: &str, script: &str) -> (YtDlpApi, PathBuf) {
        let dir = std::env::temp_dir().join(format!(
            "extractor-ytdlp-{}-{}",
            tag,
            crate::utils::generate_request_id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let script_path = dir.join("fake-ytdlp.sh");
        std::fs::write(&script_path, script).unwrap();
        let api = YtDlpApi::new(&format!("sh {}", script_path.display()), dir.clone());
        (api, dir)
    }

    #[test]
    fn test_new_splits_command() {
        let api = YtDlpApi::new("python3 -m yt_dlp", "downloads");
        assert_eq!(api.program, PathBuf::from("python3"));
        assert_eq!(api.base_args, vec!["-m".to_string(), "yt_dlp".to_string()]);
        assert_eq!(api.download_dir(), Path::new("downloads"));

        let api = YtDlpApi::new("", "downloads");
        assert_eq!(api.program, PathBuf::from("yt-dlp"));
        assert!(api.base_args.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_extract_success_reports_progress_and_metadata() {
        let script = r#"
echo '[youtube] abc123: Downloading webpage'
echo '[mediabot:meta] {"title": "Test Clip", "filename": "downloads/abc.webm"}'
echo '[mediabot:progress] downloading|  10.0%|1.00MiB/s'
echo '[mediabot:progress] downloading|  20.0%|1.00MiB/s' 1>&2
echo '[mediabot:progress] finished|100.0%|N/A'
exit 0
"#;
        let (api, dir) = fake_ytdlp("ok", script);
        let options = ExtractOptions::for_mode(MediaMode::Audio, api.download_dir(), "abc");
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let info = api
            .extract(options, "https://youtu.be/abc123".to_string(), tx)
            .await
            .unwrap();

        assert_eq!(info.title.as_deref(), Some("Test Clip"));
        assert_eq!(info.predicted_path, PathBuf::from("downloads/abc.webm"));

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(events.len(), 3);
        assert!(events
            .iter()
            .filter(|e| e.phase == ProgressPhase::Downloading)
            .all(|e| e.speed.as_deref() == Some("1.00MiB/s")));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_extract_failure_carries_tool_error() {
        let script = r#"
echo '[youtube] abc123: Downloading webpage'
echo 'ERROR: [youtube] abc123: Video unavailable' 1>&2
exit 1
"#;
        let (api, dir) = fake_ytdlp("fail", script);
        let options = ExtractOptions::for_mode(MediaMode::Video, api.download_dir(), "abc");
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();

        let err = api
            .extract(options, "https://youtu.be/abc123".to_string(), tx)
            .await
            .unwrap_err();

        match &err {
            ExtractError::Failed { message, .. } => {
                assert_eq!(message, "ERROR: [youtube] abc123: Video unavailable");
            }
            other => panic!("Expected Failed, got {:?}", other),
        }
        assert!(err.to_string().contains("Video unavailable"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_extract_tolerates_non_utf8_output() {
        let script = r#"
printf '[youtube] caf\351 title\n'
printf 'WARNING: caf\351\n' 1>&2
echo '[mediabot:meta] {"title": "Cafe", "filename": "downloads/abc.mp4"}'
exit 0
"#;
        let (api, dir) = fake_ytdlp("latin1", script);
        let options = ExtractOptions::for_mode(MediaMode::Video, api.download_dir(), "abc");
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();

        let info = api
            .extract(options, "https://youtu.be/abc123".to_string(), tx)
            .await
            .unwrap();
        assert_eq!(info.title.as_deref(), Some("Cafe"));
        assert_eq!(info.predicted_path, PathBuf::from("downloads/abc.mp4"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_extract_without_metadata() {
        let (api, dir) = fake_ytdlp("nometa", "exit 0\n");
        let options = ExtractOptions::for_mode(MediaMode::Video, api.download_dir(), "abc");
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();

        let err = api
            .extract(options, "https://youtu.be/abc123".to_string(), tx)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::MissingMetadata));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_extract_missing_binary() {
        let api = YtDlpApi::new("/nonexistent/path/to/yt-dlp-7f3a", "downloads");
        let options = ExtractOptions::for_mode(MediaMode::Video, api.download_dir(), "abc");
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();

        let err = api
            .extract(options, "https://youtu.be/abc123".to_string(), tx)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Spawn(_)));
    }
}
