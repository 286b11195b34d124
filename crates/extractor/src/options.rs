//! Typed yt-dlp options
//!
//! The tool is configured per download mode. Video downloads pick a stream
//! that Telegram's player handles natively so nothing is re-encoded; audio
//! downloads take the best audio stream and transcode it to a lossy codec.

use std::path::{Path, PathBuf};

use crate::progress::{METADATA_MARKER, PROGRESS_MARKER};

/// Codec the audio post-processor converts to
pub const AUDIO_CODEC: &str = "mp3";

/// Target bitrate for the audio post-processor, in kbps
pub const AUDIO_BITRATE_KBPS: u32 = 192;

/// Container that Telegram plays inline without conversion
pub const VIDEO_CONTAINER: &str = "mp4";

/// Output format chosen by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaMode {
    Video,
    Audio,
}

impl MediaMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaMode::Video => "video",
            MediaMode::Audio => "audio",
        }
    }
}

impl std::fmt::Display for MediaMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MediaMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(MediaMode::Video),
            "audio" => Ok(MediaMode::Audio),
            _ => Err(format!("Unknown media mode: {}", s)),
        }
    }
}

/// Mode-specific stream selection and post-processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatSelection {
    /// Best single stream already packed in `container`
    Video { container: String },
    /// Best audio stream, transcoded to `codec` at `bitrate_kbps`
    Audio { codec: String, bitrate_kbps: u32 },
}

impl FormatSelection {
    /// Default selection for a mode
    pub fn for_mode(mode: MediaMode) -> Self {
        match mode {
            MediaMode::Video => FormatSelection::Video {
                container: VIDEO_CONTAINER.to_string(),
            },
            MediaMode::Audio => FormatSelection::Audio {
                codec: AUDIO_CODEC.to_string(),
                bitrate_kbps: AUDIO_BITRATE_KBPS,
            },
        }
    }

    /// Extension of the file the tool leaves behind once post-processing ran
    pub fn final_extension(&self) -> Option<&str> {
        match self {
            FormatSelection::Video { .. } => None,
            FormatSelection::Audio { codec, .. } => Some(codec),
        }
    }

    fn push_args(&self, args: &mut Vec<String>) {
        match self {
            FormatSelection::Video { container } => {
                args.push("-f".to_string());
                args.push(format!("best[ext={}]", container));
            }
            FormatSelection::Audio { codec, bitrate_kbps } => {
                args.push("-f".to_string());
                args.push("bestaudio/best".to_string());
                args.push("--extract-audio".to_string());
                args.push("--audio-format".to_string());
                args.push(codec.clone());
                args.push("--audio-quality".to_string());
                args.push(format!("{}K", bitrate_kbps));
            }
        }
    }
}

/// Everything yt-dlp needs for one download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Output path template, e.g. `downloads/<id>.%(ext)s`
    pub output_template: PathBuf,
    pub quiet: bool,
    pub no_warnings: bool,
    pub format: FormatSelection,
}

impl ExtractOptions {
    /// Build the options for one request
    ///
    /// # Arguments
    /// * `mode` - Output format chosen by the user
    /// * `download_dir` - Directory the file is written to
    /// * `request_id` - Unique id used as the file stem
    pub fn for_mode(mode: MediaMode, download_dir: &Path, request_id: &str) -> Self {
        Self {
            output_template: download_dir.join(format!("{}.%(ext)s", request_id)),
            quiet: true,
            no_warnings: true,
            format: FormatSelection::for_mode(mode),
        }
    }

    /// Render the options as a yt-dlp command line ending with `url`
    pub fn to_args(&self, url: &str) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            self.output_template.to_string_lossy().into_owned(),
            "--newline".to_string(),
            "--no-playlist".to_string(),
            "--no-simulate".to_string(),
            // --print implies --quiet, --progress brings the progress lines back
            "--progress".to_string(),
            "--progress-template".to_string(),
            format!(
                "download:{} %(progress.status)s|%(progress._percent_str)s|%(progress._speed_str)s",
                PROGRESS_MARKER
            ),
            "--print".to_string(),
            format!("video:{} %(.{{title,filename}})j", METADATA_MARKER),
        ];

        if self.quiet {
            args.push("--quiet".to_string());
        }
        if self.no_warnings {
            args.push("--no-warnings".to_string());
        }

        self.format.push_args(&mut args);

        args.push("--".to_string());
        args.push(url.to_string());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_pair(args: &[String], flag: &str, value: &str) -> bool {
        args.windows(2).any(|w| w[0] == flag && w[1] == value)
    }

    #[test]
    fn test_media_mode_parse() {
        assert_eq!("video".parse::<MediaMode>(), Ok(MediaMode::Video));
        assert_eq!("audio".parse::<MediaMode>(), Ok(MediaMode::Audio));
        assert!("Video".parse::<MediaMode>().is_err());
        assert!("".parse::<MediaMode>().is_err());
        assert_eq!(MediaMode::Audio.to_string(), "audio");
    }

    #[test]
    fn test_output_template_uses_request_id() {
        let opts = ExtractOptions::for_mode(MediaMode::Video, Path::new("downloads"), "0123abcd");
        assert_eq!(opts.output_template, Path::new("downloads").join("0123abcd.%(ext)s"));
        assert!(opts.quiet);
        assert!(opts.no_warnings);
    }

    #[test]
    fn test_video_args() {
        let opts = ExtractOptions::for_mode(MediaMode::Video, Path::new("downloads"), "id");
        let args = opts.to_args("https://youtu.be/abc123");

        assert!(has_pair(&args, "-f", "best[ext=mp4]"));
        assert!(!args.iter().any(|a| a == "--extract-audio"));
        assert!(args.iter().any(|a| a == "--quiet"));
        assert!(args.iter().any(|a| a == "--no-warnings"));
        // URL comes last, behind the end-of-options marker
        assert_eq!(args[args.len() - 2], "--");
        assert_eq!(args[args.len() - 1], "https://youtu.be/abc123");
    }

    #[test]
    fn test_audio_args() {
        let opts = ExtractOptions::for_mode(MediaMode::Audio, Path::new("downloads"), "id");
        let args = opts.to_args("https://youtu.be/abc123");

        assert!(has_pair(&args, "-f", "bestaudio/best"));
        assert!(args.iter().any(|a| a == "--extract-audio"));
        assert!(has_pair(&args, "--audio-format", "mp3"));
        assert!(has_pair(&args, "--audio-quality", "192K"));
    }

    #[test]
    fn test_quiet_flags_optional() {
        let mut opts = ExtractOptions::for_mode(MediaMode::Video, Path::new("d"), "id");
        opts.quiet = false;
        opts.no_warnings = false;
        let args = opts.to_args("https://youtu.be/x");
        assert!(!args.iter().any(|a| a == "--quiet"));
        assert!(!args.iter().any(|a| a == "--no-warnings"));
    }

    #[test]
    fn test_markers_in_templates() {
        let opts = ExtractOptions::for_mode(MediaMode::Video, Path::new("d"), "id");
        let args = opts.to_args("https://youtu.be/x");
        assert!(args.iter().any(|a| a.starts_with("download:") && a.contains(PROGRESS_MARKER)));
        assert!(args.iter().any(|a| a.starts_with("video:") && a.contains(METADATA_MARKER)));
        assert!(args.iter().any(|a| a.ends_with("%(.{title,filename})j")));
    }

    #[test]
    fn test_final_extension() {
        assert_eq!(FormatSelection::for_mode(MediaMode::Audio).final_extension(), Some("mp3"));
        assert_eq!(FormatSelection::for_mode(MediaMode::Video).final_extension(), None);
    }
}
