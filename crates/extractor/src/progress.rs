//! Progress events parsed from yt-dlp output
//!
//! yt-dlp is run with a progress template that prints one marked line per
//! update: `[mediabot:progress] <status>|<percent>|<speed>`.

/// Prefix of the progress lines produced by our `--progress-template`
pub const PROGRESS_MARKER: &str = "[mediabot:progress]";

/// Prefix of the metadata line produced by our `--print` template
pub const METADATA_MARKER: &str = "[mediabot:meta]";

/// Stage reported by the tool alongside a progress update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    Downloading,
    Finished,
    Error,
    Other,
}

impl ProgressPhase {
    fn parse(status: &str) -> Self {
        match status.trim() {
            "downloading" => ProgressPhase::Downloading,
            "finished" => ProgressPhase::Finished,
            "error" => ProgressPhase::Error,
            _ => ProgressPhase::Other,
        }
    }
}

/// A single progress update from the tool
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub phase: ProgressPhase,
    /// Completion in percent, `None` when the tool could not tell
    pub percent: Option<f64>,
    /// Human readable speed, e.g. `1.21MiB/s`
    pub speed: Option<String>,
}

impl ProgressEvent {
    pub fn downloading(percent: f64, speed: &str) -> Self {
        Self {
            phase: ProgressPhase::Downloading,
            percent: Some(percent),
            speed: Some(speed.to_string()),
        }
    }
}

/// Parse a progress line printed by yt-dlp
///
/// Returns `None` for lines that do not carry our progress marker.
pub fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    let line = strip_ansi(line);
    let start = line.find(PROGRESS_MARKER)?;
    let rest = &line[start + PROGRESS_MARKER.len()..];

    let mut fields = rest.splitn(3, '|');
    let phase = ProgressPhase::parse(fields.next()?);
    let percent = fields.next().and_then(parse_percent);
    let speed = fields.next().and_then(|s| {
        let s = s.trim();
        if s.is_empty() || s == "NA" || s.starts_with("Unknown") {
            None
        } else {
            Some(s.to_string())
        }
    });

    Some(ProgressEvent { phase, percent, speed })
}

fn parse_percent(field: &str) -> Option<f64> {
    field.trim().trim_end_matches('%').trim().parse::<f64>().ok()
}

/// Remove terminal colour sequences (`ESC [ ... m`)
fn strip_ansi(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' && chars.peek() == Some(&'[') {
            chars.next();
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        out.push(c);
    }
    out
}
