//! Utility functions for formatting and link handling

use crate::constants::LINK_MARKERS;

/// Format a byte count with binary units, e.g. `50.0 MiB`
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}

/// Escape special characters for MarkdownV2
///
/// Escapes: \_*[]()~`>#+-=|{}.!
pub fn escape_markdown_v2(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\\' | '_' | '*' | '[' | ']' | '(' | ')' | '~' | '`' | '>' | '#' | '+' | '-' | '=' | '|' | '{' | '}' | '.' | '!' => {
                format!("\\{}", c)
            }
            _ => c.to_string(),
        })
        .collect()
}

/// Check whether a message contains a link we can download
pub fn is_supported_link(text: &str) -> bool {
    LINK_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Rewrite a watch or shorts link into the canonical `https://youtu.be/<id>` form
///
/// Drops playlist, timestamp and tracking parameters. Returns `None` when no
/// video id can be found.
pub fn short_youtube_link(url: &str) -> Option<String> {
    let id = url
        .split_once('?')
        .and_then(|(_, query)| {
            query
                .split(['&', '#'])
                .find_map(|param| param.strip_prefix("v="))
        })
        .or_else(|| {
            url.split_once("/shorts/")
                .map(|(_, rest)| rest.split(['?', '&', '#', '/']).next().unwrap_or(""))
        })?;

    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Some(format!("https://youtu.be/{}", id))
    } else {
        None
    }
}
