//! Download progress shown in the status message
//!
//! The gauge is ten segments wide, one per 10%. The reporter turns raw
//! extractor events into status edits, but only on every tenth percent and
//! never with text the message already shows, so a fast download does not
//! run into Telegram's edit flood limits.

use extractor::{ProgressEvent, ProgressPhase};

use crate::constants::{emoji, GAUGE_EMPTY, GAUGE_FILLED, GAUGE_WIDTH};
use crate::error::BotResult;
use crate::status::StatusHandle;
use crate::utils::escape_markdown_v2;

/// Render a percentage as a ten segment gauge
///
/// Input outside `0..=100` is not clamped: negative values render empty and
/// values above 100 render more than ten filled segments.
pub fn render_gauge(percent: f64) -> String {
    let filled = (percent / 10.0).floor().max(0.0) as usize;
    let empty = GAUGE_WIDTH.saturating_sub(filled);
    format!("{}{}", GAUGE_FILLED.repeat(filled), GAUGE_EMPTY.repeat(empty))
}

/// Text shown while the download is running
pub fn downloading_text(percent: f64, speed: &str) -> String {
    format!(
        "{} *Downloading\\.\\.\\.*\n{} {}%\n\n{} Speed: {}",
        emoji::DOWNLOAD,
        render_gauge(percent),
        escape_markdown_v2(&format!("{:.1}", percent)),
        emoji::SPEED,
        escape_markdown_v2(speed)
    )
}

/// Throttled adapter from extractor progress to status edits
#[derive(Debug, Default, Clone, Copy)]
pub struct ProgressReporter;

impl ProgressReporter {
    pub fn new() -> Self {
        Self
    }

    /// Handle one progress event
    ///
    /// Failures are logged and dropped: a missed progress update must never
    /// abort the download it describes.
    pub async fn on_progress<S: StatusHandle>(&self, event: &ProgressEvent, target: &mut S) {
        match self.update(event, target).await {
            Ok(true) => {}
            Ok(false) => tracing::trace!("Progress update skipped: {:?}", event),
            Err(e) => tracing::debug!("Progress update failed: {}", e),
        }
    }

    /// Edit the status message for `event` if it warrants an edit
    ///
    /// # Returns
    /// * `Ok(true)` if the message was edited
    /// * `Ok(false)` if the event was filtered out
    pub async fn update<S: StatusHandle>(&self, event: &ProgressEvent, target: &mut S) -> BotResult<bool> {
        if event.phase != ProgressPhase::Downloading {
            return Ok(false);
        }

        // yt-dlp prints `N/A%` until it knows the total size
        let Some(percent) = event.percent else {
            return Ok(false);
        };
        let whole = percent.trunc() as i64;
        // 100% is left to the orchestrator, which switches to the upload banner
        if whole % 10 != 0 || whole == 100 {
            return Ok(false);
        }

        let text = downloading_text(percent, event.speed.as_deref().unwrap_or("N/A"));
        if target.current_text() == text {
            return Ok(false);
        }

        target.edit_text(text).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BotError;
    use crate::status::tests::FakeStatus;
    use extractor::progress::parse_progress_line;

    #[test]
    fn test_gauge_length() {
        for p in 0..=100 {
            assert_eq!(render_gauge(p as f64).chars().count(), GAUGE_WIDTH, "percent {}", p);
        }
    }

    #[test]
    fn test_gauge_bounds() {
        assert_eq!(render_gauge(0.0), GAUGE_EMPTY.repeat(10));
        assert_eq!(render_gauge(100.0), GAUGE_FILLED.repeat(10));
        assert_eq!(render_gauge(35.0), format!("{}{}", GAUGE_FILLED.repeat(3), GAUGE_EMPTY.repeat(7)));
        assert_eq!(render_gauge(9.99), GAUGE_EMPTY.repeat(10));
    }

    #[test]
    fn test_gauge_out_of_range() {
        assert_eq!(render_gauge(-5.0), GAUGE_EMPTY.repeat(10));
        assert_eq!(render_gauge(120.0), GAUGE_FILLED.repeat(12));
    }

    #[test]
    fn test_downloading_text() {
        let text = downloading_text(40.0, "1.21MiB/s");
        assert!(text.contains(&render_gauge(40.0)));
        assert!(text.contains("40\\.0%"));
        assert!(text.contains("1\\.21MiB/s"));
    }

    #[tokio::test]
    async fn test_reporter_throttles_and_dedupes() {
        let reporter = ProgressReporter::new();
        let mut status = FakeStatus::new("⏳ Initializing");

        for p in [5.0, 10.0, 10.0, 20.0, 99.0, 100.0] {
            reporter
                .on_progress(&ProgressEvent::downloading(p, "1.00MiB/s"), &mut status)
                .await;
        }

        let edits = status.edits();
        assert_eq!(edits.len(), 2);
        assert_eq!(edits[0], downloading_text(10.0, "1.00MiB/s"));
        assert_eq!(edits[1], downloading_text(20.0, "1.00MiB/s"));
    }

    #[tokio::test]
    async fn test_reporter_ignores_other_phases() {
        let reporter = ProgressReporter::new();
        let mut status = FakeStatus::new("");

        let event = ProgressEvent {
            phase: ProgressPhase::Finished,
            percent: Some(50.0),
            speed: Some("1.00MiB/s".to_string()),
        };
        assert!(!reporter.update(&event, &mut status).await.unwrap());
        assert!(status.edits().is_empty());
    }

    #[tokio::test]
    async fn test_reporter_handles_missing_fields() {
        let reporter = ProgressReporter::new();
        let mut status = FakeStatus::new("");

        let event = ProgressEvent {
            phase: ProgressPhase::Downloading,
            percent: Some(30.0),
            speed: None,
        };
        reporter.on_progress(&event, &mut status).await;
        assert_eq!(status.edits(), vec![downloading_text(30.0, "N/A")]);

        // No percent at all is not a step
        let event = ProgressEvent {
            phase: ProgressPhase::Downloading,
            percent: None,
            speed: None,
        };
        assert!(!reporter.update(&event, &mut status).await.unwrap());
        assert_eq!(status.edits().len(), 1);
    }

    #[tokio::test]
    async fn test_reporter_ignores_unknown_percent() {
        let reporter = ProgressReporter::new();
        let mut status = FakeStatus::new("");

        for speed in ["1.10MiB/s", "1.20MiB/s", "1.30MiB/s", "1.40MiB/s", "1.50MiB/s"] {
            let line = format!("[mediabot:progress] downloading|  N/A%|{}", speed);
            let event = parse_progress_line(&line).unwrap();
            reporter.on_progress(&event, &mut status).await;
        }

        assert!(status.edits().is_empty());
    }

    #[tokio::test]
    async fn test_reporter_swallows_edit_failures() {
        let reporter = ProgressReporter::new();
        let mut status = FakeStatus::new("");
        status.fail_edits_with("Bad Request: message to edit not found");

        // Must not panic or propagate
        reporter
            .on_progress(&ProgressEvent::downloading(10.0, "1.00MiB/s"), &mut status)
            .await;

        let result = reporter
            .update(&ProgressEvent::downloading(20.0, "1.00MiB/s"), &mut status)
            .await;
        assert!(matches!(result, Err(BotError::Message(_))));
        assert_eq!(status.current_text(), "");
    }
}
