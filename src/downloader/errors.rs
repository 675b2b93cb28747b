// Error taxonomy for the analyze / download actions

use serde::Serialize;
use thiserror::Error;

use super::extractors::{diagnose_error, BlockingReason};

#[derive(Debug, Error)]
pub enum PickerError {
    /// No URL was given to the analyze action
    #[error("Please paste a YouTube URL first")]
    InputMissing,

    /// yt-dlp could not produce metadata for the URL
    #[error("Could not read the URL: {message}")]
    ExtractionFailed {
        message: String,
        reason: Option<BlockingReason>,
    },

    /// Extraction worked but nothing selectable came back
    #[error("No downloadable items were found at this URL")]
    NoItemsFound,

    /// Download requested before a successful analysis
    #[error("Analyze a URL before downloading")]
    NotAnalyzed,

    /// Export or packaging asked for before any download delivered files
    #[error("Nothing has been downloaded yet")]
    NoDownloadYet,

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// yt-dlp ran without raising but left the staging directory empty
    /// (region lock, takedown, silent upstream block)
    #[error("The download finished but produced no files (region lock, removed video, or upstream block)")]
    DownloadProducedNothing,

    /// yt-dlp itself failed (spawn error, timeout, fatal exit)
    #[error("Download failed: {0}")]
    DownloadRaised(String),

    /// yt-dlp, python or ffmpeg not found
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("File is not part of the last download: {0}")]
    UnknownFile(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(String),
}

impl PickerError {
    /// Build an `ExtractionFailed` from yt-dlp stderr, tagging the likely blocking reason.
    pub fn extraction(stderr: &str) -> Self {
        let reason = diagnose_error(stderr);
        let detail = stderr
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .take(3)
            .collect::<Vec<_>>()
            .join(" | ");

        let message = match reason {
            Some(r) if r != BlockingReason::Unknown => format!("{} ({})", r.description(), detail),
            _ if detail.is_empty() => "yt-dlp returned no metadata".to_string(),
            _ => detail,
        };

        Self::ExtractionFailed { message, reason }
    }

    /// Stable tag the frontend switches on.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InputMissing => "input_missing",
            Self::ExtractionFailed { .. } => "extraction_failed",
            Self::NoItemsFound => "no_items_found",
            Self::NotAnalyzed => "not_analyzed",
            Self::NoDownloadYet => "no_download_yet",
            Self::InvalidSelection(_) => "invalid_selection",
            Self::DownloadProducedNothing => "download_produced_nothing",
            Self::DownloadRaised(_) => "download_raised",
            Self::ToolNotFound(_) => "tool_not_found",
            Self::UnknownFile(_) => "unknown_file",
            Self::Io(_) => "io",
            Self::Archive(_) => "archive",
        }
    }
}

impl PickerError {
    /// Hint shown under the message, when there is a useful one.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::ExtractionFailed { reason, .. } => reason.and_then(|r| r.suggestion()),
            Self::ToolNotFound(_) => {
                Some("Install yt-dlp (pip install -U yt-dlp) and ffmpeg, or set YTDLP_PATH.".to_string())
            }
            Self::DownloadProducedNothing => {
                Some("Try again with browser cookies (YTMP3_COOKIES_BROWSER) or a proxy (YTMP3_PROXY).".to_string())
            }
            Self::InvalidSelection(_) | Self::NotAnalyzed => Some("Run Analyze again and re-select items.".to_string()),
            Self::NoDownloadYet => Some("Download a selection first, then export it.".to_string()),
            _ => None,
        }
    }
}

/// Error as delivered to the frontend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorView {
    pub kind: &'static str,
    pub message: String,
    pub suggestion: Option<String>,
}

impl From<&PickerError> for ErrorView {
    fn from(e: &PickerError) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
            suggestion: e.suggestion(),
        }
    }
}

impl From<PickerError> for ErrorView {
    fn from(e: PickerError) -> Self {
        Self::from(&e)
    }
}

impl From<zip::result::ZipError> for PickerError {
    fn from(e: zip::result::ZipError) -> Self {
        Self::Archive(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_error_carries_blocking_reason() {
        let err = PickerError::extraction("ERROR: [youtube] abc: Video unavailable\n");
        match err {
            PickerError::ExtractionFailed { reason, message } => {
                assert_eq!(reason, Some(BlockingReason::VideoUnavailable));
                assert!(message.contains("Video unavailable"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_stderr_still_reports_failure() {
        let err = PickerError::extraction("");
        assert_eq!(err.kind(), "extraction_failed");
        assert!(err.to_string().contains("no metadata"));
    }

    #[test]
    fn error_view_carries_kind_and_hint() {
        let view = ErrorView::from(PickerError::ToolNotFound("yt-dlp".to_string()));
        assert_eq!(view.kind, "tool_not_found");
        assert!(view.message.contains("yt-dlp"));
        assert!(view.suggestion.unwrap().contains("pip install"));

        let view = ErrorView::from(PickerError::InputMissing);
        assert_eq!(view.kind, "input_missing");
        assert_eq!(view.suggestion, None);
    }

    #[test]
    fn missing_report_is_not_an_empty_download() {
        let view = ErrorView::from(PickerError::NoDownloadYet);
        assert_eq!(view.kind, "no_download_yet");
        assert_ne!(view.kind, PickerError::DownloadProducedNothing.kind());
        assert!(view.suggestion.unwrap().contains("Download"));
    }
}
