// Common data models for the picking pipeline

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Codec handed to yt-dlp's audio extraction post-processor.
pub const AUDIO_CODEC: &str = "mp3";

/// Target bitrate for the converted audio.
pub const AUDIO_QUALITY: &str = "192K";

/// Raw metadata returned by `yt-dlp -J --flat-playlist`.
///
/// Kept loosely typed on purpose: the classifier is the only place that looks
/// inside it, everything downstream works on `Classified` / `DisplayItem`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionResult(serde_json::Value);

impl ExtractionResult {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    /// Title of the playlist or video, when yt-dlp reported one.
    pub fn title(&self) -> Option<&str> {
        self.0.get("title").and_then(|t| t.as_str())
    }

    /// Pretty-printed JSON cut to at most `max_chars` characters.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let pretty = serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string());
        match pretty.char_indices().nth(max_chars) {
            Some((cut, _)) => format!("{}\n… ({} more characters)", &pretty[..cut], pretty[cut..].chars().count()),
            None => pretty,
        }
    }
}

impl From<serde_json::Value> for ExtractionResult {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Which shape the analyzed URL has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Playlist,
    Chapters,
    Single,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Playlist => write!(f, "playlist"),
            Self::Chapters => write!(f, "chapters"),
            Self::Single => write!(f, "single"),
        }
    }
}

/// One selectable unit as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayItem {
    /// 1-based, dense, in extractor order
    pub position: usize,
    pub label: String,
}

/// Positions the user wants downloaded (sorted, unique).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet(BTreeSet<usize>);

impl SelectionSet {
    /// Every position `1..=n`.
    pub fn full(n: usize) -> Self {
        Self((1..=n).collect())
    }

    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `"1,3,7"`
    pub fn to_csv(&self) -> String {
        self.positions().map(|p| p.to_string()).collect::<Vec<_>>().join(",")
    }
}

impl FromIterator<usize> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Mode-specific instruction telling yt-dlp which subset to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SelectorToken {
    /// Value for `--playlist-items`
    PlaylistItems(String),
    /// Anchored alternation over chapter indices, e.g. `^(1|3)$`
    ChapterPattern(String),
    /// Single video: the one item is always targeted
    Whole,
}

/// Start/end (seconds) of a selected chapter as reported by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChapterRange {
    pub start: f64,
    pub end: f64,
}

/// How the selected chapters are cut out of the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ChapterSections {
    /// Every chapter chosen: fetch the whole video and split it by chapter
    SplitAll,
    /// Anchored alternation over the selected chapter titles, regex-escaped
    Titles(String),
    /// One `*start-end` section per selected chapter
    Ranges(Vec<ChapterRange>),
    /// Neither titles nor times usable; the index pattern is passed as is
    IndexPattern,
}

/// Everything the download backend needs for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadPlan {
    pub url: String,
    pub mode: Mode,
    pub selection: SelectionSet,
    pub selector: SelectorToken,
    /// yt-dlp output template (file name only, no directory)
    pub output_template: String,
    /// Chapter mode only
    pub chapters: Option<ChapterSections>,
}

/// Files produced by one download run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadReport {
    pub mode: Mode,
    pub staging_dir: PathBuf,
    pub files: Vec<PathBuf>,
}

impl DownloadReport {
    pub fn file_names(&self) -> Vec<String> {
        self.files
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .collect()
    }
}

/// Network settings shared by extraction and download calls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// SOCKS5/HTTP proxy URL (e.g., "socks5://127.0.0.1:1080")
    pub proxy: Option<String>,
    /// Path to cookies.txt file
    pub cookies_path: Option<String>,
    /// Browser to read cookies from (chrome, firefox, ...)
    pub cookies_from_browser: Option<String>,
    /// Passes `--no-check-certificates`
    pub skip_cert_check: bool,
    /// `--socket-timeout` in seconds
    pub socket_timeout: Option<u32>,
}

/// Download options
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Freshly emptied directory the run writes into
    pub staging_dir: PathBuf,
    pub network: NetworkConfig,
    pub timeout_seconds: u64,
}

/// Download progress information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadProgress {
    pub percent: f32,
    pub status: String,
}
