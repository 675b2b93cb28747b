// Mode classification: decide playlist / chapters / single from raw metadata
//
// This is the single validation boundary for the loosely typed yt-dlp record.
// Null playlist entries (removed or private videos) are dropped here; nothing
// downstream probes the raw JSON again.

use serde_json::Value;

use super::models::{ExtractionResult, Mode};

/// Raw record split by operating mode.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// Non-null playlist entries, extractor order
    Playlist(Vec<Value>),
    /// Chapter records as given
    Chapters(Vec<Value>),
    /// The whole record
    Single(Value),
}

impl Classified {
    pub fn mode(&self) -> Mode {
        match self {
            Self::Playlist(_) => Mode::Playlist,
            Self::Chapters(_) => Mode::Chapters,
            Self::Single(_) => Mode::Single,
        }
    }

    /// Raw entries in the order positions are assigned.
    pub fn raw_items(&self) -> &[Value] {
        match self {
            Self::Playlist(entries) => entries,
            Self::Chapters(chapters) => chapters,
            Self::Single(record) => std::slice::from_ref(record),
        }
    }
}

/// Classify an extraction result. `None` means extraction produced nothing.
pub fn classify(result: Option<&ExtractionResult>) -> Option<Classified> {
    let value = result?.as_value();
    if value.is_null() {
        return None;
    }

    if let Some(entries) = value.get("entries").and_then(Value::as_array) {
        let kept: Vec<Value> = entries.iter().filter(|e| !e.is_null()).cloned().collect();
        tracing::debug!(
            total = entries.len(),
            kept = kept.len(),
            "classified as playlist"
        );
        return Some(Classified::Playlist(kept));
    }

    if let Some(chapters) = value.get("chapters").and_then(Value::as_array) {
        if !chapters.is_empty() {
            tracing::debug!(chapters = chapters.len(), "classified as chaptered video");
            return Some(Classified::Chapters(chapters.clone()));
        }
    }

    Some(Classified::Single(value.clone()))
}
