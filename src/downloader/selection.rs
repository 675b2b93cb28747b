// Selection reconciliation: chosen option labels -> positions -> yt-dlp selector

use std::collections::HashSet;

use serde_json::Value;

use super::classifier::{classify, Classified};
use super::errors::PickerError;
use super::models::{
    ChapterRange, ChapterSections, DisplayItem, DownloadPlan, ExtractionResult, Mode, SelectionSet, SelectorToken,
};
use super::normalizer::parse_option;

/// Positions plus the selector token derived from them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub selection: SelectionSet,
    pub selector: SelectorToken,
}

/// Map chosen `"NN. title"` labels back to positions. Nothing chosen means everything.
pub fn reconcile(
    mode: Mode,
    items: &[DisplayItem],
    chosen: &[String],
) -> Result<Reconciled, PickerError> {
    let selection = if chosen.is_empty() {
        SelectionSet::full(items.len())
    } else {
        chosen
            .iter()
            .map(|option| {
                parse_option(option)
                    .filter(|p| (1..=items.len()).contains(p))
                    .ok_or_else(|| PickerError::InvalidSelection(option.clone()))
            })
            .collect::<Result<SelectionSet, _>>()?
    };

    let selector = selector_for(mode, &selection);
    Ok(Reconciled {
        selection,
        selector,
    })
}

pub fn selector_for(mode: Mode, selection: &SelectionSet) -> SelectorToken {
    match mode {
        Mode::Playlist => SelectorToken::PlaylistItems(selection.to_csv()),
        Mode::Chapters => {
            let alternation = selection
                .positions()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join("|");
            SelectorToken::ChapterPattern(format!("^({})$", alternation))
        }
        Mode::Single => SelectorToken::Whole,
    }
}

/// yt-dlp output template. Title text comes from yt-dlp's own metadata.
pub fn output_template(mode: Mode, add_number: bool) -> String {
    let (number, title) = match mode {
        Mode::Playlist => ("%(playlist_index)02d", "%(title)s"),
        Mode::Chapters => ("%(section_number)02d", "%(section_title)s"),
        Mode::Single => ("01", "%(title)s"),
    };
    if add_number {
        format!("{}. {}.%(ext)s", number, title)
    } else {
        format!("{}.%(ext)s", title)
    }
}

/// Output template for time-range sections. yt-dlp leaves the section
/// number and title empty for those, so the section bounds keep names apart.
pub fn range_template() -> String {
    "%(title)s %(section_start)s-%(section_end)s.%(ext)s".to_string()
}

/// Decide how yt-dlp should cut the selected chapters.
///
/// A full selection splits the whole video. Otherwise chapters are matched
/// by title when every title is present and unique, then by start/end time,
/// and only as a last resort by the index pattern.
pub fn chapter_sections(chapters: &[Value], selection: &SelectionSet) -> ChapterSections {
    if selection.len() == chapters.len() {
        return ChapterSections::SplitAll;
    }
    if let Some(pattern) = title_pattern(chapters, selection) {
        return ChapterSections::Titles(pattern);
    }
    let ranges = chapter_ranges(chapters, selection);
    if !ranges.is_empty() {
        return ChapterSections::Ranges(ranges);
    }
    tracing::warn!(
        "chapter titles and times unusable, falling back to index pattern; yt-dlp matches it against chapter titles"
    );
    ChapterSections::IndexPattern
}

/// `^(?:Intro|Solo \(live\))$` over the selected titles, if all chapter titles are usable.
pub fn title_pattern(chapters: &[Value], selection: &SelectionSet) -> Option<String> {
    let titles: Vec<&str> = chapters
        .iter()
        .map(|c| c.get("title").and_then(Value::as_str).filter(|t| !t.trim().is_empty()))
        .collect::<Option<_>>()?;
    let unique: HashSet<&str> = titles.iter().copied().collect();
    if unique.len() != titles.len() {
        return None;
    }

    let alternation = selection
        .positions()
        .map(|p| titles.get(p.checked_sub(1)?).map(|t| regex::escape(t)))
        .collect::<Option<Vec<_>>>()?
        .join("|");
    Some(format!("^(?:{})$", alternation))
}

/// Time ranges of the selected chapters, or empty if any of them lacks usable times.
pub fn chapter_ranges(chapters: &[Value], selection: &SelectionSet) -> Vec<ChapterRange> {
    let ranges: Option<Vec<ChapterRange>> = selection
        .positions()
        .map(|p| {
            let chapter = chapters.get(p.checked_sub(1)?)?;
            let start = chapter.get("start_time")?.as_f64()?;
            let end = chapter.get("end_time")?.as_f64()?;
            (end > start).then_some(ChapterRange { start, end })
        })
        .collect();

    ranges.unwrap_or_default()
}

/// Build the complete download request for the current analysis.
pub fn plan_download(
    url: &str,
    raw: &ExtractionResult,
    mode: Mode,
    items: &[DisplayItem],
    chosen: &[String],
    add_number: bool,
) -> Result<DownloadPlan, PickerError> {
    let Reconciled {
        selection,
        selector,
    } = reconcile(mode, items, chosen)?;

    let chapters = match (mode, classify(Some(raw))) {
        (Mode::Chapters, Some(Classified::Chapters(chapters))) => {
            Some(chapter_sections(&chapters, &selection))
        }
        (Mode::Chapters, _) => Some(ChapterSections::IndexPattern),
        _ => None,
    };
    let output_template = match chapters {
        Some(ChapterSections::Ranges(_)) => range_template(),
        _ => output_template(mode, add_number),
    };

    Ok(DownloadPlan {
        url: url.to_string(),
        mode,
        selection,
        selector,
        output_template,
        chapters,
    })
}
