// Item normalization and the "NN. title" option labels shown to the user

use serde_json::Value;

use super::classifier::Classified;
use super::models::DisplayItem;

/// Label for entries that are not JSON objects. They keep their position.
pub const UNREADABLE_LABEL: &str = "Unreadable item";

/// Project the classified record into dense 1-based display items.
///
/// Positions come from enumeration order only; index-like fields inside the
/// entries (`playlist_index`, chapter numbers) are ignored.
pub fn normalize(classified: &Classified) -> Vec<DisplayItem> {
    classified
        .raw_items()
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            let position = idx + 1;
            DisplayItem {
                position,
                label: resolve_label(raw, position),
            }
        })
        .collect()
}

fn resolve_label(raw: &Value, position: usize) -> String {
    let Some(record) = raw.as_object() else {
        return UNREADABLE_LABEL.to_string();
    };

    ["title", "section_title"]
        .iter()
        .filter_map(|key| record.get(*key))
        .find_map(text_of)
        .unwrap_or_else(|| format!("Item {}", position))
}

fn text_of(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Render the option label: two-digit zero padded position, dot, space, text.
pub fn render_option(item: &DisplayItem) -> String {
    format!("{:02}. {}", item.position, item.label)
}

/// Recover the position from an option label produced by [`render_option`].
pub fn parse_option(option: &str) -> Option<usize> {
    let (prefix, _) = option.trim_start().split_once('.')?;
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    prefix.parse().ok()
}
