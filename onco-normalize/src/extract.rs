//! Single-cell extractors: delimited lists, lab panels, presence markers.

use onco_core::LabItem;

use crate::record::NULL_MARKER;

const NEGATIVE_MARKERS: [&str; 3] = [NULL_MARKER, "no", "none"];

/// Empty, blank, or the textual null marker.
pub fn is_absent(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NULL_MARKER)
}

/// True unless the value is empty or one of `nan`, `no`, `none` (any case).
pub fn is_present(raw: &str) -> bool {
    let trimmed = raw.trim();
    !trimmed.is_empty()
        && !NEGATIVE_MARKERS
            .iter()
            .any(|marker| trimmed.eq_ignore_ascii_case(marker))
}

/// Split a `|`-delimited cell into trimmed, non-empty items.
pub fn parse_delimited_list(raw: &str) -> Vec<String> {
    if is_absent(raw) {
        return Vec::new();
    }
    split_delimited(raw)
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Parse a free-text lab panel such as `"Sodium: 140|Potassium: 4.2"` or
/// `"Hb10.8 WBC3.4 Plt165"`.
pub fn parse_lab_panel(raw: &str) -> Vec<LabItem> {
    if is_absent(raw) {
        return Vec::new();
    }

    let normalized = raw.replace([';', ','], "|");
    let segments = if normalized.split('|').count() == 1 && raw.contains(' ') {
        split_space_separated_panel(raw)
    } else {
        split_key_value_panel(&normalized)
    };

    segments.into_iter().map(parse_lab_segment).collect()
}

fn split_delimited(raw: &str) -> Vec<&str> {
    raw.split('|')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

fn split_key_value_panel(normalized: &str) -> Vec<&str> {
    split_delimited(normalized)
}

fn split_space_separated_panel(raw: &str) -> Vec<&str> {
    raw.split_whitespace().collect()
}

fn parse_lab_segment(segment: &str) -> LabItem {
    if let Some((label, value)) = segment.split_once(':') {
        return LabItem::new(label.trim(), value.trim());
    }

    match segment.find(|c: char| c.is_ascii_digit()) {
        Some(idx) => LabItem::new(segment[..idx].trim(), segment[idx..].trim()),
        None => LabItem::new(segment, ""),
    }
}
