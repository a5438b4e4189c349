//! Clinical event synthesis and partial-date ordering.

use onco_core::{ClinicalEvent, NormalizerConfig};

use crate::dates::{self, DateStrategy};
use crate::record::RawRecord;

/// How one source column is turned into an event.
#[derive(Debug, Clone, Copy)]
enum SourceKind {
    /// Date field with a companion field supplying the description.
    Dated { companion: &'static str },
    /// Date field with a companion field rendered as `"Site: X"`.
    Sited { companion: &'static str },
    /// Date followed by embedded result text.
    Imaging,
    /// Free text ending in a four-digit year.
    Surgery,
    /// Start date plus regimen, line and response timeline.
    TreatmentStart,
}

#[derive(Debug, Clone, Copy)]
struct EventSource {
    field: &'static str,
    label: &'static str,
    kind: SourceKind,
}

/// Construction order; ties in the sort key keep this order.
const EVENT_SOURCES: [EventSource; 7] = [
    EventSource {
        field: "Diagnosis_Date",
        label: "Diagnosis",
        kind: SourceKind::Dated {
            companion: "Primary_Diagnosis",
        },
    },
    EventSource {
        field: "Biopsy_Date",
        label: "Biopsy",
        kind: SourceKind::Sited {
            companion: "Biopsy_Site",
        },
    },
    EventSource {
        field: "Latest_Brain_MRI",
        label: "Brain MRI",
        kind: SourceKind::Imaging,
    },
    EventSource {
        field: "Latest_PET_CT",
        label: "PET/CT",
        kind: SourceKind::Imaging,
    },
    EventSource {
        field: "Latest_CT_Chest",
        label: "CT Chest",
        kind: SourceKind::Imaging,
    },
    EventSource {
        field: "Surgery",
        label: "Surgery",
        kind: SourceKind::Surgery,
    },
    EventSource {
        field: "Treatment_Dates",
        label: "Treatment start",
        kind: SourceKind::TreatmentStart,
    },
];

/// Imaging text longer than this carries a result after the date.
const EMBEDDED_DATE_LEN: usize = 10;

/// Build every event the record supports, sorted by partial-date key.
pub fn synthesize(raw: &RawRecord, config: &NormalizerConfig) -> Vec<ClinicalEvent> {
    let mut events: Vec<ClinicalEvent> = EVENT_SOURCES
        .iter()
        .filter_map(|source| build_event(raw, source, config))
        .collect();

    // `sort_by_key` is stable: equal keys keep construction order.
    events.sort_by_key(|event| event.sort_key);
    events
}

fn build_event(
    raw: &RawRecord,
    source: &EventSource,
    config: &NormalizerConfig,
) -> Option<ClinicalEvent> {
    let value = raw.get_optional_string(source.field)?;
    let strategy = DateStrategy::for_field(source.field, config);

    let (date, description) = match source.kind {
        SourceKind::Dated { companion } => {
            let date = dates::reconcile(&value, strategy).display_fragment();
            let description = raw
                .get_optional_string(companion)
                .unwrap_or_else(|| source.label.to_string());
            (date, description)
        }
        SourceKind::Sited { companion } => {
            let date = dates::reconcile(&value, strategy).display_fragment();
            let description = raw
                .get_optional_string(companion)
                .map(|site| format!("Site: {site}"))
                .unwrap_or_else(|| source.label.to_string());
            (date, description)
        }
        SourceKind::Imaging => {
            let date = dates::reconcile(&value, strategy).display_fragment();
            (date, imaging_description(&value, source.label))
        }
        SourceKind::Surgery => split_surgery(&value),
        SourceKind::TreatmentStart => {
            let start = value.split_whitespace().next().unwrap_or("");
            if start.chars().count() < EMBEDDED_DATE_LEN {
                tracing::debug!(value = %value, "treatment dates carry no full start date");
                return None;
            }
            let date = dates::reconcile(start, strategy).display_fragment();
            (date, treatment_description(raw))
        }
    };

    Some(ClinicalEvent {
        sort_key: dates::sort_key(&date),
        date,
        label: source.label.to_string(),
        description,
        source_field: source.field.to_string(),
    })
}

fn imaging_description(value: &str, label: &str) -> String {
    let embedded: String = value.chars().skip(EMBEDDED_DATE_LEN).collect();
    let embedded = embedded.trim_matches(|c: char| matches!(c, ' ' | '-' | ':'));
    let description = if embedded.is_empty() { label } else { embedded };

    if description.to_lowercase().contains(&label.to_lowercase()) {
        description.to_string()
    } else {
        format!("{label} - {description}")
    }
}

/// `"RUL lobectomy 2023"` → (`"2023"`, `"RUL lobectomy"`); no trailing year
/// leaves the date empty.
fn split_surgery(value: &str) -> (String, String) {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    match tokens.split_last() {
        Some((last, rest)) if last.len() == 4 && last.bytes().all(|b| b.is_ascii_digit()) => {
            (last.to_string(), rest.join(" "))
        }
        _ => (String::new(), value.to_string()),
    }
}

fn treatment_description(raw: &RawRecord) -> String {
    let mut parts = Vec::new();
    if let Some(regimen) = raw.get_optional_string("Regimen") {
        parts.push(regimen);
    }
    if let Some(line) = raw.get_optional_string("Current_Line") {
        parts.push(format!("(Line {line})"));
    }

    let mut description = parts.join(" ");
    if let Some(timeline) = raw.get_optional_string("Treatment_Response_Timeline") {
        description.push('\n');
        description.push_str(&timeline);
    }
    description
}
