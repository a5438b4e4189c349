//! Raw oncology patient row to `StructuredRecord` normalizer.
//!
//! Every entry point is a pure function of one row: the same input always
//! yields the same record.

pub mod alerts;
pub mod dataset;
pub mod dates;
pub mod extract;
pub mod insights;
pub mod record;
pub mod sections;
pub mod timeline;

use onco_core::{NormalizerConfig, RecordError, StructuredRecord, Timeline};
use serde::Deserialize;
use serde_json::Value;

pub use dataset::Dataset;
pub use extract::{is_present, parse_delimited_list, parse_lab_panel};
pub use insights::{augment, AugmentedRecord, InsightError, InsightProvider, OfflineInsights};
pub use record::{RawRecord, RawValue};

/// Normalize one raw row into a structured record.
pub fn normalize_record(raw: &RawRecord, config: &NormalizerConfig) -> StructuredRecord {
    let clinical_alerts = alerts::evaluate(raw, config);

    StructuredRecord {
        header: sections::header(raw, clinical_alerts),
        disease_status: sections::disease_status(raw),
        timeline: Timeline {
            events: timeline::synthesize(raw, config),
            treatment_dates: raw.get_string("Treatment_Dates"),
            context: sections::treatment_context(raw),
        },
        organ_risk: sections::organ_risk(raw, config),
        comorbidities: sections::comorbidities(raw),
        evidence: sections::evidence(raw),
    }
}

/// Normalize a row given as a JSON object string.
pub fn normalize_json_str(
    row_json: &str,
    config: &NormalizerConfig,
) -> Result<StructuredRecord, RecordError> {
    let value: Value =
        serde_json::from_str(row_json).map_err(|err| RecordError::Parse(err.to_string()))?;
    normalize_json_value(&value, config)
}

/// Normalize a row given as a `serde_json::Value` object.
pub fn normalize_json_value(
    row: &Value,
    config: &NormalizerConfig,
) -> Result<StructuredRecord, RecordError> {
    if !row.is_object() {
        return Err(RecordError::Parse(
            "Expected a JSON object with one patient row".to_string(),
        ));
    }
    let raw = RawRecord::deserialize(row).map_err(|err| RecordError::Parse(err.to_string()))?;
    Ok(normalize_record(&raw, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizing_twice_is_identical() {
        let raw = RawRecord::new()
            .with("Name", "Jane Roe")
            .with("Diagnosis_Date", "01-02-2023")
            .with("Surgery", "Lobectomy 2023")
            .with("CBC", "Hb10.8 WBC3.4");
        let config = NormalizerConfig::default();
        let first = serde_json::to_string(&normalize_record(&raw, &config)).unwrap();
        let second = serde_json::to_string(&normalize_record(&raw, &config)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_row_degrades_to_empty_sections() {
        let record = normalize_record(&RawRecord::new(), &NormalizerConfig::default());
        assert_eq!(record.header.name, "");
        assert_eq!(record.header.stage_progression, " -> ");
        assert!(record.events().is_empty());
        assert!(record.alerts().is_empty());
        assert_eq!(record.evidence.genomics.mutations.len(), 9);
    }

    #[test]
    fn json_entry_points() {
        let record =
            normalize_json_str(r#"{"Name": "A", "Age": 61}"#, &NormalizerConfig::default())
                .unwrap();
        assert_eq!(record.header.age, 61);
        assert!(matches!(
            normalize_json_str("[1, 2]", &NormalizerConfig::default()),
            Err(RecordError::Parse(_))
        ));
        assert!(matches!(
            normalize_json_str(r#"{"Name": {"nested": true}}"#, &NormalizerConfig::default()),
            Err(RecordError::Parse(_))
        ));
    }
}
