//! In-memory patient dataset: CSV or JSON rows, lookup by name.

use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use onco_core::{NormalizerConfig, PatientSummary, RecordError, Result, StructuredRecord};

use crate::record::{RawRecord, RawValue};
use crate::{normalize_record, sections};

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<RawRecord>,
}

impl Dataset {
    pub fn new(rows: Vec<RawRecord>) -> Self {
        Self { rows }
    }

    /// Read a CSV file with a header row.
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|err| RecordError::Dataset(format!("{}: {err}", path.display())))?;
        Self::from_csv_reader(file)
    }

    /// Read CSV rows from any reader. Header cells are stripped of a leading BOM.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|err| RecordError::Dataset(format!("read headers: {err}")))?
            .iter()
            .map(|header| header.trim_matches('\u{feff}').trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record =
                record.map_err(|err| RecordError::Dataset(format!("read row {}: {err}", idx + 1)))?;
            let row: RawRecord = headers
                .iter()
                .zip(record.iter())
                .map(|(header, value)| (header.clone(), RawValue::from(value.trim())))
                .collect();
            rows.push(row);
        }

        tracing::info!(count = rows.len(), "Loaded patient rows");
        Ok(Self { rows })
    }

    /// Read a JSON array of row objects.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let rows: Vec<RawRecord> =
            serde_json::from_str(json).map_err(|err| RecordError::Parse(err.to_string()))?;
        tracing::info!(count = rows.len(), "Loaded patient rows");
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[RawRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row whose `Name` matches, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Result<&RawRecord> {
        let needle = name.trim().to_lowercase();
        self.rows
            .iter()
            .find(|row| row.get_string("Name").to_lowercase() == needle)
            .ok_or_else(|| RecordError::PatientNotFound {
                name: name.to_string(),
            })
    }

    /// Look up a patient and normalize the row.
    pub fn patient_details(
        &self,
        name: &str,
        config: &NormalizerConfig,
    ) -> Result<StructuredRecord> {
        let raw = self.find_by_name(name)?;
        Ok(normalize_record(raw, config))
    }

    /// One minimal summary per row, in dataset order.
    pub fn roster(&self) -> Vec<PatientSummary> {
        self.rows.iter().map(summarize).collect()
    }
}

fn summarize(raw: &RawRecord) -> PatientSummary {
    PatientSummary {
        uid: raw.get_string("Patient_ID"),
        name: raw.get_string("Name"),
        age: sections::age(raw),
        sex: raw.get_string("Sex"),
        primary_cancer_type: raw.get_string("Primary_Diagnosis"),
        disease_status: raw.get_string_or("Response", "Unknown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\u{feff}Patient_ID,Name,Age,Sex,Response\n\
                       P001,Jane Roe,58,F,PR\n\
                       P002,John Doe,,M,\n";

    #[test]
    fn reads_csv_and_strips_bom() {
        let dataset = Dataset::from_csv_reader(CSV.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.rows()[0].get_string("Patient_ID"), "P001");
        assert_eq!(dataset.rows()[1].get("Age"), Some(&RawValue::Empty));
    }

    #[test]
    fn lookup_ignores_case() {
        let dataset = Dataset::from_csv_reader(CSV.as_bytes()).unwrap();
        let row = dataset.find_by_name("JANE roe").unwrap();
        assert_eq!(row.get_string("Sex"), "F");
    }

    #[test]
    fn lookup_reports_missing_patient() {
        let dataset = Dataset::from_csv_reader(CSV.as_bytes()).unwrap();
        let err = dataset
            .patient_details("Nobody", &NormalizerConfig::default())
            .unwrap_err();
        assert!(matches!(err, RecordError::PatientNotFound { ref name } if name == "Nobody"));
    }

    #[test]
    fn roster_defaults() {
        let dataset = Dataset::from_csv_reader(CSV.as_bytes()).unwrap();
        let roster = dataset.roster();
        assert_eq!(roster[0].age, 58);
        assert_eq!(roster[0].disease_status, "PR");
        assert_eq!(roster[1].age, 0);
        assert_eq!(roster[1].disease_status, "Unknown");
    }

    #[test]
    fn json_rows() {
        let dataset =
            Dataset::from_json_str(r#"[{"Name": "A", "Age": 40}, {"Name": "B", "Age": null}]"#)
                .unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.find_by_name("b").unwrap().get_string("Name"), "B");
        assert!(Dataset::from_json_str("{").is_err());
    }
}
