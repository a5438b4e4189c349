use std::fs;

use onco_core::NormalizerConfig;
use onco_normalize::normalize_json_str;
use serde_json::Value;

fn fixture_path(name: &str) -> String {
    format!("{}/tests/data/{name}", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn patient_row_matches_golden() {
    let row = fs::read_to_string(fixture_path("nsclc_patient_row.json"))
        .expect("fixture row should be readable");

    let record =
        normalize_json_str(&row, &NormalizerConfig::default()).expect("row should normalize");
    let actual = serde_json::to_value(&record).expect("record should serialize");

    let expected = fs::read_to_string(fixture_path("nsclc_patient_record.json"))
        .expect("golden record should be readable");
    let expected: Value = serde_json::from_str(&expected).expect("golden record is valid JSON");

    assert_eq!(actual, expected);
}

#[test]
fn repeated_normalization_is_byte_identical() {
    let row = fs::read_to_string(fixture_path("nsclc_patient_row.json"))
        .expect("fixture row should be readable");
    let config = NormalizerConfig::default();

    let first = serde_json::to_string(&normalize_json_str(&row, &config).unwrap()).unwrap();
    let second = serde_json::to_string(&normalize_json_str(&row, &config).unwrap()).unwrap();

    assert_eq!(first, second);
}
