//! Bridge WASM <-> JavaScript trung lập framework.

use onco_core::{NormalizerConfig, RecordError};
use onco_normalize::Dataset;
use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
struct JsNormalizerConfig {
    #[serde(default)]
    day_first_fields: Option<Vec<String>>,
    #[serde(default)]
    functional_status_threshold: Option<u32>,
    #[serde(default)]
    lab_trend_default: Option<String>,
    #[serde(default)]
    pathology_uncertainty_default: Option<String>,
}

impl From<JsNormalizerConfig> for NormalizerConfig {
    fn from(cfg: JsNormalizerConfig) -> Self {
        let mut base = NormalizerConfig::default();
        if let Some(fields) = cfg.day_first_fields {
            base.day_first_fields = fields;
        }
        if let Some(threshold) = cfg.functional_status_threshold {
            base.functional_status_threshold = threshold;
        }
        if let Some(trend) = cfg.lab_trend_default {
            base.lab_trend_default = trend;
        }
        if let Some(uncertainty) = cfg.pathology_uncertainty_default {
            base.pathology_uncertainty_default = uncertainty;
        }
        base
    }
}

/// Chuẩn hoá một dòng dữ liệu bệnh nhân (object JS) thành hồ sơ có cấu trúc.
#[wasm_bindgen]
pub fn normalize_record(raw_row: JsValue, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let row_value = from_value::<serde_json::Value>(raw_row)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được dòng dữ liệu: {err}")))?;

    let cfg = read_config(config)?;

    let record = onco_normalize::normalize_json_value(&row_value, &cfg)
        .map_err(|err| JsValue::from_str(&format_record_error(err)))?;

    to_value(&record).map_err(|err| JsValue::from_str(&format!("Không serialize hồ sơ: {err}")))
}

/// Tìm bệnh nhân theo tên trong mảng dòng dữ liệu rồi chuẩn hoá.
#[wasm_bindgen]
pub fn patient_details(
    rows: JsValue,
    name: &str,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let rows_value = from_value::<serde_json::Value>(rows)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được bộ dữ liệu: {err}")))?;
    let dataset = Dataset::from_json_str(&rows_value.to_string())
        .map_err(|err| JsValue::from_str(&format_record_error(err)))?;

    let cfg = read_config(config)?;

    let record = dataset
        .patient_details(name, &cfg)
        .map_err(|err| JsValue::from_str(&format_record_error(err)))?;

    to_value(&record).map_err(|err| JsValue::from_str(&format!("Không serialize hồ sơ: {err}")))
}

fn read_config(config: Option<JsValue>) -> Result<NormalizerConfig, JsValue> {
    match config {
        Some(js_cfg) => {
            let cfg: JsNormalizerConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được config: {err}")))?;
            Ok(NormalizerConfig::from(cfg))
        }
        None => Ok(NormalizerConfig::default()),
    }
}

fn format_record_error(err: RecordError) -> String {
    format!("Record error: {err}")
}
