//! Typed access over one untyped patient row.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::extract::{is_absent, is_present};

/// Textual marker the source data uses for a missing cell.
pub const NULL_MARKER: &str = "nan";

/// One untyped cell as it arrives from the data source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawValue {
    Empty,
    Flag(bool),
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Stringified cell, with integral numbers rendered without a fraction.
    pub fn to_text(&self) -> String {
        match self {
            RawValue::Empty => String::new(),
            RawValue::Flag(flag) => flag.to_string(),
            RawValue::Number(number) => format_numeric(*number),
            RawValue::Text(text) => text.clone(),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            RawValue::Empty
        } else {
            RawValue::Text(value.to_string())
        }
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        if value.is_empty() {
            RawValue::Empty
        } else {
            RawValue::Text(value)
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            RawValue::Empty
        } else {
            RawValue::Number(value)
        }
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Number(value as f64)
    }
}

/// One patient's row of source fields. Immutable once read.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RawRecord {
    fields: BTreeMap<String, RawValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for fixtures.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Trimmed text of a field; missing, blank and the null marker all yield `""`.
    pub fn get_string(&self, key: &str) -> String {
        let text = self.get(key).map(RawValue::to_text).unwrap_or_default();
        if is_absent(&text) {
            String::new()
        } else {
            text.trim().to_string()
        }
    }

    /// Like [`RawRecord::get_string`] but `None` instead of an empty string.
    pub fn get_optional_string(&self, key: &str) -> Option<String> {
        let text = self.get_string(key);
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    pub fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_optional_string(key)
            .unwrap_or_else(|| default.to_string())
    }

    /// Field holds something other than an empty or negative marker.
    pub fn get_presence_flag(&self, key: &str) -> bool {
        is_present(&self.get_string(key))
    }

    /// Field equals `yes`, ignoring case.
    pub fn is_yes(&self, key: &str) -> bool {
        self.get_string(key).eq_ignore_ascii_case("yes")
    }

    /// Whole-number reading of a numeric or numeric-looking text field, truncated.
    pub fn get_integer(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            RawValue::Number(number) if number.is_finite() => Some(number.trunc() as i64),
            RawValue::Text(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite())
                .map(|number| number.trunc() as i64),
            _ => None,
        }
    }
}

impl FromIterator<(String, RawValue)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (String, RawValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

fn format_numeric(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}
