//! Date reconciliation for heterogeneous source encodings.
//!
//! Source columns mix `DD-MM-YYYY`, `YYYY-MM-DD` followed by free text, and bare
//! years. Every value is reduced to a display string plus a [`PartialDate`] key.
//! Nothing here fails: unparseable input is kept as text.

use chrono::NaiveDate;
use onco_core::{NormalizerConfig, PartialDate};

const DAY_FIRST_FORMATS: [&str; 4] = ["%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y", "%Y-%m-%d"];

/// How a date-bearing field is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStrategy {
    /// Day before month: `15-03-2023`, optionally followed by text.
    DayFirst,
    /// Leading `YYYY-MM-DD` or a bare `YYYY`.
    YearFirst,
}

impl DateStrategy {
    pub fn for_field(field: &str, config: &NormalizerConfig) -> Self {
        if config.is_day_first(field) {
            DateStrategy::DayFirst
        } else {
            DateStrategy::YearFirst
        }
    }
}

/// How much of the date could be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePrecision {
    Day,
    Year,
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledDate {
    /// `YYYY-MM-DD`, `YYYY`, or the original text.
    pub text: String,
    pub precision: DatePrecision,
    pub sort_key: PartialDate,
}

impl ReconciledDate {
    fn resolved(text: String, precision: DatePrecision) -> Self {
        let sort_key = sort_key(&text);
        Self {
            text,
            precision,
            sort_key,
        }
    }

    fn unresolved(original: &str) -> Self {
        Self {
            text: original.to_string(),
            precision: DatePrecision::Unresolved,
            sort_key: sort_key(original),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.precision != DatePrecision::Unresolved
    }

    /// Date text to show on a timeline: the resolved form, or the first
    /// whitespace-delimited fragment of unresolved text.
    pub fn display_fragment(&self) -> String {
        if self.is_resolved() {
            self.text.clone()
        } else {
            first_token(&self.text).to_string()
        }
    }
}

/// Reconcile one raw value with the given strategy.
pub fn reconcile(raw: &str, strategy: DateStrategy) -> ReconciledDate {
    let resolved = match strategy {
        DateStrategy::DayFirst => parse_day_first(raw)
            .map(|date| (date.format("%Y-%m-%d").to_string(), DatePrecision::Day)),
        DateStrategy::YearFirst => parse_year_first(raw)
            .map(|text| (text, DatePrecision::Day))
            .or_else(|| parse_bare_year(raw).map(|year| (year, DatePrecision::Year))),
    };

    match resolved {
        Some((text, precision)) => ReconciledDate::resolved(text, precision),
        None => {
            if !raw.trim().is_empty() {
                tracing::debug!(value = raw, ?strategy, "unparseable date, keeping original text");
            }
            ReconciledDate::unresolved(raw)
        }
    }
}

/// `DD-MM-YYYY` (or `/`, `.` separated) with any trailing text dropped.
pub fn parse_day_first(raw: &str) -> Option<NaiveDate> {
    let head = first_token(raw);
    if head.is_empty() {
        return None;
    }
    DAY_FIRST_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(head, format).ok())
}

/// Leading ten characters when they have the `YYYY-MM-DD` shape.
pub fn parse_year_first(raw: &str) -> Option<String> {
    let head = raw.trim_start().get(..10)?;
    let shaped = head.char_indices().all(|(idx, c)| match idx {
        4 | 7 => c == '-',
        _ => c.is_ascii_digit(),
    });
    shaped.then(|| head.to_string())
}

/// The whole value is a four-digit year.
pub fn parse_bare_year(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    is_four_digits(trimmed).then(|| trimmed.to_string())
}

/// Ordering key for a timeline date string.
///
/// * empty → `(0, 0, 0)`
/// * `YYYY` → `(Y, 13, 32)`, after every dated event of that year
/// * `Y-M-D[-…]` → `(Y, M, D)`
/// * `Y-M` → `(Y, M, 0)`
/// * anything else → `(0, 0, 0)`
pub fn sort_key(date: &str) -> PartialDate {
    let date = date.trim();
    if date.is_empty() {
        return PartialDate::UNSPECIFIED;
    }

    if is_four_digits(date) {
        if let Ok(year) = date.parse() {
            return PartialDate::year_only(year);
        }
    }

    let parts: Vec<&str> = date.split('-').map(str::trim).collect();
    let parsed = match parts.as_slice() {
        [year, month, day, ..] => year
            .parse::<i32>()
            .ok()
            .zip(month.parse::<u8>().ok())
            .zip(day.parse::<u8>().ok())
            .map(|((year, month), day)| PartialDate::new(year, month, day)),
        [year, month] => year
            .parse::<i32>()
            .ok()
            .zip(month.parse::<u8>().ok())
            .map(|(year, month)| PartialDate::year_month(year, month)),
        _ => None,
    };

    parsed.unwrap_or_else(|| {
        tracing::debug!(date, "date has no sortable components");
        PartialDate::UNSPECIFIED
    })
}

fn first_token(raw: &str) -> &str {
    raw.split_whitespace().next().unwrap_or("")
}

fn is_four_digits(text: &str) -> bool {
    text.len() == 4 && text.bytes().all(|b| b.is_ascii_digit())
}
