//! Seam for the external insight generator and the fallback text used when it
//! is unavailable.

use onco_core::StructuredRecord;
use serde::{Deserialize, Serialize};

use crate::record::RawRecord;

/// Fixed header summary shown next to the rule-based alerts.
pub const ALERT_SUMMARY_PLACEHOLDER: &str =
    "Clinical signals under review. Refer to Comprehensive AI Insights below for detailed analysis.";

/// Shown when cross-domain insights cannot be generated.
pub const FALLBACK_INSIGHTS: [&str; 5] = [
    "Clinical data signals indicate alignment between current therapy and partial response status.",
    "Biomarker trends support the favorable radiographic findings observed.",
    "Functional status appears preserved despite noted toxicities, suggesting adequate tolerance.",
    "Pathology and genomic drivers are consistent with the selected targeted regimen.",
    "(AI Service unavailable - displaying cached/fallback insights)",
];

const MAX_CROSS_DOMAIN_INSIGHTS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    #[error("insight service unavailable: {0}")]
    Unavailable(String),
    #[error("insight generation failed: {0}")]
    Generation(String),
}

/// External producer of natural-language insight bullets. Output is not
/// expected to be deterministic.
pub trait InsightProvider {
    fn cross_domain_insights(
        &self,
        record: &StructuredRecord,
        raw: &RawRecord,
    ) -> Result<Vec<String>, InsightError>;

    fn alert_insights(&self, raw: &RawRecord) -> Result<Vec<String>, InsightError>;
}

/// Provider used when no generator is configured; always unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineInsights;

impl InsightProvider for OfflineInsights {
    fn cross_domain_insights(
        &self,
        _record: &StructuredRecord,
        _raw: &RawRecord,
    ) -> Result<Vec<String>, InsightError> {
        Err(InsightError::Unavailable("no insight generator configured".to_string()))
    }

    fn alert_insights(&self, _raw: &RawRecord) -> Result<Vec<String>, InsightError> {
        Err(InsightError::Unavailable("no insight generator configured".to_string()))
    }
}

/// Structured record plus collaborator-supplied text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AugmentedRecord {
    #[serde(flatten)]
    pub record: StructuredRecord,
    pub cross_domain_insights: Vec<String>,
    pub ai_generated_alerts: Vec<String>,
    pub ai_alert_summary: String,
}

/// Attach insight text to a record, substituting fallbacks on any failure or
/// empty answer.
pub fn augment(
    record: StructuredRecord,
    raw: &RawRecord,
    provider: &dyn InsightProvider,
) -> AugmentedRecord {
    let cross_domain_insights = match provider.cross_domain_insights(&record, raw) {
        Ok(lines) if !lines.is_empty() => {
            lines.into_iter().take(MAX_CROSS_DOMAIN_INSIGHTS).collect()
        }
        Ok(_) => fallback_insights(),
        Err(err) => {
            tracing::warn!(%err, "cross-domain insights unavailable, using fallback");
            fallback_insights()
        }
    };

    let ai_generated_alerts = match provider.alert_insights(raw) {
        Ok(lines) if !lines.is_empty() => lines,
        Ok(_) => rule_alert_messages(&record),
        Err(err) => {
            tracing::warn!(%err, "alert insights unavailable, using rule-based alerts");
            rule_alert_messages(&record)
        }
    };

    AugmentedRecord {
        record,
        cross_domain_insights,
        ai_generated_alerts,
        ai_alert_summary: ALERT_SUMMARY_PLACEHOLDER.to_string(),
    }
}

/// Split generated text into bullet lines, dropping list markers and blanks.
pub fn clean_bullets(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim().trim_start_matches(['*', '-', '•', ' ']).trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn fallback_insights() -> Vec<String> {
    FALLBACK_INSIGHTS.iter().map(|line| line.to_string()).collect()
}

fn rule_alert_messages(record: &StructuredRecord) -> Vec<String> {
    record
        .alerts()
        .iter()
        .map(|alert| alert.message.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize_record;
    use onco_core::NormalizerConfig;

    struct Scripted {
        insights: Vec<String>,
        alerts: Vec<String>,
    }

    impl InsightProvider for Scripted {
        fn cross_domain_insights(
            &self,
            _record: &StructuredRecord,
            _raw: &RawRecord,
        ) -> Result<Vec<String>, InsightError> {
            Ok(self.insights.clone())
        }

        fn alert_insights(&self, _raw: &RawRecord) -> Result<Vec<String>, InsightError> {
            if self.alerts.is_empty() {
                Err(InsightError::Generation("quota exceeded".to_string()))
            } else {
                Ok(self.alerts.clone())
            }
        }
    }

    fn sample() -> (StructuredRecord, RawRecord) {
        let raw = RawRecord::new()
            .with("Name", "Jane Roe")
            .with("Renal_Flag", "Yes");
        let record = normalize_record(&raw, &NormalizerConfig::default());
        (record, raw)
    }

    #[test]
    fn offline_uses_fallbacks() {
        let (record, raw) = sample();
        let augmented = augment(record, &raw, &OfflineInsights);
        assert_eq!(augmented.cross_domain_insights.len(), 5);
        assert_eq!(augmented.cross_domain_insights[4], FALLBACK_INSIGHTS[4]);
        assert_eq!(augmented.ai_generated_alerts, vec!["Renal impairment"]);
        assert_eq!(augmented.ai_alert_summary, ALERT_SUMMARY_PLACEHOLDER);
    }

    #[test]
    fn provider_output_is_capped() {
        let (record, raw) = sample();
        let provider = Scripted {
            insights: (1..=7).map(|n| format!("insight {n}")).collect(),
            alerts: Vec::new(),
        };
        let augmented = augment(record, &raw, &provider);
        assert_eq!(augmented.cross_domain_insights.len(), 5);
        assert_eq!(augmented.cross_domain_insights[0], "insight 1");
        assert_eq!(augmented.ai_generated_alerts, vec!["Renal impairment"]);
    }

    #[test]
    fn empty_answer_falls_back() {
        let (record, raw) = sample();
        let provider = Scripted {
            insights: Vec::new(),
            alerts: vec!["Renal function abnormality present".to_string()],
        };
        let augmented = augment(record, &raw, &provider);
        assert_eq!(augmented.cross_domain_insights[0], FALLBACK_INSIGHTS[0]);
        assert_eq!(
            augmented.ai_generated_alerts,
            vec!["Renal function abnormality present"]
        );
    }

    #[test]
    fn augmented_record_flattens_sections() {
        let (record, raw) = sample();
        let value = serde_json::to_value(augment(record, &raw, &OfflineInsights)).unwrap();
        assert_eq!(value["header"]["name"], "Jane Roe");
        assert!(value["cross_domain_insights"].is_array());
    }

    #[test]
    fn bullets_are_cleaned() {
        let text = "* First point\n\n- Second point\n  • Third point  \n";
        assert_eq!(
            clean_bullets(text),
            vec!["First point", "Second point", "Third point"]
        );
    }
}
