//! Deterministic alert triggers over the raw record.

use onco_core::{Alert, AlertCategory, AlertLevel, NormalizerConfig};

use crate::record::RawRecord;

struct Trigger {
    category: AlertCategory,
    level: AlertLevel,
    message: &'static str,
    fires: fn(&RawRecord, &NormalizerConfig) -> bool,
}

/// Evaluation order is output order.
const TRIGGERS: [Trigger; 8] = [
    Trigger {
        category: AlertCategory::Disease,
        level: AlertLevel::High,
        message: "Metastatic disease present",
        fires: |raw, _| raw.is_yes("Metastatic_Status"),
    },
    Trigger {
        category: AlertCategory::Disease,
        level: AlertLevel::High,
        message: "New lesions identified",
        fires: |raw, _| raw.is_yes("New_Lesions"),
    },
    Trigger {
        category: AlertCategory::Disease,
        level: AlertLevel::High,
        message: "Radiographic progression",
        fires: |raw, _| is_progression(raw),
    },
    Trigger {
        category: AlertCategory::Functional,
        level: AlertLevel::Medium,
        message: "Reduced functional reserve",
        fires: |raw, config| {
            functional_score(&raw.get_string("Performance_Status"))
                >= config.functional_status_threshold
        },
    },
    Trigger {
        category: AlertCategory::Safety,
        level: AlertLevel::Medium,
        message: "Hepatic dysfunction",
        fires: |raw, _| raw.is_yes("Liver_Flag"),
    },
    Trigger {
        category: AlertCategory::Safety,
        level: AlertLevel::Medium,
        message: "Renal impairment",
        fires: |raw, _| raw.is_yes("Renal_Flag"),
    },
    Trigger {
        category: AlertCategory::Tolerance,
        level: AlertLevel::Medium,
        message: "Treatment-related toxicities documented",
        fires: |raw, _| raw.get_presence_flag("Toxicities"),
    },
    Trigger {
        category: AlertCategory::Data,
        level: AlertLevel::Low,
        message: "Pathology uncertainty",
        fires: |raw, _| raw.is_yes("Ambiguous_Pathology"),
    },
];

/// Run every trigger in order and collect the ones that fire.
pub fn evaluate(raw: &RawRecord, config: &NormalizerConfig) -> Vec<Alert> {
    TRIGGERS
        .iter()
        .filter(|trigger| (trigger.fires)(raw, config))
        .map(|trigger| Alert {
            category: trigger.category,
            message: trigger.message.to_string(),
            level: trigger.level,
        })
        .collect()
}

fn is_progression(raw: &RawRecord) -> bool {
    ["Response", "RECIST"]
        .iter()
        .any(|field| raw.get_string(field).eq_ignore_ascii_case("PD"))
}

/// Digits found anywhere in a performance-status text, read as one number.
///
/// No digits, or a digit run too long to read, gives the neutral score `0`.
pub fn functional_score(text: &str) -> u32 {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or_else(|err| {
        tracing::debug!(value = text, %err, "unreadable performance status");
        0
    })
}
