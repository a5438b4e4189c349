//! Section assemblers: read designated fields into the record's named sections.

use onco_core::{
    Alert, BiomarkerEvidence, Comorbidities, DiseaseStatus, DocumentLinks, Evidence,
    GenomicsEvidence, LabPanels, MutationStatus, NormalizerConfig, OrganRisk, PathologyEvidence,
    PatientHeader, TreatmentContext, TumorMarkers,
};

use crate::extract::{parse_delimited_list, parse_lab_panel};
use crate::record::RawRecord;

/// Driver genes reported in the genomics section, in display order.
pub const DRIVER_GENES: [&str; 9] = [
    "EGFR",
    "ALK",
    "ROS1",
    "KRAS",
    "BRAF",
    "MET_Exon14",
    "RET",
    "HER2",
    "NTRK",
];

pub fn header(raw: &RawRecord, clinical_alerts: Vec<Alert>) -> PatientHeader {
    PatientHeader {
        name: raw.get_string("Name"),
        age: age(raw),
        sex: raw.get_string("Sex"),
        performance_status: raw.get_string("Performance_Status"),
        primary_diagnosis: raw.get_string("Primary_Diagnosis"),
        histology: raw.get_string("Histologic_Type"),
        last_visit: raw.get_string("Last_Encounter_Date"),
        stage_progression: format!(
            "{} -> {}",
            raw.get_string("Initial_TNM_Stage"),
            raw.get_string("Current_TNM_Stage")
        ),
        clinical_alerts,
    }
}

/// Age in whole years; missing, negative or unreadable values give `0`.
pub fn age(raw: &RawRecord) -> u32 {
    raw.get_integer("Age")
        .and_then(|age| u32::try_from(age).ok())
        .unwrap_or(0)
}

/// `Response` first, `RECIST` when the response is blank.
pub fn treatment_response(raw: &RawRecord) -> String {
    raw.get_optional_string("Response")
        .unwrap_or_else(|| raw.get_string("RECIST"))
}

pub fn disease_status(raw: &RawRecord) -> DiseaseStatus {
    DiseaseStatus {
        treatment_response: treatment_response(raw),
        recurrence_status: raw.get_string("Recurrence_Status"),
        current_trend: raw.get_string("Radiology_Trend"),
        longitudinal_trend: raw.get_string("Radiology_Trends_Longitudinal"),
        metastatic_status: raw.get_string("Metastatic_Status"),
        metastatic_sites: parse_delimited_list(&raw.get_string("Metastatic_Sites")),
        new_lesions: raw.get_string("New_Lesions"),
        lesion_count_size: raw.get_string("Lesion_Count_Size"),
        radiology_findings: parse_delimited_list(&raw.get_string("Radiology_Keywords")),
        radiology_report_link: raw.get_string("Radiology_Links"),
    }
}

pub fn treatment_context(raw: &RawRecord) -> TreatmentContext {
    TreatmentContext {
        current_line: raw.get_string("Current_Line"),
        prior_therapies: raw.get_string("Prior_Therapies"),
        reason_for_change: raw.get_string("Reason_For_Change"),
        regimen: raw.get_string("Regimen"),
        response_timeline: raw.get_string("Treatment_Response_Timeline"),
        plan_summary: raw.get_string("Treatment_Plan_Summary"),
        disease_course_summary: raw.get_string("Disease_Course_Summary"),
    }
}

pub fn organ_risk(raw: &RawRecord, config: &NormalizerConfig) -> OrganRisk {
    OrganRisk {
        renal_function: organ_function(raw.is_yes("Renal_Flag")),
        hepatic_function: organ_function(raw.is_yes("Liver_Flag")),
        lab_abnormalities: parse_delimited_list(&raw.get_string("Abnormal_Labs")),
        lab_trend: raw.get_string_or("Lab_Flag_Trend", &config.lab_trend_default),
        toxicities: parse_delimited_list(&raw.get_string("Toxicities")),
        pathology_uncertainty: raw.get_string_or(
            "Ambiguous_Pathology",
            &config.pathology_uncertainty_default,
        ),
    }
}

fn organ_function(flagged: bool) -> String {
    let label = if flagged { "Abnormal" } else { "Preserved" };
    label.to_string()
}

pub fn comorbidities(raw: &RawRecord) -> Comorbidities {
    let mut active_conditions = Vec::new();

    if let Some(diabetes) = present_value(raw, "Diabetes") {
        active_conditions.push(format!("Diabetes {diabetes}"));
    }
    if raw.get_presence_flag("Hypertension") {
        active_conditions.push("Hypertension".to_string());
    }
    if raw.get_presence_flag("Heart_Disease") {
        active_conditions.push("Heart Disease".to_string());
    }
    active_conditions.extend(present_value(raw, "COPD_Asthma"));
    active_conditions.extend(present_value(raw, "Other_Comorbidities"));

    Comorbidities {
        active_conditions,
        smoking_history: raw.get_string("Smoking_Status"),
    }
}

fn present_value(raw: &RawRecord, key: &str) -> Option<String> {
    raw.get_presence_flag(key).then(|| raw.get_string(key))
}

pub fn evidence(raw: &RawRecord) -> Evidence {
    Evidence {
        pathology: PathologyEvidence {
            summary: raw.get_string("Pathology_Diagnosis_Text"),
            grade: raw.get_string("Tumor_Grade"),
            margins: raw.get_string("Margin_Status"),
            features: parse_delimited_list(&raw.get_string("Histopathologic_Features")),
            keywords: raw.get_string("Pathology_Keywords"),
            ihc: raw.get_string("IHC_Markers"),
            num_reports: raw.get_string("Num_Pathology_Reports"),
        },
        genomics: GenomicsEvidence {
            mutations: DRIVER_GENES
                .iter()
                .map(|gene| MutationStatus {
                    gene: gene.to_string(),
                    status: raw.get_string(gene),
                })
                .collect(),
            pdl1: raw.get_string("PDL1_Percent"),
            tmb: raw.get_string("TMB"),
            msi: raw.get_string("MSI"),
            ctdna: raw.get_string("ctDNA_Findings"),
            actionable: raw.get_string("Actionable_Mutation_Summary"),
            new_mutations: raw.get_string("New_Mutations"),
        },
        biomarkers: BiomarkerEvidence {
            trend: raw.get_string("Biomarker_Trend"),
            longitudinal: raw.get_string("Biomarker_Trends_Longitudinal"),
            markers: TumorMarkers {
                cea: raw.get_string("CEA"),
                ca19_9: raw.get_string("CA19_9"),
                other: raw.get_string("Other_Tumor_Markers"),
            },
        },
        labs: LabPanels {
            cbc: parse_lab_panel(&raw.get_string("CBC")),
            cmp: parse_lab_panel(&raw.get_string("CMP")),
            electrolytes: parse_lab_panel(&raw.get_string("Electrolytes")),
        },
        docs: DocumentLinks {
            pathology_links: raw.get_string("Pathology_Links"),
            radiology_links: raw.get_string("Radiology_Links"),
            genomic_links: raw.get_string("Genomic_Links"),
            notes: raw.get_string("Provider_Notes"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_falls_back_to_recist() {
        let raw = RawRecord::new().with("Response", "nan").with("RECIST", "SD");
        assert_eq!(treatment_response(&raw), "SD");
        let raw = raw.with("Response", "PR");
        assert_eq!(treatment_response(&raw), "PR");
        assert_eq!(treatment_response(&RawRecord::new()), "");
    }

    #[test]
    fn comorbidities_in_fixed_order() {
        let raw = RawRecord::new()
            .with("Other_Comorbidities", "Hypothyroidism")
            .with("COPD_Asthma", "COPD GOLD 2")
            .with("Heart_Disease", "CAD")
            .with("Hypertension", "No")
            .with("Diabetes", "Type 2")
            .with("Smoking_Status", "Former, 30 pack-years");
        let section = comorbidities(&raw);
        assert_eq!(
            section.active_conditions,
            vec!["Diabetes Type 2", "Heart Disease", "COPD GOLD 2", "Hypothyroidism"]
        );
        assert_eq!(section.smoking_history, "Former, 30 pack-years");
    }

    #[test]
    fn organ_risk_defaults() {
        let section = organ_risk(&RawRecord::new(), &NormalizerConfig::default());
        assert_eq!(section.renal_function, "Preserved");
        assert_eq!(section.hepatic_function, "Preserved");
        assert_eq!(section.lab_trend, "Stable");
        assert_eq!(section.pathology_uncertainty, "No");
        assert!(section.lab_abnormalities.is_empty());
        assert!(section.toxicities.is_empty());
    }

    #[test]
    fn organ_risk_flags_and_lists() {
        let raw = RawRecord::new()
            .with("Renal_Flag", "Yes")
            .with("Abnormal_Labs", "Creatinine high | eGFR low")
            .with("Lab_Flag_Trend", "Worsening");
        let section = organ_risk(&raw, &NormalizerConfig::default());
        assert_eq!(section.renal_function, "Abnormal");
        assert_eq!(section.lab_abnormalities, vec!["Creatinine high", "eGFR low"]);
        assert_eq!(section.lab_trend, "Worsening");
    }

    #[test]
    fn header_fields() {
        let raw = RawRecord::new()
            .with("Name", "Jane Roe")
            .with("Age", "abc")
            .with("Initial_TNM_Stage", "T2N0M0")
            .with("Current_TNM_Stage", "T2N1M1a");
        let section = header(&raw, Vec::new());
        assert_eq!(section.name, "Jane Roe");
        assert_eq!(section.age, 0);
        assert_eq!(section.stage_progression, "T2N0M0 -> T2N1M1a");
    }

    #[test]
    fn genomics_panel_keeps_gene_order() {
        let raw = RawRecord::new().with("KRAS", "G12C").with("EGFR", "Negative");
        let section = evidence(&raw);
        let genes: Vec<&str> = section
            .genomics
            .mutations
            .iter()
            .map(|mutation| mutation.gene.as_str())
            .collect();
        assert_eq!(genes, DRIVER_GENES.to_vec());
        assert_eq!(section.genomics.mutations[0].status, "Negative");
        assert_eq!(section.genomics.mutations[3].status, "G12C");
        assert_eq!(section.genomics.mutations[1].status, "");
    }
}
