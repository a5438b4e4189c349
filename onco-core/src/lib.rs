//! Mô hình dữ liệu lõi cho hồ sơ ung bướu đã chuẩn hoá và timeline lâm sàng.

use serde::{Deserialize, Serialize};

/// Cấu hình điều chỉnh cách chuẩn hoá một dòng dữ liệu bệnh nhân.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Các trường ngày ghi theo thứ tự ngày-tháng-năm (DD-MM-YYYY).
    pub day_first_fields: Vec<String>,
    /// Điểm thể trạng (ECOG) từ mức này trở lên sẽ sinh cảnh báo chức năng.
    pub functional_status_threshold: u32,
    /// Giá trị mặc định khi thiếu xu hướng xét nghiệm.
    pub lab_trend_default: String,
    /// Giá trị mặc định khi thiếu cờ giải phẫu bệnh không rõ ràng.
    pub pathology_uncertainty_default: String,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            day_first_fields: vec!["Diagnosis_Date".to_string(), "Biopsy_Date".to_string()],
            functional_status_threshold: 2,
            lab_trend_default: "Stable".to_string(),
            pathology_uncertainty_default: "No".to_string(),
        }
    }
}

impl NormalizerConfig {
    /// Trường có được đọc theo thứ tự ngày trước không.
    pub fn is_day_first(&self, field: &str) -> bool {
        self.day_first_fields.iter().any(|name| name == field)
    }
}

/// Khoá sắp xếp cho ngày không đầy đủ.
///
/// `0` nghĩa là "không rõ, xếp đầu phạm vi"; `13` (tháng) và `32` (ngày) nghĩa là
/// "không rõ, xếp cuối phạm vi". So sánh theo thứ tự từ điển năm → tháng → ngày.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct PartialDate {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

impl PartialDate {
    /// Ngày hoàn toàn không xác định, luôn đứng trước mọi năm thực.
    pub const UNSPECIFIED: PartialDate = PartialDate {
        year: 0,
        month: 0,
        day: 0,
    };
    pub const LATEST_MONTH: u8 = 13;
    pub const LATEST_DAY: u8 = 32;

    pub const fn new(year: i32, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// Chỉ biết năm: xếp sau mọi sự kiện có ngày cụ thể trong cùng năm.
    pub const fn year_only(year: i32) -> Self {
        Self {
            year,
            month: Self::LATEST_MONTH,
            day: Self::LATEST_DAY,
        }
    }

    /// Biết năm và tháng: xếp đầu tháng.
    pub const fn year_month(year: i32, month: u8) -> Self {
        Self {
            year,
            month,
            day: 0,
        }
    }

    pub fn is_unspecified(&self) -> bool {
        *self == Self::UNSPECIFIED
    }
}

/// Một mục xét nghiệm tách từ chuỗi tự do.
///
/// `is_abnormal` luôn là `false`: chưa có ngưỡng tham chiếu để so sánh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabItem {
    pub label: String,
    pub value: String,
    pub is_abnormal: bool,
}

impl LabItem {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            is_abnormal: false,
        }
    }
}

/// Một sự kiện trong timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClinicalEvent {
    /// Ngày hiển thị: `YYYY-MM-DD`, `YYYY`, đoạn văn bản gốc hoặc rỗng.
    pub date: String,
    pub label: String,
    pub description: String,
    /// Tên cột nguồn của sự kiện.
    pub source_field: String,
    pub sort_key: PartialDate,
}

/// Nhóm cảnh báo.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AlertCategory {
    Disease,
    Functional,
    Safety,
    Tolerance,
    Data,
}

/// Mức độ cảnh báo.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    High,
    Medium,
    Low,
}

/// Cảnh báo sinh từ luật cố định.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Alert {
    pub category: AlertCategory,
    pub message: String,
    pub level: AlertLevel,
}

/// Thông tin đầu hồ sơ.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PatientHeader {
    pub name: String,
    pub age: u32,
    pub sex: String,
    pub performance_status: String,
    pub primary_diagnosis: String,
    pub histology: String,
    pub last_visit: String,
    /// Dạng `"<giai đoạn ban đầu> -> <giai đoạn hiện tại>"`.
    pub stage_progression: String,
    pub clinical_alerts: Vec<Alert>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DiseaseStatus {
    pub treatment_response: String,
    pub recurrence_status: String,
    pub current_trend: String,
    pub longitudinal_trend: String,
    pub metastatic_status: String,
    pub metastatic_sites: Vec<String>,
    pub new_lesions: String,
    pub lesion_count_size: String,
    pub radiology_findings: Vec<String>,
    pub radiology_report_link: String,
}

/// Bối cảnh điều trị đi kèm timeline.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TreatmentContext {
    pub current_line: String,
    pub prior_therapies: String,
    pub reason_for_change: String,
    pub regimen: String,
    pub response_timeline: String,
    pub plan_summary: String,
    pub disease_course_summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Timeline {
    /// Sự kiện đã sắp xếp theo `sort_key` tăng dần.
    pub events: Vec<ClinicalEvent>,
    /// Chuỗi ngày điều trị gốc, giữ nguyên.
    pub treatment_dates: String,
    pub context: TreatmentContext,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct OrganRisk {
    pub renal_function: String,
    pub hepatic_function: String,
    pub lab_abnormalities: Vec<String>,
    pub lab_trend: String,
    pub toxicities: Vec<String>,
    pub pathology_uncertainty: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Comorbidities {
    pub active_conditions: Vec<String>,
    pub smoking_history: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PathologyEvidence {
    pub summary: String,
    pub grade: String,
    pub margins: String,
    pub features: Vec<String>,
    pub keywords: String,
    pub ihc: String,
    pub num_reports: String,
}

/// Trạng thái một gen trong bảng đột biến dẫn đường.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MutationStatus {
    pub gene: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct GenomicsEvidence {
    /// Theo thứ tự cố định của bảng gen.
    pub mutations: Vec<MutationStatus>,
    pub pdl1: String,
    pub tmb: String,
    pub msi: String,
    pub ctdna: String,
    pub actionable: String,
    pub new_mutations: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TumorMarkers {
    #[serde(rename = "CEA")]
    pub cea: String,
    #[serde(rename = "CA19-9")]
    pub ca19_9: String,
    #[serde(rename = "Other")]
    pub other: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct BiomarkerEvidence {
    pub trend: String,
    pub longitudinal: String,
    pub markers: TumorMarkers,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LabPanels {
    pub cbc: Vec<LabItem>,
    pub cmp: Vec<LabItem>,
    pub electrolytes: Vec<LabItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DocumentLinks {
    pub pathology_links: String,
    pub radiology_links: String,
    pub genomic_links: String,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Evidence {
    pub pathology: PathologyEvidence,
    pub genomics: GenomicsEvidence,
    pub biomarkers: BiomarkerEvidence,
    pub labs: LabPanels,
    pub docs: DocumentLinks,
}

/// Kết quả chuẩn hoá cuối cùng cho một bệnh nhân.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct StructuredRecord {
    pub header: PatientHeader,
    pub disease_status: DiseaseStatus,
    pub timeline: Timeline,
    pub organ_risk: OrganRisk,
    pub comorbidities: Comorbidities,
    pub evidence: Evidence,
}

impl StructuredRecord {
    /// Danh sách sự kiện đã sắp xếp theo thời gian.
    pub fn events(&self) -> &[ClinicalEvent] {
        &self.timeline.events
    }

    /// Cảnh báo theo luật, đúng thứ tự đánh giá.
    pub fn alerts(&self) -> &[Alert] {
        &self.header.clinical_alerts
    }
}

/// Tóm tắt tối thiểu cho danh sách bệnh nhân.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PatientSummary {
    pub uid: String,
    pub name: String,
    pub age: u32,
    pub sex: String,
    pub primary_cancer_type: String,
    pub disease_status: String,
}

/// Lỗi chung khi đọc dữ liệu và tra cứu bệnh nhân.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Không tìm thấy bệnh nhân: {name}")]
    PatientNotFound { name: String },
    #[error("Không đọc được bộ dữ liệu: {0}")]
    Dataset(String),
    #[error("Không đọc được dữ liệu: {0}")]
    Parse(String),
    #[error("Lỗi khác: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, RecordError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unspecified_sorts_before_any_real_year() {
        assert!(PartialDate::UNSPECIFIED < PartialDate::new(1, 1, 1));
        assert!(PartialDate::UNSPECIFIED < PartialDate::year_only(1900));
        assert!(PartialDate::default().is_unspecified());
    }

    #[test]
    fn year_only_sorts_between_years() {
        let last_day = PartialDate::new(2023, 12, 31);
        let year_only = PartialDate::year_only(2023);
        let next_year = PartialDate::new(2024, 1, 1);
        assert!(last_day < year_only);
        assert!(year_only < next_year);
        assert!(PartialDate::year_month(2023, 5) < PartialDate::new(2023, 5, 1));
    }

    #[test]
    fn alert_level_serializes_lowercase() {
        let alert = Alert {
            category: AlertCategory::Safety,
            message: "Renal impairment".to_string(),
            level: AlertLevel::Medium,
        };
        let value = serde_json::to_value(&alert).unwrap();
        assert_eq!(value["category"], "Safety");
        assert_eq!(value["level"], "medium");
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: NormalizerConfig =
            serde_json::from_str(r#"{"functional_status_threshold": 3}"#).unwrap();
        assert_eq!(cfg.functional_status_threshold, 3);
        assert!(cfg.is_day_first("Biopsy_Date"));
        assert!(!cfg.is_day_first("Latest_PET_CT"));
        assert_eq!(cfg.lab_trend_default, "Stable");
    }

    #[test]
    fn not_found_error_names_patient() {
        let err = RecordError::PatientNotFound {
            name: "Jane Roe".to_string(),
        };
        assert!(err.to_string().contains("Jane Roe"));
    }
}
