use super::super::domain::{Band, ConditionClass, InspectionStatus, PriorityLevel, ReportType};
use super::super::filter::ReportFilters;
use chrono::NaiveDate;
use serde::Serialize;

/// Network-wide figures over the unfiltered dataset, supplied for context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NetworkTotals {
    pub total_roads: usize,
    pub total_length_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionEntry {
    pub key: String,
    pub label: String,
    pub count: usize,
    pub length_km: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub report_type: ReportType,
    pub report_label: &'static str,
    pub as_of: NaiveDate,
    pub filters: ReportFilters,
    pub total_roads: usize,
    pub total_length_km: f64,
    pub filtered_count: usize,
    pub filtered_length_km: f64,
    pub avg_composite_score: f64,
    pub by_district: Vec<DistributionEntry>,
    pub by_band: Vec<DistributionEntry>,
    pub by_condition: Vec<DistributionEntry>,
    pub by_priority: Vec<DistributionEntry>,
    pub details: ReportDetails,
}

/// Report-type specific section of a summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportDetails {
    ConditionOverview(ConditionOverview),
    PriorityMaintenance(PriorityMaintenance),
    DistrictSummary(DistrictBreakdown),
    InspectionSchedule(InspectionSchedule),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HazardCounts {
    pub flood_prone: usize,
    pub landslide_prone: usize,
    pub ghat_section: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConditionOverview {
    pub avg_composite_score: f64,
    pub avg_decay_rate: f64,
    pub min_composite_score: f64,
    pub max_composite_score: f64,
    pub hazards: HazardCounts,
    pub by_surface: Vec<DistributionEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriorityMaintenance {
    pub projection_days: u32,
    pub roads: Vec<RoadView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictRow {
    pub district: String,
    pub road_count: usize,
    pub length_km: f64,
    pub avg_composite_score: f64,
    pub critical_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistrictBreakdown {
    pub districts: Vec<DistrictRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: InspectionStatus,
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectionSchedule {
    pub status_counts: Vec<StatusCount>,
    pub roads: Vec<RoadView>,
}

/// A single road as rendered in report listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadView {
    pub road_id: String,
    pub name: String,
    pub district: String,
    pub highway_ref: String,
    pub category: String,
    pub length_km: f64,
    pub pci: f64,
    pub iri: f64,
    pub composite_score: f64,
    pub decay_rate: f64,
    pub condition: ConditionClass,
    pub band: Band,
    pub priority: PriorityLevel,
    pub priority_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_inspection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_since_inspection: Option<i64>,
    pub inspection_status: InspectionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projected_score: Option<f64>,
}
