use serde::{Deserialize, Serialize};

/// One road segment as registered, after field-level cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryRecord {
    pub road_id: String,
    pub name: String,
    pub district: String,
    pub taluka: String,
    pub highway_ref: String,
    pub category: String,
    pub pci: f64,
    pub iri: f64,
    /// Zero when the source value was missing or malformed.
    pub year_constructed: i32,
    pub surface_type: String,
    pub terrain_type: String,
    pub length_km: f64,
    pub avg_daily_traffic: f64,
    pub truck_percentage: f64,
    pub flood_prone: bool,
    pub landslide_prone: bool,
    pub ghat_section: bool,
}

/// One field inspection; the road identifier is kept in its raw form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionEvent {
    pub road_id: String,
    pub inspection_date: String,
    pub condition_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionClass {
    Critical,
    Poor,
    Fair,
    Good,
}

impl ConditionClass {
    pub const fn ordered() -> [Self; 4] {
        [Self::Critical, Self::Poor, Self::Fair, Self::Good]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::Poor => "Poor",
            Self::Fair => "Fair",
            Self::Good => "Good",
        }
    }
}

/// Coarse letter classification of pavement condition, A being healthiest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    A,
    B,
    C,
    D,
    E,
}

impl Band {
    pub const fn ordered() -> [Self; 5] {
        [Self::A, Self::B, Self::C, Self::D, Self::E]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ordered()
            .into_iter()
            .find(|band| band.label().eq_ignore_ascii_case(raw))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl PriorityLevel {
    pub const fn ordered() -> [Self; 4] {
        [Self::Critical, Self::High, Self::Medium, Self::Low]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Zero is most urgent.
    pub const fn urgency_rank(self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ordered()
            .into_iter()
            .find(|level| level.label().eq_ignore_ascii_case(raw))
    }
}

/// Where a road sits in its inspection cycle on a given evaluation date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionStatus {
    NeverInspected,
    Overdue,
    DueSoon,
    Current,
    RecentlyInspected,
}

impl InspectionStatus {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::NeverInspected,
            Self::Overdue,
            Self::DueSoon,
            Self::Current,
            Self::RecentlyInspected,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NeverInspected => "Never Inspected",
            Self::Overdue => "Overdue",
            Self::DueSoon => "Due Soon",
            Self::Current => "Current",
            Self::RecentlyInspected => "Recently Inspected",
        }
    }
}

/// Inspection statuses a report request may filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionStatusFilter {
    Overdue,
    DueSoon,
    RecentlyInspected,
}

impl InspectionStatusFilter {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "overdue" => Some(Self::Overdue),
            "due_soon" => Some(Self::DueSoon),
            "recently_inspected" => Some(Self::RecentlyInspected),
            _ => None,
        }
    }

    /// A road with no inspection history counts as overdue.
    pub fn accepts(self, status: InspectionStatus) -> bool {
        match self {
            Self::Overdue => matches!(
                status,
                InspectionStatus::Overdue | InspectionStatus::NeverInspected
            ),
            Self::DueSoon => status == InspectionStatus::DueSoon,
            Self::RecentlyInspected => status == InspectionStatus::RecentlyInspected,
        }
    }
}

/// Shape of the report-specific payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    ConditionOverview,
    PriorityMaintenance,
    DistrictSummary,
    InspectionSchedule,
}

impl ReportType {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::ConditionOverview,
            Self::PriorityMaintenance,
            Self::DistrictSummary,
            Self::InspectionSchedule,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::ConditionOverview => "condition_overview",
            Self::PriorityMaintenance => "priority_maintenance",
            Self::DistrictSummary => "district_summary",
            Self::InspectionSchedule => "inspection_schedule",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ConditionOverview => "Condition Overview",
            Self::PriorityMaintenance => "Priority Maintenance",
            Self::DistrictSummary => "District Summary",
            Self::InspectionSchedule => "Inspection Schedule",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ordered()
            .into_iter()
            .find(|report| report.key().eq_ignore_ascii_case(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsers_are_case_insensitive() {
        assert_eq!(Band::parse(" d "), Some(Band::D));
        assert_eq!(PriorityLevel::parse("high"), Some(PriorityLevel::High));
        assert_eq!(
            ReportType::parse("Condition_Overview"),
            Some(ReportType::ConditionOverview)
        );
        assert_eq!(
            InspectionStatusFilter::parse("DUE_SOON"),
            Some(InspectionStatusFilter::DueSoon)
        );
        assert_eq!(Band::parse("F"), None);
        assert_eq!(ReportType::parse("budget"), None);
    }

    #[test]
    fn overdue_filter_accepts_never_inspected_roads() {
        assert!(InspectionStatusFilter::Overdue.accepts(InspectionStatus::NeverInspected));
        assert!(!InspectionStatusFilter::DueSoon.accepts(InspectionStatus::NeverInspected));
        assert!(
            !InspectionStatusFilter::RecentlyInspected.accepts(InspectionStatus::NeverInspected)
        );
        assert!(!InspectionStatusFilter::Overdue.accepts(InspectionStatus::Current));
    }
}
