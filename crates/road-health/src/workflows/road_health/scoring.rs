use super::domain::{
    Band, ConditionClass, InspectionEvent, InspectionStatus, PriorityLevel, RegistryRecord,
};
use super::index::InspectionIndex;
use super::policy::{InspectionPolicy, ScoringPolicy};
use crate::workflows::datasets::normalize_road_id;
use chrono::NaiveDate;
use serde::Serialize;

const PCI_WEIGHT: f64 = 0.6;
const IRI_WEIGHT: f64 = 0.4;
const IRI_PENALTY_PER_UNIT: f64 = 12.0;
const IRI_DECAY_BASELINE: f64 = 2.0;
const IRI_DECAY_PER_UNIT: f64 = 0.00015;
const MAX_DECAY_RATE: f64 = 0.25;
const DAYS_PER_YEAR: f64 = 365.0;

const CONDITION_CRITICAL_BELOW: f64 = 40.0;
const CONDITION_POOR_BELOW: f64 = 60.0;
const CONDITION_FAIR_BELOW: f64 = 75.0;

const BAND_A_FROM: f64 = 75.0;
const BAND_B_FROM: f64 = 60.0;
const BAND_C_FROM: f64 = 45.0;
const BAND_D_FROM: f64 = 30.0;

const PRIORITY_CRITICAL_BELOW: f64 = 30.0;
const PRIORITY_HIGH_BELOW: f64 = 50.0;
const PRIORITY_MEDIUM_BELOW: f64 = 70.0;

/// Figures derived from a registry record. Never written back to the source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoadMetrics {
    pub normalized_iri: f64,
    pub composite_score: f64,
    pub decay_rate: f64,
    pub condition: ConditionClass,
    pub band: Band,
    pub priority: PriorityLevel,
}

pub fn derive_metrics(record: &RegistryRecord, policy: &ScoringPolicy) -> RoadMetrics {
    let pci = record.pci;
    let iri = record.iri;

    let normalized_iri = (100.0 - (iri - 1.0) * IRI_PENALTY_PER_UNIT).clamp(0.0, 100.0);
    let composite_score = round_to(pci * PCI_WEIGHT + normalized_iri * IRI_WEIGHT, 1);

    // Year zero marks an unknown construction year.
    let age = if record.year_constructed > 0 {
        policy.reference_year - record.year_constructed
    } else {
        0
    };
    let age_decay = if age > 0 {
        (100.0 - pci) / (f64::from(age) * DAYS_PER_YEAR)
    } else {
        0.0
    };
    let iri_decay = ((iri - IRI_DECAY_BASELINE) * IRI_DECAY_PER_UNIT).max(0.0);
    let decay_rate = round_to(age_decay + iri_decay, 4).min(MAX_DECAY_RATE);

    RoadMetrics {
        normalized_iri,
        composite_score,
        decay_rate,
        condition: condition_class(pci),
        band: band(pci),
        priority: priority_level(composite_score),
    }
}

pub fn condition_class(pci: f64) -> ConditionClass {
    if pci < CONDITION_CRITICAL_BELOW {
        ConditionClass::Critical
    } else if pci < CONDITION_POOR_BELOW {
        ConditionClass::Poor
    } else if pci < CONDITION_FAIR_BELOW {
        ConditionClass::Fair
    } else {
        ConditionClass::Good
    }
}

pub fn band(pci: f64) -> Band {
    if pci >= BAND_A_FROM {
        Band::A
    } else if pci >= BAND_B_FROM {
        Band::B
    } else if pci >= BAND_C_FROM {
        Band::C
    } else if pci >= BAND_D_FROM {
        Band::D
    } else {
        Band::E
    }
}

pub fn priority_level(composite_score: f64) -> PriorityLevel {
    if composite_score < PRIORITY_CRITICAL_BELOW {
        PriorityLevel::Critical
    } else if composite_score < PRIORITY_HIGH_BELOW {
        PriorityLevel::High
    } else if composite_score < PRIORITY_MEDIUM_BELOW {
        PriorityLevel::Medium
    } else {
        PriorityLevel::Low
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// A registry record joined with its inspection history and derived metrics.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredRoad {
    pub record: RegistryRecord,
    pub join_key: String,
    pub inspections: Vec<InspectionEvent>,
    pub last_inspection: Option<String>,
    pub metrics: RoadMetrics,
}

impl ScoredRoad {
    pub fn score(record: &RegistryRecord, index: &InspectionIndex, policy: &ScoringPolicy) -> Self {
        let join_key = normalize_road_id(&record.road_id);
        let inspections = index.lookup(&join_key).to_vec();
        let last_inspection = index.latest_date(&join_key).map(str::to_string);
        let metrics = derive_metrics(record, policy);

        Self {
            record: record.clone(),
            join_key,
            inspections,
            last_inspection,
            metrics,
        }
    }

    /// Whole days between the latest inspection and `as_of`. `None` when the
    /// road has no inspection or its latest date does not parse.
    pub fn days_since_inspection(&self, as_of: NaiveDate) -> Option<i64> {
        let last = self.last_inspection.as_deref()?;
        let last = NaiveDate::parse_from_str(last, "%Y-%m-%d").ok()?;
        Some((as_of - last).num_days())
    }

    pub fn inspection_status(
        &self,
        as_of: NaiveDate,
        policy: &InspectionPolicy,
    ) -> InspectionStatus {
        let Some(gap) = self.days_since_inspection(as_of) else {
            return InspectionStatus::NeverInspected;
        };

        let cycle = policy.cycle_for(&self.record.category);
        if gap <= policy.recent_window_days {
            InspectionStatus::RecentlyInspected
        } else if gap > cycle {
            InspectionStatus::Overdue
        } else if gap >= cycle - policy.due_soon_window_days {
            InspectionStatus::DueSoon
        } else {
            InspectionStatus::Current
        }
    }

    /// Composite score extrapolated `days` ahead at the current decay rate.
    pub fn projected_score(&self, days: u32) -> f64 {
        let projected = self.metrics.composite_score - self.metrics.decay_rate * f64::from(days);
        round_to(projected.max(0.0), 1)
    }
}

pub fn score_roads(
    registry: &[RegistryRecord],
    index: &InspectionIndex,
    policy: &ScoringPolicy,
) -> Vec<ScoredRoad> {
    registry
        .iter()
        .map(|record| ScoredRoad::score(record, index, policy))
        .collect()
}
