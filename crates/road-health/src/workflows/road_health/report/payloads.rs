use super::super::domain::{InspectionStatus, PriorityLevel, ReportType};
use super::super::filter::ReportQuery;
use super::super::policy::InspectionPolicy;
use super::super::scoring::{round_to, ScoredRoad};
use super::summary::Distribution;
use super::views::{
    ConditionOverview, DistrictBreakdown, DistrictRow, HazardCounts, InspectionSchedule,
    PriorityMaintenance, ReportDetails, RoadView, StatusCount,
};
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Horizon of the projected score shown in maintenance listings.
pub const PROJECTION_DAYS: u32 = 90;

const UNSPECIFIED_SURFACE: &str = "unspecified";

pub(super) fn build(
    report_type: ReportType,
    matched: &[&ScoredRoad],
    query: &ReportQuery,
    policy: &InspectionPolicy,
) -> ReportDetails {
    match report_type {
        ReportType::ConditionOverview => ReportDetails::ConditionOverview(condition_overview(matched)),
        ReportType::PriorityMaintenance => ReportDetails::PriorityMaintenance(priority_maintenance(
            matched, query, policy,
        )),
        ReportType::DistrictSummary => ReportDetails::DistrictSummary(district_summary(matched)),
        ReportType::InspectionSchedule => ReportDetails::InspectionSchedule(inspection_schedule(
            matched, query, policy,
        )),
    }
}

fn condition_overview(matched: &[&ScoredRoad]) -> ConditionOverview {
    let mut hazards = HazardCounts::default();
    let mut by_surface = Distribution::default();
    let mut composite_sum = 0.0;
    let mut decay_sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for road in matched {
        let record = &road.record;
        let composite = road.metrics.composite_score;
        composite_sum += composite;
        decay_sum += road.metrics.decay_rate;
        min = min.min(composite);
        max = max.max(composite);

        hazards.flood_prone += usize::from(record.flood_prone);
        hazards.landslide_prone += usize::from(record.landslide_prone);
        hazards.ghat_section += usize::from(record.ghat_section);

        let surface = if record.surface_type.is_empty() {
            UNSPECIFIED_SURFACE.to_string()
        } else {
            record.surface_type.to_ascii_lowercase()
        };
        by_surface.record(&surface, &surface, record.length_km);
    }

    let count = matched.len().max(1) as f64;
    ConditionOverview {
        avg_composite_score: round_to(composite_sum / count, 1),
        avg_decay_rate: round_to(decay_sum / count, 4),
        min_composite_score: if matched.is_empty() { 0.0 } else { min },
        max_composite_score: if matched.is_empty() { 0.0 } else { max },
        hazards,
        by_surface: by_surface.finish(),
    }
}

fn priority_maintenance(
    matched: &[&ScoredRoad],
    query: &ReportQuery,
    policy: &InspectionPolicy,
) -> PriorityMaintenance {
    let mut ranked: Vec<&ScoredRoad> = matched.to_vec();
    ranked.sort_by(|left, right| {
        left.metrics
            .priority
            .urgency_rank()
            .cmp(&right.metrics.priority.urgency_rank())
            .then_with(|| {
                left.metrics
                    .composite_score
                    .total_cmp(&right.metrics.composite_score)
            })
            .then_with(|| left.record.road_id.cmp(&right.record.road_id))
    });

    let roads = ranked
        .into_iter()
        .take(query.limit)
        .map(|road| {
            let mut view = road_view(road, query.as_of, policy);
            view.projected_score = Some(road.projected_score(PROJECTION_DAYS));
            view
        })
        .collect();

    PriorityMaintenance {
        projection_days: PROJECTION_DAYS,
        roads,
    }
}

#[derive(Default)]
struct DistrictAccumulator {
    road_count: usize,
    length_km: f64,
    composite_sum: f64,
    critical_count: usize,
}

fn district_summary(matched: &[&ScoredRoad]) -> DistrictBreakdown {
    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, DistrictAccumulator> = HashMap::new();

    for road in matched {
        let district = road.record.district.as_str();
        let entry = totals.entry(district).or_insert_with(|| {
            order.push(district);
            DistrictAccumulator::default()
        });
        entry.road_count += 1;
        entry.length_km += road.record.length_km;
        entry.composite_sum += road.metrics.composite_score;
        if road.metrics.priority == PriorityLevel::Critical {
            entry.critical_count += 1;
        }
    }

    let mut districts: Vec<DistrictRow> = order
        .into_iter()
        .filter_map(|district| {
            totals.get(district).map(|acc| DistrictRow {
                district: district.to_string(),
                road_count: acc.road_count,
                length_km: round_to(acc.length_km, 2),
                avg_composite_score: round_to(acc.composite_sum / acc.road_count as f64, 1),
                critical_count: acc.critical_count,
            })
        })
        .collect();

    // Stable sort keeps first-occurrence order between equal averages.
    districts.sort_by(|left, right| {
        left.avg_composite_score
            .partial_cmp(&right.avg_composite_score)
            .unwrap_or(Ordering::Equal)
    });

    DistrictBreakdown { districts }
}

fn inspection_schedule(
    matched: &[&ScoredRoad],
    query: &ReportQuery,
    policy: &InspectionPolicy,
) -> InspectionSchedule {
    let mut counts: HashMap<InspectionStatus, usize> = HashMap::new();
    let mut backlog: Vec<(&ScoredRoad, Option<i64>)> = Vec::with_capacity(matched.len());

    for road in matched {
        let status = road.inspection_status(query.as_of, policy);
        *counts.entry(status).or_default() += 1;
        backlog.push((road, road.days_since_inspection(query.as_of)));
    }

    // Never inspected first, then the longest gap.
    backlog.sort_by(|(left, left_gap), (right, right_gap)| {
        let left_gap = left_gap.unwrap_or(i64::MAX);
        let right_gap = right_gap.unwrap_or(i64::MAX);
        right_gap
            .cmp(&left_gap)
            .then_with(|| left.record.road_id.cmp(&right.record.road_id))
    });

    let status_counts = InspectionStatus::ordered()
        .into_iter()
        .map(|status| StatusCount {
            status,
            label: status.label(),
            count: counts.get(&status).copied().unwrap_or(0),
        })
        .collect();

    let roads = backlog
        .into_iter()
        .take(query.limit)
        .map(|(road, _)| road_view(road, query.as_of, policy))
        .collect();

    InspectionSchedule {
        status_counts,
        roads,
    }
}

pub fn road_view(road: &ScoredRoad, as_of: NaiveDate, policy: &InspectionPolicy) -> RoadView {
    let record = &road.record;
    let metrics = &road.metrics;
    RoadView {
        road_id: record.road_id.clone(),
        name: record.name.clone(),
        district: record.district.clone(),
        highway_ref: record.highway_ref.clone(),
        category: record.category.clone(),
        length_km: record.length_km,
        pci: record.pci,
        iri: record.iri,
        composite_score: metrics.composite_score,
        decay_rate: metrics.decay_rate,
        condition: metrics.condition,
        band: metrics.band,
        priority: metrics.priority,
        priority_label: metrics.priority.label(),
        last_inspection: road.last_inspection.clone(),
        days_since_inspection: road.days_since_inspection(as_of),
        inspection_status: road.inspection_status(as_of, policy),
        projected_score: None,
    }
}
