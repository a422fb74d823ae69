use super::super::domain::{ConditionClass, PriorityLevel};
use super::super::filter::{FilterEvaluator, ReportQuery};
use super::super::policy::InspectionPolicy;
use super::super::scoring::{round_to, ScoredRoad};
use super::payloads;
use super::views::{DistributionEntry, NetworkTotals, ReportSummary};
use crate::error::ReportError;
use std::collections::HashMap;

/// Grouped counts kept in first-occurrence order.
#[derive(Debug, Default)]
pub(crate) struct Distribution {
    entries: Vec<DistributionEntry>,
    positions: HashMap<String, usize>,
}

impl Distribution {
    pub(crate) fn record(&mut self, key: &str, label: &str, length_km: f64) {
        let position = match self.positions.get(key) {
            Some(position) => *position,
            None => {
                self.entries.push(DistributionEntry {
                    key: key.to_string(),
                    label: label.to_string(),
                    count: 0,
                    length_km: 0.0,
                });
                self.positions.insert(key.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        let entry = &mut self.entries[position];
        entry.count += 1;
        entry.length_km += length_km;
    }

    pub(crate) fn finish(self) -> Vec<DistributionEntry> {
        self.entries
            .into_iter()
            .map(|mut entry| {
                entry.length_km = round_to(entry.length_km, 2);
                entry
            })
            .collect()
    }
}

#[derive(Debug, Default)]
struct Tally<'a> {
    matched: Vec<&'a ScoredRoad>,
    length_km: f64,
    composite_sum: f64,
    by_district: Distribution,
    by_band: Distribution,
    by_condition: Distribution,
    by_priority: Distribution,
}

impl<'a> Tally<'a> {
    fn add(&mut self, road: &'a ScoredRoad) {
        let length = road.record.length_km;
        let metrics = &road.metrics;

        self.length_km += length;
        self.composite_sum += metrics.composite_score;
        self.by_district
            .record(&road.record.district, &road.record.district, length);
        self.by_band
            .record(metrics.band.label(), metrics.band.label(), length);
        self.by_condition.record(
            condition_key(metrics.condition),
            metrics.condition.label(),
            length,
        );
        self.by_priority.record(
            priority_key(metrics.priority),
            metrics.priority.label(),
            length,
        );
        self.matched.push(road);
    }
}

/// Filters `roads` and folds the matches into a [`ReportSummary`] in one pass.
///
/// Zero matches is reported as [`ReportError::EmptyDataset`] rather than a
/// zero-filled summary.
pub fn aggregate(
    roads: &[ScoredRoad],
    query: &ReportQuery,
    policy: &InspectionPolicy,
    totals: NetworkTotals,
) -> Result<ReportSummary, ReportError> {
    let evaluator = FilterEvaluator::new(&query.filters, policy, query.as_of);

    let mut tally = Tally::default();
    for road in roads {
        if evaluator.matches(road) {
            tally.add(road);
        }
    }

    if tally.matched.is_empty() {
        return Err(ReportError::EmptyDataset);
    }

    let filtered_count = tally.matched.len();
    let report_type = query.filters.report_type;
    let details = payloads::build(report_type, &tally.matched, query, policy);

    Ok(ReportSummary {
        report_type,
        report_label: report_type.label(),
        as_of: query.as_of,
        filters: query.filters.clone(),
        total_roads: totals.total_roads,
        total_length_km: round_to(totals.total_length_km, 2),
        filtered_count,
        filtered_length_km: round_to(tally.length_km, 2),
        avg_composite_score: round_to(tally.composite_sum / filtered_count as f64, 1),
        by_district: tally.by_district.finish(),
        by_band: tally.by_band.finish(),
        by_condition: tally.by_condition.finish(),
        by_priority: tally.by_priority.finish(),
        details,
    })
}

impl NetworkTotals {
    pub fn from_roads(roads: &[ScoredRoad]) -> Self {
        Self {
            total_roads: roads.len(),
            total_length_km: roads.iter().map(|road| road.record.length_km).sum(),
        }
    }
}

fn condition_key(condition: ConditionClass) -> &'static str {
    match condition {
        ConditionClass::Critical => "critical",
        ConditionClass::Poor => "poor",
        ConditionClass::Fair => "fair",
        ConditionClass::Good => "good",
    }
}

fn priority_key(priority: PriorityLevel) -> &'static str {
    match priority {
        PriorityLevel::Critical => "critical",
        PriorityLevel::High => "high",
        PriorityLevel::Medium => "medium",
        PriorityLevel::Low => "low",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribution_keeps_first_occurrence_order() {
        let mut distribution = Distribution::default();
        distribution.record("Satara", "Satara", 1.25);
        distribution.record("Pune", "Pune", 2.0);
        distribution.record("Satara", "Satara", 0.5);

        let entries = distribution.finish();
        let keys: Vec<&str> = entries.iter().map(|entry| entry.key.as_str()).collect();
        assert_eq!(keys, vec!["Satara", "Pune"]);
        assert_eq!(entries[0].count, 2);
        assert_eq!(entries[0].length_km, 1.75);
    }
}
