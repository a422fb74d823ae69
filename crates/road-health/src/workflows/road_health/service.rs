use super::filter::ReportRequest;
use super::policy::InspectionPolicy;
use super::report::{aggregate, ReportSummary};
use super::snapshot::{DatasetSource, SnapshotStore};
use crate::config::EngineConfig;
use crate::error::ReportError;
use crate::workflows::datasets::LoadReport;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

/// Diagnostics returned after an explicit dataset refresh.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    pub roads: usize,
    pub inspected_roads: usize,
    pub inspections: usize,
    pub total_length_km: f64,
    pub load_report: LoadReport,
}

/// Runs report requests against the current road snapshot.
pub struct ReportService<S> {
    store: SnapshotStore<S>,
    inspection: InspectionPolicy,
}

impl<S: DatasetSource> ReportService<S> {
    pub fn new(source: S, engine: EngineConfig) -> Self {
        Self {
            store: SnapshotStore::new(source, engine.scoring),
            inspection: engine.inspection,
        }
    }

    pub fn store(&self) -> &SnapshotStore<S> {
        &self.store
    }

    pub fn inspection_policy(&self) -> &InspectionPolicy {
        &self.inspection
    }

    /// Validates `request`, then filters and aggregates the current snapshot.
    /// `today` is the evaluation date when the request carries no `asOf`.
    pub fn generate(
        &self,
        request: ReportRequest,
        today: NaiveDate,
    ) -> Result<ReportSummary, ReportError> {
        let query = request.validate(today)?;
        let snapshot = self.store.current()?;
        debug!(report = query.filters.report_type.key(), as_of = %query.as_of, "running report");

        let outcome = aggregate(&snapshot.roads, &query, &self.inspection, snapshot.totals);
        match &outcome {
            Ok(summary) => info!(
                report = summary.report_type.key(),
                matched = summary.filtered_count,
                total = summary.total_roads,
                "report generated"
            ),
            Err(ReportError::EmptyDataset) => info!(
                report = query.filters.report_type.key(),
                "report matched no roads"
            ),
            Err(_) => {}
        }
        outcome
    }

    pub fn refresh(&self) -> Result<RefreshOutcome, ReportError> {
        let snapshot = self.store.refresh()?;
        Ok(RefreshOutcome {
            roads: snapshot.roads.len(),
            inspected_roads: snapshot.index.key_count(),
            inspections: snapshot.index.event_count(),
            total_length_km: super::scoring::round_to(snapshot.totals.total_length_km, 2),
            load_report: snapshot.load_report.clone(),
        })
    }
}
