pub mod domain;
pub mod filter;
mod index;
pub mod policy;
pub mod report;
mod router;
pub mod scoring;
mod service;
pub mod snapshot;

pub use filter::{FilterEvaluator, ReportFilters, ReportQuery, ReportRequest};
pub use index::InspectionIndex;
pub use policy::{InspectionPolicy, PolicyError, ScoringPolicy};
pub use router::report_router;
pub use scoring::{derive_metrics, score_roads, RoadMetrics, ScoredRoad};
pub use service::{RefreshOutcome, ReportService};
pub use snapshot::{
    CsvDatasetSource, DatasetSource, InMemoryDatasetSource, RoadSnapshot, SnapshotStore,
};
