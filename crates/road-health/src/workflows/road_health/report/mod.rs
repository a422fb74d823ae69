mod payloads;
mod summary;
pub mod views;

pub use payloads::{road_view, PROJECTION_DAYS};
pub use summary::aggregate;
pub use views::{NetworkTotals, ReportDetails, ReportSummary};
