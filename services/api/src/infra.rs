use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use road_health::config::AppConfig;
use road_health::workflows::road_health::{CsvDatasetSource, ReportService};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn csv_report_service(config: &AppConfig) -> ReportService<CsvDatasetSource> {
    let source = CsvDatasetSource::new(
        config.datasets.registry_path.clone(),
        config.datasets.inspections_path.clone(),
    );
    ReportService::new(source, config.engine.clone())
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_reports_offending_input() {
        assert_eq!(
            parse_date(" 2025-06-01 "),
            Ok(NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date"))
        );
        let error = parse_date("01/06/2025").expect_err("rejected");
        assert!(error.contains("01/06/2025"));
    }
}
