use crate::infra::csv_report_service;
use chrono::{Local, NaiveDate};
use clap::Args;
use road_health::config::AppConfig;
use road_health::error::{AppError, ReportError};
use road_health::telemetry::{self, LogTarget};
use road_health::workflows::road_health::report::views::{DistributionEntry, RoadView};
use road_health::workflows::road_health::report::{ReportDetails, ReportSummary};
use road_health::workflows::road_health::ReportRequest;
use serde_json::json;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// condition_overview, priority_maintenance, district_summary or inspection_schedule
    #[arg(long)]
    pub(crate) report_type: String,
    #[arg(long)]
    pub(crate) district: Option<String>,
    /// Condition band A-E
    #[arg(long)]
    pub(crate) band: Option<String>,
    /// Critical, High, Medium or Low
    #[arg(long)]
    pub(crate) priority: Option<String>,
    /// Minimum composite score (inclusive)
    #[arg(long)]
    pub(crate) cibil_min: Option<f64>,
    /// Maximum composite score (inclusive)
    #[arg(long)]
    pub(crate) cibil_max: Option<f64>,
    /// overdue, due_soon or recently_inspected
    #[arg(long)]
    pub(crate) inspection_status: Option<String>,
    /// Earliest latest-inspection date (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) inspection_from: Option<NaiveDate>,
    /// Latest latest-inspection date (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) inspection_to: Option<NaiveDate>,
    /// Evaluation date for inspection status (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Maximum rows in road listings
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Override the configured road registry CSV
    #[arg(long)]
    pub(crate) registry: Option<PathBuf>,
    /// Override the configured inspection history CSV
    #[arg(long)]
    pub(crate) inspections: Option<PathBuf>,
    /// Print the summary as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

impl ReportArgs {
    fn request(&self) -> ReportRequest {
        let date = |value: Option<NaiveDate>| value.map(|date| date.format("%Y-%m-%d").to_string());
        ReportRequest {
            report_type: Some(self.report_type.clone()),
            district: self.district.clone(),
            condition_band: self.band.clone(),
            priority_level: self.priority.clone(),
            cibil_min: self.cibil_min,
            cibil_max: self.cibil_max,
            inspection_status: self.inspection_status.clone(),
            inspection_date_from: date(self.inspection_from),
            inspection_date_to: date(self.inspection_to),
            as_of: date(self.as_of),
            limit: self.limit,
        }
    }
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(path) = args.registry.clone() {
        config.datasets.registry_path = path;
    }
    if let Some(path) = args.inspections.clone() {
        config.datasets.inspections_path = path;
    }

    telemetry::init_for(&config.telemetry, LogTarget::Cli)?;

    let service = csv_report_service(&config);
    let today = Local::now().date_naive();
    match service.generate(args.request(), today) {
        Ok(summary) if args.json => print_json(&summary)?,
        Ok(summary) => render_summary(&summary),
        Err(ReportError::EmptyDataset) if args.json => {
            let error = ReportError::EmptyDataset;
            print_json(&json!({ "error": error.kind(), "message": error.to_string() }))?;
        }
        Err(ReportError::EmptyDataset) => println!("No roads matched the requested filters."),
        Err(other) => return Err(other.into()),
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| ReportError::Internal(err.to_string()))?;
    println!("{rendered}");
    Ok(())
}

fn render_summary(summary: &ReportSummary) {
    println!("{} (as of {})", summary.report_label, summary.as_of);
    println!(
        "- {} of {} roads matched | {:.2} of {:.2} km",
        summary.filtered_count,
        summary.total_roads,
        summary.filtered_length_km,
        summary.total_length_km
    );
    println!("- average composite score {:.1}", summary.avg_composite_score);

    render_distribution("District", &summary.by_district);
    render_distribution("Band", &summary.by_band);
    render_distribution("Condition", &summary.by_condition);
    render_distribution("Priority", &summary.by_priority);

    match &summary.details {
        ReportDetails::ConditionOverview(overview) => {
            println!("\nCondition overview");
            println!(
                "- composite {:.1} avg | {:.1} min | {:.1} max | decay {:.4}/day avg",
                overview.avg_composite_score,
                overview.min_composite_score,
                overview.max_composite_score,
                overview.avg_decay_rate
            );
            println!(
                "- hazards: {} flood prone | {} landslide prone | {} ghat sections",
                overview.hazards.flood_prone,
                overview.hazards.landslide_prone,
                overview.hazards.ghat_section
            );
            render_distribution("Surface", &overview.by_surface);
        }
        ReportDetails::PriorityMaintenance(details) => {
            println!(
                "\nMaintenance queue ({}-day projection)",
                details.projection_days
            );
            for road in &details.roads {
                render_road(road);
            }
        }
        ReportDetails::DistrictSummary(breakdown) => {
            println!("\nDistricts (lowest average first)");
            for row in &breakdown.districts {
                println!(
                    "  - {}: {} roads | {:.2} km | {:.1} avg composite | {} critical",
                    row.district,
                    row.road_count,
                    row.length_km,
                    row.avg_composite_score,
                    row.critical_count
                );
            }
        }
        ReportDetails::InspectionSchedule(schedule) => {
            println!("\nInspection status");
            for entry in &schedule.status_counts {
                println!("  - {}: {}", entry.label, entry.count);
            }
            println!("Most overdue");
            for road in &schedule.roads {
                render_road(road);
            }
        }
    }
}

fn render_distribution(title: &str, entries: &[DistributionEntry]) {
    if entries.is_empty() {
        return;
    }
    println!("{title}:");
    for entry in entries {
        println!(
            "  - {}: {} roads | {:.2} km",
            entry.label, entry.count, entry.length_km
        );
    }
}

fn render_road(road: &RoadView) {
    let inspected = road
        .last_inspection
        .as_deref()
        .unwrap_or("never inspected");
    let projection = road
        .projected_score
        .map(|score| format!(" -> {score:.1}"))
        .unwrap_or_default();
    println!(
        "  - {} {} ({}) | {} | composite {:.1}{} | band {} | last inspected {}",
        road.road_id,
        road.name,
        road.district,
        road.priority_label,
        road.composite_score,
        projection,
        road.band.label(),
        inspected
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_map_onto_a_report_request() {
        let args = ReportArgs {
            report_type: "inspection_schedule".to_string(),
            district: Some("Satara".to_string()),
            band: None,
            priority: Some("High".to_string()),
            cibil_min: None,
            cibil_max: Some(60.0),
            inspection_status: Some("overdue".to_string()),
            inspection_from: NaiveDate::from_ymd_opt(2025, 1, 1),
            inspection_to: None,
            as_of: NaiveDate::from_ymd_opt(2026, 1, 1),
            limit: Some(10),
            registry: None,
            inspections: None,
            json: false,
        };

        let request = args.request();
        assert_eq!(request.report_type.as_deref(), Some("inspection_schedule"));
        assert_eq!(request.inspection_date_from.as_deref(), Some("2025-01-01"));
        assert_eq!(request.as_of.as_deref(), Some("2026-01-01"));
        assert_eq!(request.cibil_max, Some(60.0));
        assert!(request.condition_band.is_none());
    }
}
