use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use chrono::Local;

use super::filter::ReportRequest;
use super::report::ReportSummary;
use super::service::{RefreshOutcome, ReportService};
use super::snapshot::DatasetSource;
use crate::error::ReportError;

/// Router exposing report generation and dataset refresh.
pub fn report_router<S>(service: Arc<ReportService<S>>) -> Router
where
    S: DatasetSource + 'static,
{
    Router::new()
        .route("/api/v1/reports", post(report_handler::<S>))
        .route("/api/v1/reports/refresh", post(refresh_handler::<S>))
        .with_state(service)
}

pub(crate) async fn report_handler<S>(
    State(service): State<Arc<ReportService<S>>>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<Json<ReportSummary>, ReportError>
where
    S: DatasetSource + 'static,
{
    let Json(request) = payload.map_err(|rejection| ReportError::Validation(rejection.body_text()))?;
    let today = Local::now().date_naive();

    let summary = tokio::task::spawn_blocking(move || service.generate(request, today))
        .await
        .map_err(|err| ReportError::Internal(err.to_string()))??;
    Ok(Json(summary))
}

pub(crate) async fn refresh_handler<S>(
    State(service): State<Arc<ReportService<S>>>,
) -> Result<Json<RefreshOutcome>, ReportError>
where
    S: DatasetSource + 'static,
{
    let outcome = tokio::task::spawn_blocking(move || service.refresh())
        .await
        .map_err(|err| ReportError::Internal(err.to_string()))??;
    Ok(Json(outcome))
}
