use crate::cli::ServeArgs;
use crate::infra::{csv_report_service, AppState};
use crate::routes::with_report_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use road_health::config::AppConfig;
use road_health::error::{AppError, ReportError};
use road_health::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let report_service = Arc::new(csv_report_service(&config));

    // Warm the snapshot so the first report does not pay for the load.
    let warm = Arc::clone(&report_service);
    let warmed = tokio::task::spawn_blocking(move || warm.store().current().map(|_| ()))
        .await
        .map_err(|err| ReportError::Internal(err.to_string()))?;
    if let Err(error) = warmed {
        warn!(%error, "road datasets not loaded at startup; reports will retry");
    }

    let app = with_report_routes(report_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        registry = %config.datasets.registry_path.display(),
        inspections = %config.datasets.inspections_path.display(),
        "road health service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
