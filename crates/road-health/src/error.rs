use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::datasets::{DatasetKind, DatasetLoadError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

/// Outcomes of a report computation other than a populated summary.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("invalid report request: {0}")]
    Validation(String),
    #[error("{} unavailable: {detail}", .dataset.label())]
    DataUnavailable { dataset: DatasetKind, detail: String },
    /// The filters matched zero roads. A normal outcome, not a failure.
    #[error("no roads matched the requested filters")]
    EmptyDataset,
    #[error("report computation failed: {0}")]
    Internal(String),
}

impl ReportError {
    pub const fn kind(&self) -> &'static str {
        match self {
            ReportError::Validation(_) => "validation_error",
            ReportError::DataUnavailable { .. } => "data_unavailable",
            ReportError::EmptyDataset => "empty_dataset",
            ReportError::Internal(_) => "internal_error",
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            ReportError::Validation(_) => StatusCode::BAD_REQUEST,
            ReportError::EmptyDataset => StatusCode::OK,
            ReportError::DataUnavailable { .. } | ReportError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<DatasetLoadError> for ReportError {
    fn from(value: DatasetLoadError) -> Self {
        ReportError::DataUnavailable {
            dataset: value.dataset(),
            detail: value.to_string(),
        }
    }
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.kind(),
            "message": self.to_string(),
        }));
        (self.status(), body).into_response()
    }
}

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Dataset(DatasetLoadError),
    Report(ReportError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Dataset(err) => write!(f, "dataset error: {}", err),
            AppError::Report(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Dataset(err) => Some(err),
            AppError::Report(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Report(err) => err.into_response(),
            AppError::Dataset(err) => ReportError::from(err).into_response(),
            other => {
                let body = Json(json!({
                    "error": "internal_error",
                    "message": other.to_string(),
                }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<DatasetLoadError> for AppError {
    fn from(value: DatasetLoadError) -> Self {
        Self::Dataset(value)
    }
}

impl From<ReportError> for AppError {
    fn from(value: ReportError) -> Self {
        Self::Report(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_dataset_is_a_successful_response() {
        let response = ReportError::EmptyDataset.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(ReportError::EmptyDataset.kind(), "empty_dataset");
    }

    #[test]
    fn validation_and_data_errors_map_to_client_and_server_statuses() {
        assert_eq!(
            ReportError::Validation("reportType is required".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        let unavailable = ReportError::DataUnavailable {
            dataset: DatasetKind::Inspections,
            detail: "missing".to_string(),
        };
        assert_eq!(unavailable.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(unavailable.to_string(), "inspection history unavailable: missing");
    }
}
