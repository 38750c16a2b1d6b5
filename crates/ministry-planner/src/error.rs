use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::scheduling::{
    AssignmentError, AutoAssignError, RepositoryError, SnapshotError, ValidationError,
};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Snapshot(SnapshotError),
    Store(RepositoryError),
    Assignment(AssignmentError),
    AutoAssign(AutoAssignError),
    Validation(ValidationError),
    Report(csv::Error),
    Render(serde_json::Error),
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Snapshot(err) => write!(f, "snapshot error: {}", err),
            AppError::Store(err) => write!(f, "store error: {}", err),
            AppError::Assignment(err) => write!(f, "assignment error: {}", err),
            AppError::AutoAssign(err) => write!(f, "auto-assignment error: {}", err),
            AppError::Validation(err) => write!(f, "validation error: {}", err),
            AppError::Report(err) => write!(f, "report error: {}", err),
            AppError::Render(err) => write!(f, "render error: {}", err),
            AppError::InvalidRange { start, end } => {
                write!(f, "invalid range: end {} precedes start {}", end, start)
            }
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
            AppError::Snapshot(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::Assignment(err) => Some(err),
            AppError::AutoAssign(err) => Some(err),
            AppError::Validation(err) => Some(err),
            AppError::Report(err) => Some(err),
            AppError::Render(err) => Some(err),
            AppError::InvalidRange { .. } => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Assignment(
                AssignmentError::WeekNotFound { .. }
                | AssignmentError::PartNotFound { .. }
                | AssignmentError::PersonNotFound { .. }
                | AssignmentError::AssignmentNotFound { .. },
            ) => StatusCode::NOT_FOUND,
            AppError::Assignment(AssignmentError::Ineligible(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Assignment(AssignmentError::Conflict) => StatusCode::CONFLICT,
            AppError::InvalidRange { .. } => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Snapshot(_)
            | AppError::Store(_)
            | AppError::Assignment(AssignmentError::Persistence(_))
            | AppError::AutoAssign(_)
            | AppError::Validation(_)
            | AppError::Report(_)
            | AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
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

impl From<SnapshotError> for AppError {
    fn from(value: SnapshotError) -> Self {
        Self::Snapshot(value)
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        Self::Store(value)
    }
}

impl From<AssignmentError> for AppError {
    fn from(value: AssignmentError) -> Self {
        Self::Assignment(value)
    }
}

impl From<AutoAssignError> for AppError {
    fn from(value: AutoAssignError) -> Self {
        Self::AutoAssign(value)
    }
}

impl From<ValidationError> for AppError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<csv::Error> for AppError {
    fn from(value: csv::Error) -> Self {
        Self::Report(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Render(value)
    }
}
