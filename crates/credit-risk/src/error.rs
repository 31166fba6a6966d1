use crate::config::ConfigError;
use crate::scoring::{ArtifactLoadError, BatchError, FormError, ScoringError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Artifacts(ArtifactLoadError),
    Scoring(ScoringError),
    Form(FormError),
    Batch(BatchError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Artifacts(err) => write!(f, "artifact error: {}", err),
            AppError::Scoring(err) => write!(f, "scoring rejected: {}", err),
            AppError::Form(err) => write!(f, "{}", err),
            AppError::Batch(err) => write!(f, "batch error: {}", err),
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
            AppError::Artifacts(err) => Some(err),
            AppError::Scoring(err) => Some(err),
            AppError::Form(err) => Some(err),
            AppError::Batch(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, body) = match self {
            AppError::Form(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": message, "fields": err.violations }),
            ),
            AppError::Scoring(ScoringError::UnknownCategory(err)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": message,
                    "field": err.field.column(),
                    "label": err.label,
                }),
            ),
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Artifacts(_)
            | AppError::Batch(_)
            | AppError::Scoring(ScoringError::Inference(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": message }),
            ),
        };

        (status, Json(body)).into_response()
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

impl From<ArtifactLoadError> for AppError {
    fn from(value: ArtifactLoadError) -> Self {
        Self::Artifacts(value)
    }
}

impl From<ScoringError> for AppError {
    fn from(value: ScoringError) -> Self {
        Self::Scoring(value)
    }
}

impl From<FormError> for AppError {
    fn from(value: FormError) -> Self {
        Self::Form(value)
    }
}

impl From<BatchError> for AppError {
    fn from(value: BatchError) -> Self {
        Self::Batch(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::domain::CategoricalField;
    use crate::scoring::form::FieldViolation;
    use crate::scoring::{InferenceError, UnknownCategoryError};
    use serde_json::Value;

    async fn parts(error: AppError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&body).expect("json payload"))
    }

    #[tokio::test]
    async fn form_errors_list_every_field() {
        let error = AppError::Form(FormError {
            violations: vec![FieldViolation {
                field: "Age",
                message: "must be between 18 and 80, got 5".to_string(),
            }],
        });

        let (status, payload) = parts(error).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(payload["fields"][0]["field"], "Age");
        assert!(payload["error"]
            .as_str()
            .is_some_and(|text| text.starts_with("invalid form input")));
    }

    #[tokio::test]
    async fn unknown_category_names_field_and_label() {
        let error = AppError::from(ScoringError::from(UnknownCategoryError {
            field: CategoricalField::SavingAccounts,
            label: "offshore".to_string(),
        }));

        let (status, payload) = parts(error).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(payload["field"], "Saving accounts");
        assert_eq!(payload["label"], "offshore");
    }

    #[tokio::test]
    async fn inference_failures_are_server_errors() {
        let error = AppError::from(ScoringError::from(InferenceError::MalformedOutput(1.5)));

        let (status, payload) = parts(error).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(payload.get("field").is_none());
    }
}
