use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::domain::Applicant;
use super::form::{self, FormSchema};
use super::report::ScoringReport;
use super::service::CreditScoringService;
use crate::error::AppError;

/// Shared handler state: the loaded artifacts plus the threshold used when a request omits one.
#[derive(Debug, Clone)]
pub struct ScoringState {
    pub service: CreditScoringService,
    pub default_threshold: f64,
}

/// Form submission: the applicant plus the slider position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub applicant: Applicant,
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// Router builder exposing the scoring form endpoints.
pub fn scoring_router(state: ScoringState) -> Router {
    Router::new()
        .route("/api/v1/credit/score", post(score_handler))
        .route("/api/v1/credit/form", get(form_handler))
        .with_state(state)
}

pub(crate) async fn score_handler(
    State(state): State<ScoringState>,
    Json(request): Json<ScoreRequest>,
) -> Result<(StatusCode, Json<ScoringReport>), AppError> {
    let threshold = request.threshold.unwrap_or(state.default_threshold);
    form::validate(&request.applicant, threshold)?;

    let result = state.service.score(&request.applicant, threshold)?;
    Ok((StatusCode::OK, Json(ScoringReport::from_result(&result))))
}

pub(crate) async fn form_handler() -> Json<FormSchema> {
    Json(FormSchema::standard())
}
