use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{ScoringResult, Verdict};

/// Presentation of a scoring result: banner, confidence line and explanation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringReport {
    pub verdict: Verdict,
    pub probability: f64,
    pub threshold: f64,
    pub banner: String,
    pub confidence: String,
    pub explanation: Vec<String>,
    pub assessed_at: DateTime<Utc>,
}

impl ScoringReport {
    pub fn from_result(result: &ScoringResult) -> Self {
        Self::at(result, Utc::now())
    }

    pub fn at(result: &ScoringResult, assessed_at: DateTime<Utc>) -> Self {
        let probability = format_percent(result.probability);
        Self {
            verdict: result.verdict,
            probability: result.probability,
            threshold: result.threshold,
            banner: format!("Credit Risk Assessment: {}", result.verdict),
            confidence: format!("Model Confidence (GOOD Credit Probability): {probability}"),
            explanation: vec![
                format!(
                    "The model estimates a {probability} probability that this applicant is creditworthy."
                ),
                format!(
                    "Based on the selected threshold ({:.2}), the applicant is classified as {}.",
                    result.threshold, result.verdict
                ),
                "This probability-based decision aligns with banking risk assessment practices."
                    .to_string(),
            ],
            assessed_at,
        }
    }

    pub fn is_good(&self) -> bool {
        self.verdict == Verdict::Good
    }
}

/// `0.64566` renders as `64.57%`.
pub fn format_percent(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}
