use std::sync::Arc;

use tracing::{debug, warn};

use super::artifacts::ArtifactBundle;
use super::classifier::InferenceError;
use super::decision::classify;
use super::domain::{Applicant, CategoricalField, FeatureVector, ScoringResult};

/// Applicant label outside the domain an encoder was trained on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{label}' is not a known {field} category")]
pub struct UnknownCategoryError {
    pub field: CategoricalField,
    pub label: String,
}

/// Per-request scoring failure. Never affects other requests.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error(transparent)]
    UnknownCategory(#[from] UnknownCategoryError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Encode an applicant in the column order the classifier was trained on.
pub fn encode(
    bundle: &ArtifactBundle,
    applicant: &Applicant,
) -> Result<FeatureVector, UnknownCategoryError> {
    let mut values = [
        f64::from(applicant.age),
        0.0,
        f64::from(applicant.job),
        0.0,
        0.0,
        0.0,
        f64::from(applicant.credit_amount),
        f64::from(applicant.duration_months),
    ];

    for field in CategoricalField::ALL {
        let label = applicant.label(field);
        let code = bundle
            .encoders()
            .get(field)
            .code(label)
            .ok_or_else(|| UnknownCategoryError {
                field,
                label: label.to_string(),
            })?;
        values[field.feature_index()] = f64::from(code);
    }

    Ok(FeatureVector::new(values))
}

/// Positive-class probability for an encoded applicant.
pub fn predict(bundle: &ArtifactBundle, features: &FeatureVector) -> Result<f64, InferenceError> {
    let probability = bundle
        .classifier()
        .predict_probability(features.as_slice())?;

    if (0.0..=1.0).contains(&probability) {
        Ok(probability)
    } else {
        Err(InferenceError::MalformedOutput(probability))
    }
}

/// Encode, predict and classify one applicant against a caller-chosen threshold.
pub fn score(
    bundle: &ArtifactBundle,
    applicant: &Applicant,
    threshold: f64,
) -> Result<ScoringResult, ScoringError> {
    let features = encode(bundle, applicant)?;
    let probability = predict(bundle, &features)?;

    Ok(ScoringResult {
        probability,
        threshold,
        verdict: classify(probability, threshold),
    })
}

/// Cloneable handle over the shared artifacts, used by the HTTP and CLI front-ends.
#[derive(Debug, Clone)]
pub struct CreditScoringService {
    bundle: Arc<ArtifactBundle>,
}

impl CreditScoringService {
    pub fn new(bundle: Arc<ArtifactBundle>) -> Self {
        Self { bundle }
    }

    pub fn bundle(&self) -> &ArtifactBundle {
        &self.bundle
    }

    pub fn score(
        &self,
        applicant: &Applicant,
        threshold: f64,
    ) -> Result<ScoringResult, ScoringError> {
        match score(&self.bundle, applicant, threshold) {
            Ok(result) => {
                debug!(
                    probability = result.probability,
                    threshold,
                    verdict = %result.verdict,
                    "applicant scored"
                );
                Ok(result)
            }
            Err(err) => {
                warn!(error = %err, "scoring request rejected");
                Err(err)
            }
        }
    }

    /// Score every applicant independently; a rejected row does not stop the rest.
    pub fn score_batch(
        &self,
        applicants: &[Applicant],
        threshold: f64,
    ) -> Vec<Result<ScoringResult, ScoringError>> {
        applicants
            .iter()
            .map(|applicant| self.score(applicant, threshold))
            .collect()
    }
}
