use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::scoring::artifacts::ArtifactBundle;
use crate::scoring::classifier::{Classifier, ClassifierArtifact, InferenceError};
use crate::scoring::domain::{Applicant, FEATURE_ORDER};
use crate::scoring::encoder::{CategoricalEncoder, EncoderSet};
use crate::scoring::router::ScoringState;
use crate::scoring::service::CreditScoringService;

const FIXTURE_MODEL: &str = include_str!("../../../tests/fixtures/artifacts/XGB_Credit_model.json");

pub(super) fn encoders() -> EncoderSet {
    EncoderSet::new(
        CategoricalEncoder::from_classes("Sex", ["female", "male"]).expect("sex"),
        CategoricalEncoder::from_classes("Housing", ["free", "own", "rent"]).expect("housing"),
        CategoricalEncoder::from_classes(
            "Saving accounts",
            ["little", "moderate", "quite rich", "rich"],
        )
        .expect("saving accounts"),
        CategoricalEncoder::from_classes("Checking account", ["little", "moderate", "rich"])
            .expect("checking account"),
    )
}

/// Age 30, male, job 1, own, little/little, 1000 over 12 months.
pub(super) fn applicant() -> Applicant {
    Applicant {
        age: 30,
        sex: "male".to_string(),
        job: 1,
        housing: "own".to_string(),
        saving_accounts: "little".to_string(),
        checking_account: "little".to_string(),
        credit_amount: 1000,
        duration_months: 12,
    }
}

/// Young renter asking for a large, long loan; scores well below the slider minimum.
pub(super) fn risky_applicant() -> Applicant {
    Applicant {
        age: 22,
        sex: "female".to_string(),
        job: 2,
        housing: "rent".to_string(),
        saving_accounts: "little".to_string(),
        checking_account: "little".to_string(),
        credit_amount: 7000,
        duration_months: 36,
    }
}

pub(super) fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}

pub(super) fn fixture_bundle() -> ArtifactBundle {
    let artifact: ClassifierArtifact =
        serde_json::from_str(FIXTURE_MODEL).expect("fixture model parses");
    let classifier = artifact
        .into_classifier(&FEATURE_ORDER)
        .expect("fixture model validates");
    ArtifactBundle::new(classifier, encoders())
}

/// Classifier returning a fixed probability and remembering every row it saw.
pub(super) struct FixedClassifier {
    probability: f64,
    seen: Mutex<Vec<Vec<f64>>>,
}

impl FixedClassifier {
    pub(super) fn new(probability: f64) -> Self {
        Self {
            probability,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn seen(&self) -> Vec<Vec<f64>> {
        self.seen.lock().expect("lock").clone()
    }
}

impl Classifier for FixedClassifier {
    fn predict_probability(&self, features: &[f64]) -> Result<f64, InferenceError> {
        self.seen.lock().expect("lock").push(features.to_vec());
        Ok(self.probability)
    }
}

/// Classifier that always fails, standing in for a broken model.
pub(super) struct FailingClassifier;

impl Classifier for FailingClassifier {
    fn predict_probability(&self, features: &[f64]) -> Result<f64, InferenceError> {
        Err(InferenceError::ShapeMismatch {
            expected: 9,
            actual: features.len(),
        })
    }
}

pub(super) fn bundle_with(classifier: Arc<dyn Classifier>) -> ArtifactBundle {
    ArtifactBundle::new(classifier, encoders())
}

pub(super) fn scoring_state(bundle: ArtifactBundle) -> ScoringState {
    ScoringState {
        service: CreditScoringService::new(Arc::new(bundle)),
        default_threshold: 0.5,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
