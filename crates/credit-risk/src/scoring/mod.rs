//! Creditworthiness scoring over pre-trained artifacts.
//!
//! The flow is load, encode, predict, classify. Artifacts are loaded once into an
//! [`ArtifactBundle`] and passed explicitly to every call so the core can be exercised
//! with injected classifiers and encoders.

pub mod artifacts;
pub mod batch;
pub mod classifier;
pub mod decision;
pub mod domain;
pub mod encoder;
pub mod form;
pub mod report;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use artifacts::{load_artifacts, ArtifactBundle, ArtifactLoadError, ArtifactPaths};
pub use batch::{read_applicants, read_applicants_from_path, BatchError};
pub use classifier::{Classifier, ClassifierArtifact, InferenceError, ModelDefinitionError};
pub use decision::classify;
pub use domain::{
    Applicant, CategoricalField, FeatureVector, ScoringResult, Verdict, FEATURE_COUNT,
    FEATURE_ORDER,
};
pub use encoder::{CategoricalEncoder, EncoderSet};
pub use form::{FormError, FormSchema, ThresholdPolicy};
pub use report::ScoringReport;
pub use router::{scoring_router, ScoreRequest, ScoringState};
pub use service::{
    encode, predict, score, CreditScoringService, ScoringError, UnknownCategoryError,
};
