use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::info;

use super::classifier::{Classifier, ClassifierArtifact};
use super::domain::{CategoricalField, FEATURE_ORDER};
use super::encoder::{CategoricalEncoder, EncoderArtifact, EncoderSet};

/// File name of the classifier export inside an artifact directory.
pub const MODEL_FILE_NAME: &str = "XGB_Credit_model.json";

/// Storage locations of the classifier and its four encoders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub sex_encoder: PathBuf,
    pub housing_encoder: PathBuf,
    pub saving_accounts_encoder: PathBuf,
    pub checking_account_encoder: PathBuf,
}

impl ArtifactPaths {
    /// Conventional layout: `XGB_Credit_model.json` plus `<column>_encoder.json` per field.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model: dir.join(MODEL_FILE_NAME),
            sex_encoder: dir.join(encoder_file_name(CategoricalField::Sex)),
            housing_encoder: dir.join(encoder_file_name(CategoricalField::Housing)),
            saving_accounts_encoder: dir.join(encoder_file_name(CategoricalField::SavingAccounts)),
            checking_account_encoder: dir
                .join(encoder_file_name(CategoricalField::CheckingAccount)),
        }
    }

    pub fn encoder(&self, field: CategoricalField) -> &Path {
        match field {
            CategoricalField::Sex => &self.sex_encoder,
            CategoricalField::Housing => &self.housing_encoder,
            CategoricalField::SavingAccounts => &self.saving_accounts_encoder,
            CategoricalField::CheckingAccount => &self.checking_account_encoder,
        }
    }
}

pub fn encoder_file_name(field: CategoricalField) -> String {
    format!("{}_encoder.json", field.column())
}

/// Classifier and encoders, loaded once and then only read.
#[derive(Clone)]
pub struct ArtifactBundle {
    classifier: Arc<dyn Classifier>,
    encoders: EncoderSet,
}

impl ArtifactBundle {
    pub fn new(classifier: Arc<dyn Classifier>, encoders: EncoderSet) -> Self {
        Self {
            classifier,
            encoders,
        }
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn encoders(&self) -> &EncoderSet {
        &self.encoders
    }
}

impl fmt::Debug for ArtifactBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactBundle")
            .field("model_version", &self.classifier.version())
            .field("encoders", &self.encoders)
            .finish()
    }
}

/// Startup failure reading one artifact. The service must not accept requests after this.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactLoadError {
    #[error("artifact {path} does not exist")]
    Missing { path: PathBuf },
    #[error("artifact {path} could not be read: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("artifact {path} is not valid JSON for its type: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("artifact {path} is invalid: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

impl ArtifactLoadError {
    pub fn path(&self) -> &Path {
        match self {
            ArtifactLoadError::Missing { path }
            | ArtifactLoadError::Unreadable { path, .. }
            | ArtifactLoadError::Malformed { path, .. }
            | ArtifactLoadError::Invalid { path, .. } => path,
        }
    }
}

/// Read the classifier and all four encoders.
pub fn load_artifacts(paths: &ArtifactPaths) -> Result<ArtifactBundle, ArtifactLoadError> {
    let model_artifact: ClassifierArtifact = read_json(&paths.model)?;
    let classifier =
        model_artifact
            .into_classifier(&FEATURE_ORDER)
            .map_err(|err| ArtifactLoadError::Invalid {
                path: paths.model.clone(),
                reason: err.to_string(),
            })?;

    let sex = load_encoder(paths, CategoricalField::Sex)?;
    let housing = load_encoder(paths, CategoricalField::Housing)?;
    let saving_accounts = load_encoder(paths, CategoricalField::SavingAccounts)?;
    let checking_account = load_encoder(paths, CategoricalField::CheckingAccount)?;

    info!(
        model = %paths.model.display(),
        model_version = classifier.version().unwrap_or("unversioned"),
        tree_count = ?classifier.tree_count(),
        "credit scoring artifacts loaded"
    );

    Ok(ArtifactBundle::new(
        classifier,
        EncoderSet::new(sex, housing, saving_accounts, checking_account),
    ))
}

fn load_encoder(
    paths: &ArtifactPaths,
    field: CategoricalField,
) -> Result<CategoricalEncoder, ArtifactLoadError> {
    let path = paths.encoder(field);
    let artifact: EncoderArtifact = read_json(path)?;

    if artifact.column != field.column() {
        return Err(ArtifactLoadError::Invalid {
            path: path.to_path_buf(),
            reason: format!(
                "encoder is for column '{}' but '{}' was expected",
                artifact.column,
                field.column()
            ),
        });
    }

    CategoricalEncoder::from_artifact(artifact).map_err(|err| ArtifactLoadError::Invalid {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactLoadError> {
    let raw = fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ArtifactLoadError::Missing {
            path: path.to_path_buf(),
        },
        _ => ArtifactLoadError::Unreadable {
            path: path.to_path_buf(),
            source,
        },
    })?;

    serde_json::from_slice(&raw).map_err(|source| ArtifactLoadError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}
