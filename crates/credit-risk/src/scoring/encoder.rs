use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::domain::CategoricalField;

/// Label to integer code mapping fit during training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoricalEncoder {
    column: String,
    classes: Vec<String>,
    codes: HashMap<String, u32>,
}

/// On-disk shape of an encoder: the ordered class list, where a label's code is its index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderArtifact {
    pub column: String,
    pub classes: Vec<String>,
}

/// Why an encoder artifact could not become an encoder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncoderDefinitionError {
    #[error("encoder for '{column}' has no classes")]
    Empty { column: String },
    #[error("encoder for '{column}' lists '{label}' more than once")]
    DuplicateClass { column: String, label: String },
}

impl CategoricalEncoder {
    pub fn from_classes<I, S>(
        column: impl Into<String>,
        classes: I,
    ) -> Result<Self, EncoderDefinitionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let column = column.into();
        let classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        if classes.is_empty() {
            return Err(EncoderDefinitionError::Empty { column });
        }

        let mut codes = HashMap::with_capacity(classes.len());
        for (index, label) in classes.iter().enumerate() {
            if codes.insert(label.clone(), index as u32).is_some() {
                return Err(EncoderDefinitionError::DuplicateClass {
                    column,
                    label: label.clone(),
                });
            }
        }

        Ok(Self {
            column,
            classes,
            codes,
        })
    }

    pub fn from_artifact(artifact: EncoderArtifact) -> Result<Self, EncoderDefinitionError> {
        Self::from_classes(artifact.column, artifact.classes)
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn contains(&self, label: &str) -> bool {
        self.codes.contains_key(label)
    }

    /// Code for `label`, or `None` when the label was never seen during training.
    pub fn code(&self, label: &str) -> Option<u32> {
        self.codes.get(label).copied()
    }
}

/// The four encoders the classifier expects, keyed by field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderSet {
    encoders: BTreeMap<CategoricalField, CategoricalEncoder>,
}

impl EncoderSet {
    pub fn new(
        sex: CategoricalEncoder,
        housing: CategoricalEncoder,
        saving_accounts: CategoricalEncoder,
        checking_account: CategoricalEncoder,
    ) -> Self {
        let encoders = BTreeMap::from([
            (CategoricalField::Sex, sex),
            (CategoricalField::Housing, housing),
            (CategoricalField::SavingAccounts, saving_accounts),
            (CategoricalField::CheckingAccount, checking_account),
        ]);
        Self { encoders }
    }

    pub fn get(&self, field: CategoricalField) -> &CategoricalEncoder {
        // Every field is inserted by `new`.
        &self.encoders[&field]
    }

    pub fn iter(&self) -> impl Iterator<Item = (CategoricalField, &CategoricalEncoder)> {
        self.encoders.iter().map(|(field, encoder)| (*field, encoder))
    }
}
