use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of model inputs.
pub const FEATURE_COUNT: usize = 8;

/// Column names in the order the classifier was trained on.
pub const FEATURE_ORDER: [&str; FEATURE_COUNT] = [
    "Age",
    "Sex",
    "Job",
    "Housing",
    "Saving accounts",
    "Checking account",
    "Credit amount",
    "Duration",
];

/// Categorical applicant fields, each backed by its own encoder artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CategoricalField {
    Sex,
    Housing,
    SavingAccounts,
    CheckingAccount,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 4] = [
        CategoricalField::Sex,
        CategoricalField::Housing,
        CategoricalField::SavingAccounts,
        CategoricalField::CheckingAccount,
    ];

    /// Training column name, also used to name the encoder artifact.
    pub const fn column(self) -> &'static str {
        match self {
            CategoricalField::Sex => "Sex",
            CategoricalField::Housing => "Housing",
            CategoricalField::SavingAccounts => "Saving accounts",
            CategoricalField::CheckingAccount => "Checking account",
        }
    }

    /// Position of the field inside a [`FeatureVector`].
    pub const fn feature_index(self) -> usize {
        match self {
            CategoricalField::Sex => 1,
            CategoricalField::Housing => 3,
            CategoricalField::SavingAccounts => 4,
            CategoricalField::CheckingAccount => 5,
        }
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Attributes describing one loan request.
///
/// Categorical values are kept as the raw labels the form submitted; the encoders decide
/// whether a label is inside the trained domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    #[serde(rename = "Age")]
    pub age: u8,
    #[serde(rename = "Sex")]
    pub sex: String,
    #[serde(rename = "Job")]
    pub job: u8,
    #[serde(rename = "Housing")]
    pub housing: String,
    #[serde(rename = "Saving accounts")]
    pub saving_accounts: String,
    #[serde(rename = "Checking account")]
    pub checking_account: String,
    #[serde(rename = "Credit amount")]
    pub credit_amount: u32,
    #[serde(rename = "Duration")]
    pub duration_months: u32,
}

impl Applicant {
    pub fn label(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::Sex => &self.sex,
            CategoricalField::Housing => &self.housing,
            CategoricalField::SavingAccounts => &self.saving_accounts,
            CategoricalField::CheckingAccount => &self.checking_account,
        }
    }
}

/// Encoded model input in [`FEATURE_ORDER`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn values(&self) -> [f64; FEATURE_COUNT] {
        self.0
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        FEATURE_ORDER
            .iter()
            .position(|name| *name == column)
            .map(|index| self.0[index])
    }
}

/// Creditworthiness verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Good,
    Bad,
}

impl Verdict {
    pub const fn label(self) -> &'static str {
        match self {
            Verdict::Good => "GOOD",
            Verdict::Bad => "BAD",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one scoring call. Derived per request, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub probability: f64,
    pub threshold: f64,
    pub verdict: Verdict,
}
