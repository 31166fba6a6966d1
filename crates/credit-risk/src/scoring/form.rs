//! Input policy of the scoring form.
//!
//! These ranges and choice lists describe what the form widgets offer. They are applied
//! by the HTTP and CLI front-ends before a request reaches the scoring core, which accepts
//! any threshold and leaves label checks to the encoders.

use serde::Serialize;

use super::domain::Applicant;

pub const SEX_CHOICES: [&str; 2] = ["male", "female"];
pub const HOUSING_CHOICES: [&str; 3] = ["own", "rent", "free"];
pub const SAVING_ACCOUNTS_CHOICES: [&str; 4] = ["little", "moderate", "quite rich", "rich"];
pub const CHECKING_ACCOUNT_CHOICES: [&str; 3] = ["little", "moderate", "rich"];

pub const AGE_RANGE: (u8, u8) = (18, 80);
pub const JOB_RANGE: (u8, u8) = (0, 3);
pub const MIN_DURATION_MONTHS: u32 = 1;

/// Threshold slider bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdPolicy {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl ThresholdPolicy {
    pub const fn slider() -> Self {
        Self {
            min: 0.30,
            max: 0.80,
            step: 0.05,
            default: 0.50,
        }
    }

    pub fn check(&self, threshold: f64) -> Result<f64, FieldViolation> {
        let tolerance = 1e-9;
        if !threshold.is_finite()
            || threshold < self.min - tolerance
            || threshold > self.max + tolerance
        {
            return Err(FieldViolation::new(
                "threshold",
                format!(
                    "must be between {:.2} and {:.2}, got {threshold}",
                    self.min, self.max
                ),
            ));
        }

        let steps = (threshold - self.min) / self.step;
        if (steps - steps.round()).abs() > 1e-6 {
            return Err(FieldViolation::new(
                "threshold",
                format!("must move in steps of {:.2}, got {threshold}", self.step),
            ));
        }

        Ok(threshold)
    }
}

/// One rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    fn new(field: &'static str, message: String) -> Self {
        Self { field, message }
    }
}

/// Every field the form refused, reported together.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid form input: {}", summarize(.violations))]
pub struct FormError {
    pub violations: Vec<FieldViolation>,
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|violation| format!("{} {}", violation.field, violation.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Apply the range rules and the threshold slider. Categorical labels are not checked here.
pub fn validate(applicant: &Applicant, threshold: f64) -> Result<(), FormError> {
    let mut violations = applicant_violations(applicant);

    if let Err(violation) = ThresholdPolicy::slider().check(threshold) {
        violations.push(violation);
    }

    into_result(violations)
}

/// Range rules alone, for rows that share one already-checked threshold.
pub fn validate_applicant(applicant: &Applicant) -> Result<(), FormError> {
    into_result(applicant_violations(applicant))
}

fn applicant_violations(applicant: &Applicant) -> Vec<FieldViolation> {
    let mut violations = Vec::new();

    if applicant.age < AGE_RANGE.0 || applicant.age > AGE_RANGE.1 {
        violations.push(FieldViolation::new(
            "Age",
            format!(
                "must be between {} and {}, got {}",
                AGE_RANGE.0, AGE_RANGE.1, applicant.age
            ),
        ));
    }

    if applicant.job > JOB_RANGE.1 {
        violations.push(FieldViolation::new(
            "Job",
            format!(
                "must be between {} and {}, got {}",
                JOB_RANGE.0, JOB_RANGE.1, applicant.job
            ),
        ));
    }

    if applicant.duration_months < MIN_DURATION_MONTHS {
        violations.push(FieldViolation::new(
            "Duration",
            format!("must be at least {MIN_DURATION_MONTHS} month"),
        ));
    }

    violations
}

fn into_result(violations: Vec<FieldViolation>) -> Result<(), FormError> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(FormError { violations })
    }
}

/// Widget description served to form clients.
#[derive(Debug, Clone, Serialize)]
pub struct FormSchema {
    pub age: NumericRange,
    pub sex: &'static [&'static str],
    pub job: NumericRange,
    pub housing: &'static [&'static str],
    pub saving_accounts: &'static [&'static str],
    pub checking_account: &'static [&'static str],
    pub credit_amount: NumericRange,
    pub duration_months: NumericRange,
    pub threshold: ThresholdPolicy,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct NumericRange {
    pub min: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
    pub default: u32,
}

impl FormSchema {
    pub fn standard() -> Self {
        Self {
            age: NumericRange {
                min: AGE_RANGE.0.into(),
                max: Some(AGE_RANGE.1.into()),
                default: 30,
            },
            sex: &SEX_CHOICES,
            job: NumericRange {
                min: JOB_RANGE.0.into(),
                max: Some(JOB_RANGE.1.into()),
                default: 1,
            },
            housing: &HOUSING_CHOICES,
            saving_accounts: &SAVING_ACCOUNTS_CHOICES,
            checking_account: &CHECKING_ACCOUNT_CHOICES,
            credit_amount: NumericRange {
                min: 0,
                max: None,
                default: 1000,
            },
            duration_months: NumericRange {
                min: MIN_DURATION_MONTHS,
                max: None,
                default: 12,
            },
            threshold: ThresholdPolicy::slider(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applicant() -> Applicant {
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

    #[test]
    fn default_form_values_pass() {
        assert_eq!(validate(&applicant(), 0.50), Ok(()));
    }

    #[test]
    fn every_slider_stop_is_accepted() {
        let policy = ThresholdPolicy::slider();
        for stop in 0..=10 {
            let threshold = 0.30 + f64::from(stop) * 0.05;
            assert!(policy.check(threshold).is_ok(), "{threshold} rejected");
        }
    }

    #[test]
    fn off_step_and_out_of_range_thresholds_are_rejected() {
        let policy = ThresholdPolicy::slider();
        assert!(policy.check(0.52).is_err());
        assert!(policy.check(0.25).is_err());
        assert!(policy.check(0.85).is_err());
        assert!(policy.check(f64::NAN).is_err());
    }

    #[test]
    fn collects_all_range_violations() {
        let mut applicant = applicant();
        applicant.age = 17;
        applicant.job = 4;
        applicant.duration_months = 0;

        let err = validate(&applicant, 0.9).expect_err("form should reject");
        let fields: Vec<&str> = err.violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["Age", "Job", "Duration", "threshold"]);
        assert!(err.to_string().contains("Age must be between 18 and 80"));
    }

    #[test]
    fn applicant_rules_ignore_the_threshold() {
        let mut applicant = applicant();
        assert_eq!(validate_applicant(&applicant), Ok(()));

        applicant.age = 5;
        applicant.duration_months = 0;
        let err = validate_applicant(&applicant).expect_err("ranges should reject");
        let fields: Vec<&str> = err.violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["Age", "Duration"]);
    }

    #[test]
    fn age_bounds_are_inclusive() {
        let mut applicant = applicant();
        applicant.age = 18;
        assert!(validate(&applicant, 0.5).is_ok());
        applicant.age = 80;
        assert!(validate(&applicant, 0.5).is_ok());
        applicant.age = 81;
        assert!(validate(&applicant, 0.5).is_err());
    }
}
