use crate::cli::ArtifactArgs;
use crate::infra::load_service;
use clap::builder::PossibleValuesParser;
use clap::Args;
use credit_risk::config::AppConfig;
use credit_risk::error::AppError;
use credit_risk::scoring::form::{
    self, CHECKING_ACCOUNT_CHOICES, HOUSING_CHOICES, SAVING_ACCOUNTS_CHOICES, SEX_CHOICES,
};
use credit_risk::scoring::report::format_percent;
use credit_risk::scoring::{
    read_applicants_from_path, Applicant, CreditScoringService, ScoringReport, ScoringResult,
    Verdict,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Applicant age in years (18-80)
    #[arg(long, default_value_t = 30)]
    pub(crate) age: u8,
    /// Applicant sex
    #[arg(long, default_value = "male", value_parser = PossibleValuesParser::new(SEX_CHOICES))]
    pub(crate) sex: String,
    /// Job skill level (0-3)
    #[arg(long, default_value_t = 1)]
    pub(crate) job: u8,
    /// Housing situation
    #[arg(long, default_value = "own", value_parser = PossibleValuesParser::new(HOUSING_CHOICES))]
    pub(crate) housing: String,
    /// Saving accounts balance band
    #[arg(
        long,
        default_value = "little",
        value_parser = PossibleValuesParser::new(SAVING_ACCOUNTS_CHOICES)
    )]
    pub(crate) saving_accounts: String,
    /// Checking account balance band
    #[arg(
        long,
        default_value = "little",
        value_parser = PossibleValuesParser::new(CHECKING_ACCOUNT_CHOICES)
    )]
    pub(crate) checking_account: String,
    /// Requested credit amount
    #[arg(long, default_value_t = 1000)]
    pub(crate) credit_amount: u32,
    /// Loan duration in months
    #[arg(long, default_value_t = 12)]
    pub(crate) duration: u32,
    /// Approval threshold on the GOOD probability (0.30-0.80 in 0.05 steps)
    #[arg(long)]
    pub(crate) threshold: Option<f64>,
    /// Print the report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
    #[command(flatten)]
    pub(crate) artifacts: ArtifactArgs,
}

impl ScoreArgs {
    pub(crate) fn applicant(&self) -> Applicant {
        Applicant {
            age: self.age,
            sex: self.sex.clone(),
            job: self.job,
            housing: self.housing.clone(),
            saving_accounts: self.saving_accounts.clone(),
            checking_account: self.checking_account.clone(),
            credit_amount: self.credit_amount,
            duration_months: self.duration,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV file using the training column headers
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Approval threshold on the GOOD probability (0.30-0.80 in 0.05 steps)
    #[arg(long)]
    pub(crate) threshold: Option<f64>,
    #[command(flatten)]
    pub(crate) artifacts: ArtifactArgs,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let threshold = args
        .threshold
        .unwrap_or(config.scoring.default_threshold);
    let applicant = args.applicant();
    form::validate(&applicant, threshold)?;

    let artifact_dir = args
        .artifacts
        .artifact_dir
        .clone()
        .unwrap_or(config.scoring.artifact_dir);
    let service = load_service(&artifact_dir)?;

    let result = service.score(&applicant, threshold)?;
    let report = ScoringReport::from_result(&result);

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Report payload unavailable: {err}"),
        }
    } else {
        render_report(&report);
    }

    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let BatchArgs {
        csv,
        threshold,
        artifacts,
    } = args;

    let config = AppConfig::load()?;
    let threshold = threshold.unwrap_or(config.scoring.default_threshold);
    form::ThresholdPolicy::slider()
        .check(threshold)
        .map_err(|violation| form::FormError {
            violations: vec![violation],
        })?;

    let artifact_dir = artifacts
        .artifact_dir
        .unwrap_or(config.scoring.artifact_dir);
    let service = load_service(&artifact_dir)?;
    let applicants = read_applicants_from_path(&csv)?;

    println!(
        "Scoring {} applicant(s) from {} at threshold {:.2}",
        applicants.len(),
        csv.display(),
        threshold
    );

    let mut good = 0;
    let mut bad = 0;
    let mut rejected = 0;
    for (row, outcome) in score_rows(&service, &applicants, threshold)
        .into_iter()
        .enumerate()
    {
        match outcome {
            Ok(result) => {
                match result.verdict {
                    Verdict::Good => good += 1,
                    Verdict::Bad => bad += 1,
                }
                println!(
                    "- row {}: {} ({})",
                    row + 1,
                    result.verdict,
                    format_percent(result.probability)
                );
            }
            Err(err) => {
                rejected += 1;
                println!("- row {}: rejected ({err})", row + 1);
            }
        }
    }

    println!("Summary: {good} GOOD | {bad} BAD | {rejected} rejected");
    Ok(())
}

/// Each row passes the form range rules before it is scored; a failing row is rejected alone.
fn score_rows(
    service: &CreditScoringService,
    applicants: &[Applicant],
    threshold: f64,
) -> Vec<Result<ScoringResult, AppError>> {
    applicants
        .iter()
        .map(|applicant| {
            form::validate_applicant(applicant)?;
            Ok(service.score(applicant, threshold)?)
        })
        .collect()
}

fn render_report(report: &ScoringReport) {
    println!("Credit Risk Prediction");
    println!("{}", report.banner);
    println!("{}", report.confidence);
    println!("\nDecision Explanation");
    for line in &report.explanation {
        println!("- {line}");
    }
}
