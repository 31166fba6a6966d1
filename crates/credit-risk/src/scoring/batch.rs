use std::io::Read;
use std::path::Path;

use super::domain::Applicant;

#[derive(Debug)]
pub enum BatchError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for BatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchError::Io(err) => write!(f, "failed to read applicant file: {}", err),
            BatchError::Csv(err) => write!(f, "invalid applicant CSV data: {}", err),
        }
    }
}

impl std::error::Error for BatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BatchError::Io(err) => Some(err),
            BatchError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for BatchError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for BatchError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub fn read_applicants_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Applicant>, BatchError> {
    let file = std::fs::File::open(path)?;
    read_applicants(file)
}

/// Parse applicants from a CSV using the training column headers.
///
/// Unrelated columns (row index, the `Risk` label) are ignored. Empty categorical cells
/// come through as empty labels so the encoders reject that row alone.
pub fn read_applicants<R: Read>(reader: R) -> Result<Vec<Applicant>, BatchError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut applicants = Vec::new();
    for record in csv_reader.deserialize::<Applicant>() {
        applicants.push(record?);
    }

    Ok(applicants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const EXPORT: &str = "\
,Age,Sex,Job,Housing,Saving accounts,Checking account,Credit amount,Duration,Purpose,Risk
0,67,male,2,own,,little,1169,6,radio/TV,good
1,22,female,2,own,little,moderate,5951,48,radio/TV,bad
";

    #[test]
    fn reads_training_export_columns() {
        let applicants = read_applicants(Cursor::new(EXPORT)).expect("csv parses");
        assert_eq!(applicants.len(), 2);

        assert_eq!(applicants[0].age, 67);
        assert_eq!(applicants[0].saving_accounts, "");
        assert_eq!(applicants[0].credit_amount, 1169);

        assert_eq!(applicants[1].sex, "female");
        assert_eq!(applicants[1].checking_account, "moderate");
        assert_eq!(applicants[1].duration_months, 48);
    }

    #[test]
    fn non_numeric_age_is_a_csv_error() {
        let data = "Age,Sex,Job,Housing,Saving accounts,Checking account,Credit amount,Duration\n\
                    thirty,male,1,own,little,little,1000,12\n";
        let err = read_applicants(Cursor::new(data)).expect_err("should fail");
        assert!(matches!(err, BatchError::Csv(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_applicants_from_path("/nonexistent/applicants.csv").expect_err("should fail");
        assert!(matches!(err, BatchError::Io(_)));
    }
}
