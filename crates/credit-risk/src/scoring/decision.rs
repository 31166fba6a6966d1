use super::domain::Verdict;

/// GOOD when the probability reaches the threshold; the boundary is inclusive.
pub fn classify(probability: f64, threshold: f64) -> Verdict {
    if probability >= threshold {
        Verdict::Good
    } else {
        Verdict::Bad
    }
}
