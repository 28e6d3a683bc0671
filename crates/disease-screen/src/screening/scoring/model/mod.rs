//! Minimal classifiers fitted on the bundled illustrative datasets.

mod forest;
mod logistic;
mod scaler;

pub use forest::RandomForest;
pub use logistic::LogisticRegression;
pub use scaler::StandardScaler;

use super::ScoringError;

/// Column count shared by every row, rejecting empty, ragged, or non-finite matrices.
fn matrix_width<R: AsRef<[f64]>>(rows: &[R]) -> Result<usize, ScoringError> {
    let first = rows
        .first()
        .ok_or_else(|| ScoringError::InvalidModel("training matrix is empty".to_string()))?;
    let width = first.as_ref().len();
    if width == 0 {
        return Err(ScoringError::InvalidModel(
            "training rows have no features".to_string(),
        ));
    }

    for (index, row) in rows.iter().enumerate() {
        let row = row.as_ref();
        if row.len() != width {
            return Err(ScoringError::InvalidModel(format!(
                "training row {index} has {} features, expected {width}",
                row.len()
            )));
        }
        if row.iter().any(|value| !value.is_finite()) {
            return Err(ScoringError::InvalidModel(format!(
                "training row {index} contains a non-finite value"
            )));
        }
    }

    Ok(width)
}

fn check_labels(rows: usize, labels: &[bool]) -> Result<(), ScoringError> {
    if rows != labels.len() {
        return Err(ScoringError::InvalidModel(format!(
            "{rows} training rows but {} labels",
            labels.len()
        )));
    }
    Ok(())
}
