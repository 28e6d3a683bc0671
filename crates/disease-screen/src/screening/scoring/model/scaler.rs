use crate::screening::scoring::ScoringError;

/// Per-feature standardization fitted on a training matrix.
///
/// Uses the population standard deviation; constant columns keep a scale of one so
/// they are centred but not blown up.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn fit<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, ScoringError> {
        let width = super::matrix_width(rows)?;
        let n = rows.len() as f64;

        let mut mean = vec![0.0; width];
        for row in rows {
            for (acc, value) in mean.iter_mut().zip(row.as_ref()) {
                *acc += value;
            }
        }
        for value in &mut mean {
            *value /= n;
        }

        let mut scale = vec![0.0; width];
        for row in rows {
            for ((acc, value), centre) in scale.iter_mut().zip(row.as_ref()).zip(&mean) {
                let delta = value - centre;
                *acc += delta * delta;
            }
        }
        for value in &mut scale {
            let std = (*value / n).sqrt();
            *value = if std > 0.0 { std } else { 1.0 };
        }

        Ok(Self { mean, scale })
    }

    pub fn width(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ScoringError> {
        if self.mean.is_empty() {
            return Err(ScoringError::NotFitted {
                model: "feature scaler",
            });
        }
        if row.len() != self.width() {
            return Err(ScoringError::FeatureWidth {
                expected: self.width(),
                found: row.len(),
            });
        }

        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(value, (mean, scale))| (value - mean) / scale)
            .collect())
    }
}
