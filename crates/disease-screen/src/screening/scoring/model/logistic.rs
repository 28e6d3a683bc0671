use crate::screening::scoring::ScoringError;

/// L2-regularized logistic regression fitted by full-batch gradient descent.
///
/// Minimizes `0.5 * |w|^2 + C * sum(log_loss)`; the intercept is not penalized.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LogisticRegression {
    weights: Vec<f64>,
    intercept: f64,
}

impl LogisticRegression {
    pub fn fit<R: AsRef<[f64]>>(
        rows: &[R],
        labels: &[bool],
        regularization: f64,
        learning_rate: f64,
        iterations: usize,
    ) -> Result<Self, ScoringError> {
        let width = super::matrix_width(rows)?;
        super::check_labels(rows.len(), labels)?;
        if !(regularization.is_finite() && regularization > 0.0) {
            return Err(ScoringError::InvalidModel(format!(
                "regularization must be positive, got {regularization}"
            )));
        }
        if !(learning_rate.is_finite() && learning_rate > 0.0) || iterations == 0 {
            return Err(ScoringError::InvalidModel(
                "gradient descent needs a positive learning rate and iteration count".to_string(),
            ));
        }

        let mut weights = vec![0.0; width];
        let mut intercept = 0.0;

        for _ in 0..iterations {
            let mut grad_w = weights.clone();
            let mut grad_b = 0.0;

            for (row, &label) in rows.iter().zip(labels) {
                let row = row.as_ref();
                let target = if label { 1.0 } else { 0.0 };
                let diff = sigmoid(dot(&weights, row) + intercept) - target;
                for (grad, value) in grad_w.iter_mut().zip(row) {
                    *grad += regularization * diff * value;
                }
                grad_b += regularization * diff;
            }

            for (weight, grad) in weights.iter_mut().zip(&grad_w) {
                *weight -= learning_rate * grad;
            }
            intercept -= learning_rate * grad_b;
        }

        Ok(Self { weights, intercept })
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn predict_proba(&self, row: &[f64]) -> Result<f64, ScoringError> {
        if self.weights.is_empty() {
            return Err(ScoringError::NotFitted {
                model: "logistic regression",
            });
        }
        if row.len() != self.weights.len() {
            return Err(ScoringError::FeatureWidth {
                expected: self.weights.len(),
                found: row.len(),
            });
        }
        Ok(sigmoid(dot(&self.weights, row) + self.intercept))
    }
}

fn dot(weights: &[f64], row: &[f64]) -> f64 {
    weights.iter().zip(row).map(|(w, x)| w * x).sum()
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
