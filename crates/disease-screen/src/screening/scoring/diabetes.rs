use super::model::{LogisticRegression, StandardScaler};
use super::{finish, RiskScorer, ScoringError};
use crate::config::ModelConfig;
use crate::screening::domain::{
    CleanedFeatures, DiabetesFeatures, PredictionResult, ScreeningType,
};

/// Illustrative rows in `DiabetesFeatures::FEATURE_NAMES` order.
const TRAINING_ROWS: [[f64; 8]; 4] = [
    [6.0, 148.0, 72.0, 35.0, 0.0, 33.6, 0.627, 50.0],
    [1.0, 85.0, 66.0, 29.0, 0.0, 26.6, 0.351, 31.0],
    [8.0, 183.0, 64.0, 0.0, 0.0, 23.3, 0.672, 32.0],
    [1.0, 89.0, 66.0, 23.0, 94.0, 28.1, 0.167, 21.0],
];
const TRAINING_LABELS: [bool; 4] = [true, false, true, false];

/// Logistic regression over standardized diabetes features.
#[derive(Debug, Clone)]
pub struct DiabetesScorer {
    scaler: StandardScaler,
    model: LogisticRegression,
}

impl DiabetesScorer {
    pub fn fit(config: &ModelConfig) -> Result<Self, ScoringError> {
        let scaler = StandardScaler::fit(&TRAINING_ROWS)?;
        let scaled = TRAINING_ROWS
            .iter()
            .map(|row| scaler.transform(row))
            .collect::<Result<Vec<_>, _>>()?;
        let model = LogisticRegression::fit(
            &scaled,
            &TRAINING_LABELS,
            config.regularization,
            config.learning_rate,
            config.iterations,
        )?;
        Ok(Self { scaler, model })
    }

    pub fn probability(&self, features: &DiabetesFeatures) -> Result<f64, ScoringError> {
        let scaled = self.scaler.transform(&features.to_vec())?;
        self.model.predict_proba(&scaled)
    }
}

impl RiskScorer for DiabetesScorer {
    fn screening_type(&self) -> ScreeningType {
        ScreeningType::Diabetes
    }

    fn score(&self, features: &CleanedFeatures) -> Result<PredictionResult, ScoringError> {
        let probability = self.probability(&DiabetesFeatures::from_cleaned(features))?;
        finish(ScreeningType::Diabetes, probability > 0.5, probability)
    }
}
