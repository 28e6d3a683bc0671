use super::{finish, RiskScorer, ScoringError};
use crate::screening::domain::{
    CleanedFeatures, PneumoniaFeatures, PredictionResult, ScreeningType,
};

const FEVER_THRESHOLD: f64 = 100.4;
const HYPOXIA_THRESHOLD: f64 = 95.0;
const PROBABILITY_CEILING: f64 = 0.99;

/// Rule-based pneumonia score. Nothing is fitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct PneumoniaScorer;

impl PneumoniaScorer {
    pub fn risk_points(features: &PneumoniaFeatures) -> f64 {
        let mut risk = 0.0;
        if features.temperature > FEVER_THRESHOLD {
            risk += (features.temperature - FEVER_THRESHOLD) * 10.0;
        }
        risk += features.cough_severity * 10.0;
        risk += features.breathing_difficulty * 15.0;
        if features.oxygen_level < HYPOXIA_THRESHOLD {
            risk += (HYPOXIA_THRESHOLD - features.oxygen_level) * 20.0;
        }
        risk
    }

    pub fn probability(features: &PneumoniaFeatures) -> f64 {
        (Self::risk_points(features) / 100.0).min(PROBABILITY_CEILING)
    }
}

impl RiskScorer for PneumoniaScorer {
    fn screening_type(&self) -> ScreeningType {
        ScreeningType::Pneumonia
    }

    fn score(&self, features: &CleanedFeatures) -> Result<PredictionResult, ScoringError> {
        let probability = Self::probability(&PneumoniaFeatures::from_cleaned(features));
        finish(ScreeningType::Pneumonia, probability > 0.5, probability)
    }
}
