use super::model::{RandomForest, StandardScaler};
use super::{finish, RiskScorer, ScoringError};
use crate::config::ModelConfig;
use crate::screening::domain::{CleanedFeatures, HeartFeatures, PredictionResult, ScreeningType};

/// Illustrative rows in `HeartFeatures::FEATURE_NAMES` order.
const TRAINING_ROWS: [[f64; 13]; 4] = [
    [63.0, 1.0, 3.0, 145.0, 233.0, 1.0, 0.0, 150.0, 0.0, 2.3, 0.0, 0.0, 1.0],
    [37.0, 1.0, 2.0, 130.0, 250.0, 0.0, 1.0, 187.0, 0.0, 3.5, 0.0, 0.0, 2.0],
    [41.0, 0.0, 1.0, 130.0, 204.0, 0.0, 0.0, 172.0, 0.0, 1.4, 2.0, 0.0, 2.0],
    [56.0, 1.0, 1.0, 120.0, 236.0, 0.0, 1.0, 178.0, 0.0, 0.8, 2.0, 0.0, 2.0],
];
const TRAINING_LABELS: [bool; 4] = [true, true, false, false];

/// Random forest over standardized heart features.
#[derive(Debug, Clone)]
pub struct HeartScorer {
    scaler: StandardScaler,
    forest: RandomForest,
}

impl HeartScorer {
    pub fn fit(config: &ModelConfig) -> Result<Self, ScoringError> {
        let scaler = StandardScaler::fit(&TRAINING_ROWS)?;
        let scaled = TRAINING_ROWS
            .iter()
            .map(|row| scaler.transform(row))
            .collect::<Result<Vec<_>, _>>()?;
        let forest = RandomForest::fit(&scaled, &TRAINING_LABELS, config.forest_trees, config.seed)?;
        Ok(Self { scaler, forest })
    }

    pub fn probability(&self, features: &HeartFeatures) -> Result<f64, ScoringError> {
        let scaled = self.scaler.transform(&features.to_vec())?;
        self.forest.predict_proba(&scaled)
    }
}

impl RiskScorer for HeartScorer {
    fn screening_type(&self) -> ScreeningType {
        ScreeningType::Heart
    }

    fn score(&self, features: &CleanedFeatures) -> Result<PredictionResult, ScoringError> {
        let probability = self.probability(&HeartFeatures::from_cleaned(features))?;
        finish(ScreeningType::Heart, probability > 0.5, probability)
    }
}

#[cfg(test)]
pub(crate) fn training_rows() -> Vec<HeartFeatures> {
    TRAINING_ROWS
        .iter()
        .map(|row| HeartFeatures {
            age: row[0],
            sex: row[1],
            cp: row[2],
            trestbps: row[3],
            chol: row[4],
            fbs: row[5],
            restecg: row[6],
            thalach: row[7],
            exang: row[8],
            oldpeak: row[9],
            slope: row[10],
            ca: row[11],
            thal: row[12],
        })
        .collect()
}
