//! Risk scoring strategies and the fitted context that owns them.

mod diabetes;
mod heart;
pub mod model;
mod pneumonia;

pub use diabetes::DiabetesScorer;
pub use heart::HeartScorer;
pub use pneumonia::PneumoniaScorer;

use tracing::info;

use super::domain::{CleanedFeatures, PredictionResult, ScreeningType};
use super::info::ConditionInfo;
use crate::config::ModelConfig;

/// Maps cleaned features for one screening type to a scored result.
pub trait RiskScorer: Send + Sync {
    fn screening_type(&self) -> ScreeningType;

    /// Score `features`. Absent features fall back to per-strategy defaults.
    fn score(&self, features: &CleanedFeatures) -> Result<PredictionResult, ScoringError>;
}

/// Failures inside a scoring strategy. These indicate a startup or programming defect,
/// never bad user input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("{model} used before it was fitted")]
    NotFitted { model: &'static str },
    #[error("expected {expected} features, got {found}")]
    FeatureWidth { expected: usize, found: usize },
    #[error("invalid model configuration: {0}")]
    InvalidModel(String),
    #[error("{screening_type} scorer produced a non-finite probability")]
    NonFiniteProbability { screening_type: ScreeningType },
}

/// Immutable bundle of every scoring strategy, built once at startup.
#[derive(Debug, Clone)]
pub struct ScoringContext {
    heart: HeartScorer,
    diabetes: DiabetesScorer,
    pneumonia: PneumoniaScorer,
}

impl ScoringContext {
    pub fn fit(config: &ModelConfig) -> Result<Self, ScoringError> {
        let heart = HeartScorer::fit(config)?;
        let diabetes = DiabetesScorer::fit(config)?;

        info!(
            forest_trees = config.forest_trees,
            seed = config.seed,
            "screening classifiers fitted"
        );

        Ok(Self {
            heart,
            diabetes,
            pneumonia: PneumoniaScorer,
        })
    }

    pub fn scorer(&self, screening_type: ScreeningType) -> &dyn RiskScorer {
        match screening_type {
            ScreeningType::Heart => &self.heart,
            ScreeningType::Diabetes => &self.diabetes,
            ScreeningType::Pneumonia => &self.pneumonia,
        }
    }

    pub fn score(
        &self,
        screening_type: ScreeningType,
        features: &CleanedFeatures,
    ) -> Result<PredictionResult, ScoringError> {
        self.scorer(screening_type).score(features)
    }
}

fn finish(
    screening_type: ScreeningType,
    prediction: bool,
    probability: f64,
) -> Result<PredictionResult, ScoringError> {
    if !probability.is_finite() {
        return Err(ScoringError::NonFiniteProbability { screening_type });
    }

    Ok(PredictionResult::new(
        prediction,
        probability.clamp(0.0, 1.0),
        ConditionInfo::for_type(screening_type),
    ))
}
