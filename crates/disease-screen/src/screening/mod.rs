//! Clinical screening intake: form validation, risk scoring, and prediction storage.
//!
//! A submission flows through [`validation`] (raw strings into typed, range-checked
//! features), then [`scoring`] (features into a [`PredictionResult`]), and finally the
//! [`service`] hands the scored record to the repository and archive collaborators.

pub mod domain;
pub mod import;
pub mod info;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    CleanedFeatures, DiabetesFeatures, FieldValue, HeartFeatures, PneumoniaFeatures,
    PredictionId, PredictionRecord, PredictionResult, RawInput, RiskLevel, ScreeningType,
    UnknownScreeningType, UserId,
};
pub use import::{BatchImportError, BatchImporter};
pub use info::ConditionInfo;
pub use repository::{
    ArchiveError, ArchivedPrediction, NewPrediction, PredictionArchive, PredictionRepository,
    RepositoryError, StoredPrediction,
};
pub use router::screening_router;
pub use scoring::{RiskScorer, ScoringContext, ScoringError};
pub use service::{PredictionOverview, ScreeningOutcome, ScreeningService, ScreeningServiceError};
pub use validation::{schema_for, FieldSpec, FormValidator, ValidationResult, GENERAL_ERROR_KEY};
