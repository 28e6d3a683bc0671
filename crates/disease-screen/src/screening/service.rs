use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{error, info};

use super::domain::{PredictionId, PredictionRecord, RawInput, ScreeningType, UserId};
use super::repository::{
    ArchiveError, ArchivedPrediction, NewPrediction, PredictionArchive, PredictionRepository,
    RepositoryError, StoredPrediction,
};
use super::scoring::{ScoringContext, ScoringError};
use super::validation::{self, ValidationResult};

/// Service composing validation, the fitted scorers, and both persistence collaborators.
pub struct ScreeningService<R, D> {
    scoring: Arc<ScoringContext>,
    repository: Arc<R>,
    archive: Arc<D>,
}

/// Result of a single screening submission.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreeningOutcome {
    /// Input failed validation; nothing was scored or stored.
    Rejected(ValidationResult),
    Scored(PredictionRecord),
}

/// Admin listing: every prediction plus the count inside a trailing window.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionOverview {
    pub window_hours: i64,
    pub total: usize,
    pub recent: usize,
    pub predictions: Vec<PredictionRecord>,
}

impl<R, D> ScreeningService<R, D>
where
    R: PredictionRepository + 'static,
    D: PredictionArchive + 'static,
{
    pub fn new(scoring: Arc<ScoringContext>, repository: Arc<R>, archive: Arc<D>) -> Self {
        Self {
            scoring,
            repository,
            archive,
        }
    }

    pub fn scoring(&self) -> &ScoringContext {
        &self.scoring
    }

    /// Validate, score, and persist one submission.
    pub fn screen(
        &self,
        screening_type: ScreeningType,
        input: &RawInput,
        user_id: Option<UserId>,
    ) -> Result<ScreeningOutcome, ScreeningServiceError> {
        let validation = validation::validate(screening_type, input);
        if !validation.is_valid() {
            return Ok(ScreeningOutcome::Rejected(validation));
        }

        let features = validation.into_cleaned();
        let result = self
            .scoring
            .score(screening_type, &features)
            .inspect_err(|err| error!(%screening_type, error = %err, "scoring failed"))?;

        let row = NewPrediction::from_parts(
            screening_type,
            &result,
            &features,
            user_id,
            Utc::now(),
        )?;
        let stored = self
            .repository
            .insert(row)
            .inspect_err(|err| error!(%screening_type, error = %err, "prediction insert failed"))?;
        let record = stored.to_record()?;

        let document = ArchivedPrediction::from_record(&record)?;
        self.archive
            .archive(document)
            .inspect_err(|err| error!(id = %record.id, error = %err, "prediction archive failed"))?;

        info!(
            id = %record.id,
            %screening_type,
            probability = record.result.probability,
            risk_level = %record.result.risk_level,
            "prediction stored"
        );

        Ok(ScreeningOutcome::Scored(record))
    }

    pub fn get(&self, id: PredictionId) -> Result<PredictionRecord, ScreeningServiceError> {
        let stored = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(stored.to_record()?)
    }

    /// A user's predictions, newest first.
    pub fn history(&self, user_id: UserId) -> Result<Vec<PredictionRecord>, ScreeningServiceError> {
        newest_first(self.repository.for_user(user_id)?)
    }

    pub fn overview(&self, window: Duration) -> Result<PredictionOverview, ScreeningServiceError> {
        self.overview_at(window, Utc::now())
    }

    pub(crate) fn overview_at(
        &self,
        window: Duration,
        now: DateTime<Utc>,
    ) -> Result<PredictionOverview, ScreeningServiceError> {
        let predictions = newest_first(self.repository.all()?)?;
        let recent = match now.checked_sub_signed(window) {
            Some(cutoff) => predictions
                .iter()
                .filter(|record| record.created_at >= cutoff)
                .count(),
            None => predictions.len(),
        };

        Ok(PredictionOverview {
            window_hours: window.num_hours(),
            total: predictions.len(),
            recent,
            predictions,
        })
    }
}

fn newest_first(
    stored: Vec<StoredPrediction>,
) -> Result<Vec<PredictionRecord>, ScreeningServiceError> {
    let mut records = stored
        .iter()
        .map(StoredPrediction::to_record)
        .collect::<Result<Vec<_>, _>>()?;
    records.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    Ok(records)
}

/// Error raised by the screening service.
#[derive(Debug, thiserror::Error)]
pub enum ScreeningServiceError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error("prediction could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}
