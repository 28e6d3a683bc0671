use disease_screen::config::ModelConfig;
use disease_screen::error::AppError;
use disease_screen::screening::{
    ArchiveError, ArchivedPrediction, NewPrediction, PredictionArchive, PredictionId,
    PredictionRepository, RepositoryError, ScoringContext, ScreeningService, StoredPrediction,
    UserId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type InMemoryScreeningService =
    ScreeningService<InMemoryPredictionRepository, InMemoryPredictionArchive>;

/// Relational stand-in; identifiers are assigned in insertion order starting at 1.
#[derive(Default, Clone)]
pub(crate) struct InMemoryPredictionRepository {
    rows: Arc<Mutex<Vec<StoredPrediction>>>,
}

impl PredictionRepository for InMemoryPredictionRepository {
    fn insert(&self, prediction: NewPrediction) -> Result<StoredPrediction, RepositoryError> {
        let mut guard = self
            .rows
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))?;
        let stored = StoredPrediction {
            id: PredictionId(guard.len() as u64 + 1),
            row: prediction,
        };
        guard.push(stored.clone());
        Ok(stored)
    }

    fn fetch(&self, id: PredictionId) -> Result<Option<StoredPrediction>, RepositoryError> {
        let guard = self
            .rows
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))?;
        Ok(guard.iter().find(|stored| stored.id == id).cloned())
    }

    fn for_user(&self, user_id: UserId) -> Result<Vec<StoredPrediction>, RepositoryError> {
        let guard = self
            .rows
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))?;
        Ok(guard
            .iter()
            .filter(|stored| stored.row.user_id == Some(user_id))
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<StoredPrediction>, RepositoryError> {
        let guard = self
            .rows
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))?;
        Ok(guard.clone())
    }
}

/// Document-store stand-in.
#[derive(Default, Clone)]
pub(crate) struct InMemoryPredictionArchive {
    documents: Arc<Mutex<Vec<ArchivedPrediction>>>,
}

impl PredictionArchive for InMemoryPredictionArchive {
    fn archive(&self, document: ArchivedPrediction) -> Result<(), ArchiveError> {
        let mut guard = self
            .documents
            .lock()
            .map_err(|_| ArchiveError::Unavailable("archive mutex poisoned".to_string()))?;
        guard.push(document);
        Ok(())
    }
}

impl InMemoryPredictionArchive {
    pub(crate) fn len(&self) -> usize {
        self.documents.lock().map(|guard| guard.len()).unwrap_or(0)
    }
}

/// Fit the classifiers and wire them to fresh in-memory stores.
pub(crate) fn build_service(
    models: &ModelConfig,
) -> Result<(Arc<InMemoryScreeningService>, InMemoryPredictionArchive), AppError> {
    let scoring = Arc::new(ScoringContext::fit(models)?);
    let archive = InMemoryPredictionArchive::default();
    let service = ScreeningService::new(
        scoring,
        Arc::new(InMemoryPredictionRepository::default()),
        Arc::new(archive.clone()),
    );
    Ok((Arc::new(service), archive))
}

/// Parse a `field=value` command line argument.
pub(crate) fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected FIELD=VALUE, got '{raw}'")),
    }
}
