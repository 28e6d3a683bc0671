use std::sync::{Arc, Mutex, OnceLock};

use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::config::ModelConfig;
use crate::screening::domain::{PredictionId, RawInput, UserId};
use crate::screening::repository::{
    ArchiveError, ArchivedPrediction, NewPrediction, PredictionArchive, PredictionRepository,
    RepositoryError, StoredPrediction,
};
use crate::screening::{screening_router, ScoringContext, ScreeningService};

/// Fitted once per test binary; fitting is deterministic for a fixed seed.
pub(super) fn scoring() -> Arc<ScoringContext> {
    static CONTEXT: OnceLock<Arc<ScoringContext>> = OnceLock::new();
    CONTEXT
        .get_or_init(|| {
            Arc::new(ScoringContext::fit(&ModelConfig::default()).expect("models fit"))
        })
        .clone()
}

pub(super) fn heart_input() -> RawInput {
    [
        ("age", "63"),
        ("sex", "1"),
        ("cp", "3"),
        ("trestbps", "145"),
        ("chol", "233"),
        ("fbs", "1"),
        ("restecg", "0"),
        ("thalach", "150"),
        ("exang", "0"),
        ("oldpeak", "2.3"),
        ("slope", "0"),
        ("ca", "0"),
        ("thal", "1"),
    ]
    .into_iter()
    .collect()
}

pub(super) fn diabetes_input() -> RawInput {
    [
        ("pregnancies", "6"),
        ("glucose", "148"),
        ("blood_pressure", "72"),
        ("skin_thickness", "35"),
        ("insulin", "0"),
        ("bmi", "33.6"),
        ("diabetes_pedigree", "0.627"),
        ("age", "50"),
    ]
    .into_iter()
    .collect()
}

pub(super) fn pneumonia_input() -> RawInput {
    [
        ("temperature", "101.4"),
        ("cough_severity", "5"),
        ("breathing_difficulty", "4"),
        ("oxygen_level", "90"),
    ]
    .into_iter()
    .collect()
}

pub(super) fn build_service() -> (
    ScreeningService<MemoryRepository, MemoryArchive>,
    Arc<MemoryRepository>,
    Arc<MemoryArchive>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let archive = Arc::new(MemoryArchive::default());
    let service = ScreeningService::new(scoring(), repository.clone(), archive.clone());
    (service, repository, archive)
}

pub(super) fn router_with_service(
    service: ScreeningService<MemoryRepository, MemoryArchive>,
) -> axum::Router {
    screening_router(Arc::new(service))
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    rows: Mutex<Vec<StoredPrediction>>,
}

impl MemoryRepository {
    pub(super) fn rows(&self) -> Vec<StoredPrediction> {
        self.rows.lock().expect("repository mutex poisoned").clone()
    }

    /// Insert a row with a fixed timestamp, bypassing the service clock.
    pub(super) fn seed(&self, user_id: Option<UserId>, created_at: DateTime<Utc>) {
        let mut rows = self.rows.lock().expect("repository mutex poisoned");
        let id = PredictionId(rows.len() as u64 + 1);
        let row = NewPrediction {
            user_id,
            prediction_type: crate::screening::ScreeningType::Pneumonia,
            result: r#"{"prediction":false,"probability":0.1,"risk_level":"Low","info":{"name":"Pneumonia","description":"","symptoms":[],"prevention":[]}}"#.to_string(),
            confidence: 0.1,
            input_data: r#"{"temperature":98.6}"#.to_string(),
            created_at,
        };
        rows.push(StoredPrediction { id, row });
    }
}

impl PredictionRepository for MemoryRepository {
    fn insert(&self, prediction: NewPrediction) -> Result<StoredPrediction, RepositoryError> {
        let mut rows = self.rows.lock().expect("repository mutex poisoned");
        let stored = StoredPrediction {
            id: PredictionId(rows.len() as u64 + 1),
            row: prediction,
        };
        rows.push(stored.clone());
        Ok(stored)
    }

    fn fetch(&self, id: PredictionId) -> Result<Option<StoredPrediction>, RepositoryError> {
        let rows = self.rows.lock().expect("repository mutex poisoned");
        Ok(rows.iter().find(|row| row.id == id).cloned())
    }

    fn for_user(&self, user_id: UserId) -> Result<Vec<StoredPrediction>, RepositoryError> {
        let rows = self.rows.lock().expect("repository mutex poisoned");
        Ok(rows
            .iter()
            .filter(|row| row.row.user_id == Some(user_id))
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<StoredPrediction>, RepositoryError> {
        Ok(self.rows())
    }
}

#[derive(Default)]
pub(super) struct MemoryArchive {
    documents: Mutex<Vec<ArchivedPrediction>>,
}

impl MemoryArchive {
    pub(super) fn documents(&self) -> Vec<ArchivedPrediction> {
        self.documents
            .lock()
            .expect("archive mutex poisoned")
            .clone()
    }
}

impl PredictionArchive for MemoryArchive {
    fn archive(&self, document: ArchivedPrediction) -> Result<(), ArchiveError> {
        self.documents
            .lock()
            .expect("archive mutex poisoned")
            .push(document);
        Ok(())
    }
}

pub(super) struct UnavailableRepository;

impl PredictionRepository for UnavailableRepository {
    fn insert(&self, _prediction: NewPrediction) -> Result<StoredPrediction, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: PredictionId) -> Result<Option<StoredPrediction>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn for_user(&self, _user_id: UserId) -> Result<Vec<StoredPrediction>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<StoredPrediction>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct OfflineArchive;

impl PredictionArchive for OfflineArchive {
    fn archive(&self, _document: ArchivedPrediction) -> Result<(), ArchiveError> {
        Err(ArchiveError::Unavailable("document store offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
