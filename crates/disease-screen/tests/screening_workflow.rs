//! End-to-end screening scenarios exercised through the public service facade, the CSV
//! importer, and the HTTP router.

mod common {
    use std::sync::{Arc, Mutex};

    use disease_screen::config::ModelConfig;
    use disease_screen::screening::{
        ArchiveError, ArchivedPrediction, NewPrediction, PredictionArchive, PredictionId,
        PredictionRepository, RepositoryError, ScoringContext, ScreeningService,
        StoredPrediction, UserId,
    };

    #[derive(Default)]
    pub(super) struct Store {
        rows: Mutex<Vec<StoredPrediction>>,
        documents: Mutex<Vec<ArchivedPrediction>>,
    }

    impl Store {
        pub(super) fn document_count(&self) -> usize {
            self.documents.lock().expect("store mutex poisoned").len()
        }
    }

    impl PredictionRepository for Store {
        fn insert(&self, prediction: NewPrediction) -> Result<StoredPrediction, RepositoryError> {
            let mut rows = self.rows.lock().expect("store mutex poisoned");
            let stored = StoredPrediction {
                id: PredictionId(rows.len() as u64 + 1),
                row: prediction,
            };
            rows.push(stored.clone());
            Ok(stored)
        }

        fn fetch(&self, id: PredictionId) -> Result<Option<StoredPrediction>, RepositoryError> {
            let rows = self.rows.lock().expect("store mutex poisoned");
            Ok(rows.iter().find(|row| row.id == id).cloned())
        }

        fn for_user(&self, user_id: UserId) -> Result<Vec<StoredPrediction>, RepositoryError> {
            let rows = self.rows.lock().expect("store mutex poisoned");
            Ok(rows
                .iter()
                .filter(|row| row.row.user_id == Some(user_id))
                .cloned()
                .collect())
        }

        fn all(&self) -> Result<Vec<StoredPrediction>, RepositoryError> {
            Ok(self.rows.lock().expect("store mutex poisoned").clone())
        }
    }

    impl PredictionArchive for Store {
        fn archive(&self, document: ArchivedPrediction) -> Result<(), ArchiveError> {
            self.documents
                .lock()
                .expect("store mutex poisoned")
                .push(document);
            Ok(())
        }
    }

    pub(super) fn service() -> (ScreeningService<Store, Store>, Arc<Store>) {
        let store = Arc::new(Store::default());
        let scoring = Arc::new(ScoringContext::fit(&ModelConfig::default()).expect("models fit"));
        let service = ScreeningService::new(scoring, store.clone(), store.clone());
        (service, store)
    }
}

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::Duration;
use disease_screen::screening::{
    validation, BatchImporter, RawInput, RiskLevel, ScreeningOutcome, ScreeningType, UserId,
};
use serde_json::{json, Value};
use tower::ServiceExt;

#[test]
fn csv_batch_is_screened_row_by_row() {
    let (service, store) = common::service();
    let csv = "\
temperature,cough_severity,breathing_difficulty,oxygen_level
101.4,5,4,90
98.6,0,0,98
99.1,3,,120
";
    let rows = BatchImporter::from_reader(csv.as_bytes()).expect("csv parses");
    assert_eq!(rows.len(), 3);

    let outcomes: Vec<ScreeningOutcome> = rows
        .iter()
        .map(|row| {
            service
                .screen(ScreeningType::Pneumonia, row, Some(UserId(3)))
                .expect("screens")
        })
        .collect();

    match &outcomes[0] {
        ScreeningOutcome::Scored(record) => {
            assert_eq!(record.result.risk_level, RiskLevel::High);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    match &outcomes[1] {
        ScreeningOutcome::Scored(record) => {
            assert!(!record.result.prediction);
            assert_eq!(record.result.probability, 0.0);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    match &outcomes[2] {
        ScreeningOutcome::Rejected(result) => {
            assert_eq!(
                result.error("breathing_difficulty"),
                Some("Breathing difficulty must be a number")
            );
            assert_eq!(
                result.error("oxygen_level"),
                Some("Oxygen level must be between 70 and 100")
            );
        }
        other => panic!("unexpected outcome {other:?}"),
    }

    assert_eq!(store.document_count(), 2);
    let history = service.history(UserId(3)).expect("history");
    assert_eq!(history.len(), 2);
    assert_eq!(service.overview(Duration::hours(1)).expect("overview").recent, 2);
}

#[test]
fn validation_is_available_without_a_service() {
    let input: RawInput = [("glucose", "abc"), ("bmi", "22.5")].into_iter().collect();
    let result = validation::validate(ScreeningType::Diabetes, &input);

    assert!(!result.is_valid());
    assert_eq!(result.error("glucose"), Some("Glucose must be a number"));
    assert!(result.cleaned().contains("bmi"));
    assert_eq!(result.errors().len() + result.cleaned().len(), 8);
}

#[tokio::test]
async fn router_screens_and_serves_history() {
    let (service, _) = common::service();
    let router = disease_screen::screening::screening_router(Arc::new(service));

    let payload = json!({
        "user_id": 8,
        "fields": {
            "pregnancies": 1,
            "glucose": 85,
            "blood_pressure": 66,
            "skin_thickness": 29,
            "insulin": 0,
            "bmi": 26.6,
            "diabetes_pedigree": 0.351,
            "age": 31
        }
    });
    let response = router
        .clone()
        .oneshot(
            Request::post("/api/v1/screenings/diabetes")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = router
        .oneshot(
            Request::get("/api/v1/users/8/predictions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["count"], json!(1));
    assert_eq!(body["predictions"][0]["type"], json!("diabetes"));
    assert_eq!(body["predictions"][0]["result"]["prediction"], json!(false));
    assert_eq!(body["predictions"][0]["input"]["glucose"], json!(85));
}
