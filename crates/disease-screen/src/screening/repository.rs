use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::{
    CleanedFeatures, PredictionId, PredictionRecord, PredictionResult, ScreeningType, UserId,
};

/// Relational row handed to the repository. Result and input travel as JSON text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPrediction {
    pub user_id: Option<UserId>,
    pub prediction_type: ScreeningType,
    pub result: String,
    pub confidence: f64,
    pub input_data: String,
    pub created_at: DateTime<Utc>,
}

impl NewPrediction {
    pub fn from_parts(
        screening_type: ScreeningType,
        result: &PredictionResult,
        input: &CleanedFeatures,
        user_id: Option<UserId>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            user_id,
            prediction_type: screening_type,
            result: serde_json::to_string(result)?,
            confidence: result.probability,
            input_data: serde_json::to_string(input)?,
            created_at,
        })
    }
}

/// Row as stored, with the identifier assigned by the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPrediction {
    pub id: PredictionId,
    #[serde(flatten)]
    pub row: NewPrediction,
}

impl StoredPrediction {
    /// Decode the JSON columns back into a typed record.
    pub fn to_record(&self) -> Result<PredictionRecord, RepositoryError> {
        let result: PredictionResult = serde_json::from_str(&self.row.result)
            .map_err(|err| RepositoryError::Corrupt(format!("result of {}: {err}", self.id)))?;
        let input: CleanedFeatures = serde_json::from_str(&self.row.input_data)
            .map_err(|err| RepositoryError::Corrupt(format!("input of {}: {err}", self.id)))?;

        Ok(PredictionRecord {
            id: self.id,
            screening_type: self.row.prediction_type,
            result,
            confidence: self.row.confidence,
            input,
            user_id: self.row.user_id,
            created_at: self.row.created_at,
        })
    }
}

/// Document-store copy of a stored prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedPrediction {
    pub user_id: Option<UserId>,
    pub prediction_type: ScreeningType,
    pub result: Value,
    pub confidence: f64,
    pub parameters: Value,
    pub created_at: DateTime<Utc>,
}

impl ArchivedPrediction {
    pub fn from_record(record: &PredictionRecord) -> Result<Self, serde_json::Error> {
        Ok(Self {
            user_id: record.user_id,
            prediction_type: record.screening_type,
            result: serde_json::to_value(&record.result)?,
            confidence: record.confidence,
            parameters: serde_json::to_value(&record.input)?,
            created_at: record.created_at,
        })
    }
}

/// Durable relational store for predictions.
pub trait PredictionRepository: Send + Sync {
    fn insert(&self, prediction: NewPrediction) -> Result<StoredPrediction, RepositoryError>;
    fn fetch(&self, id: PredictionId) -> Result<Option<StoredPrediction>, RepositoryError>;
    fn for_user(&self, user_id: UserId) -> Result<Vec<StoredPrediction>, RepositoryError>;
    fn all(&self) -> Result<Vec<StoredPrediction>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("prediction not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("stored prediction is corrupt: {0}")]
    Corrupt(String),
}

/// Secondary document store receiving a duplicate of every stored prediction.
pub trait PredictionArchive: Send + Sync {
    fn archive(&self, document: ArchivedPrediction) -> Result<(), ArchiveError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("archive unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::screening::domain::FieldValue;
    use crate::screening::info::ConditionInfo;

    fn sample() -> (PredictionResult, CleanedFeatures) {
        let result = PredictionResult::new(
            true,
            0.82,
            ConditionInfo::for_type(ScreeningType::Diabetes),
        );
        let input = [
            ("glucose", FieldValue::Integer(160)),
            ("bmi", FieldValue::Float(31.5)),
        ]
        .into_iter()
        .collect();
        (result, input)
    }

    #[test]
    fn stored_row_decodes_into_record() {
        let (result, input) = sample();
        let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let row = NewPrediction::from_parts(
            ScreeningType::Diabetes,
            &result,
            &input,
            Some(UserId(7)),
            created_at,
        )
        .expect("serializes");
        assert_eq!(row.confidence, 0.82);
        assert!(row.input_data.contains("\"glucose\":160"));

        let stored = StoredPrediction {
            id: PredictionId(3),
            row,
        };
        let record = stored.to_record().expect("decodes");
        assert_eq!(record.result, result);
        assert_eq!(record.input, input);
        assert_eq!(record.user_id, Some(UserId(7)));
        assert_eq!(record.created_at, created_at);
    }

    #[test]
    fn corrupt_columns_are_reported() {
        let (result, input) = sample();
        let mut row = NewPrediction::from_parts(
            ScreeningType::Diabetes,
            &result,
            &input,
            None,
            Utc::now(),
        )
        .expect("serializes");
        row.result = "{not json".to_string();
        let stored = StoredPrediction {
            id: PredictionId(1),
            row,
        };
        assert!(matches!(stored.to_record(), Err(RepositoryError::Corrupt(_))));
    }

    #[test]
    fn archive_document_keeps_json_values() {
        let (result, input) = sample();
        let record = PredictionRecord {
            id: PredictionId(9),
            screening_type: ScreeningType::Diabetes,
            confidence: result.probability,
            result,
            input,
            user_id: None,
            created_at: Utc::now(),
        };
        let document = ArchivedPrediction::from_record(&record).expect("serializes");
        assert_eq!(document.parameters["bmi"], serde_json::json!(31.5));
        assert_eq!(document.result["risk_level"], serde_json::json!("High"));
        assert_eq!(document.result["info"]["name"], serde_json::json!("Diabetes"));
    }
}
