use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::info::ConditionInfo;

/// Conditions supported by the screening intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningType {
    Heart,
    Diabetes,
    Pneumonia,
}

impl ScreeningType {
    pub const ALL: [ScreeningType; 3] = [Self::Heart, Self::Diabetes, Self::Pneumonia];

    /// Tag used on the wire and in persisted records.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Heart => "heart",
            Self::Diabetes => "diabetes",
            Self::Pneumonia => "pneumonia",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Heart => "Heart Disease",
            Self::Diabetes => "Diabetes",
            Self::Pneumonia => "Pneumonia",
        }
    }
}

impl fmt::Display for ScreeningType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ScreeningType {
    type Err = UnknownScreeningType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "heart" | "heart-disease" | "heart_disease" => Ok(Self::Heart),
            "diabetes" => Ok(Self::Diabetes),
            "pneumonia" => Ok(Self::Pneumonia),
            _ => Err(UnknownScreeningType(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown screening type '{0}' (expected heart, diabetes, or pneumonia)")]
pub struct UnknownScreeningType(pub String);

/// Identifier of the account that submitted a screening, when signed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier assigned by the prediction repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionId(pub u64);

impl fmt::Display for PredictionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Untrusted form fields exactly as submitted.
///
/// JSON clients may send numbers or booleans; they are kept in their string form so
/// the validator sees the same input a form post would produce.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RawInput(BTreeMap<String, String>);

impl RawInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.remove(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RawInput
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Flag(bool),
}

impl RawValue {
    fn into_text(self) -> String {
        match self {
            RawValue::Text(text) => text,
            RawValue::Integer(value) => value.to_string(),
            RawValue::Float(value) => value.to_string(),
            RawValue::Flag(true) => "1".to_string(),
            RawValue::Flag(false) => "0".to_string(),
        }
    }
}

impl<'de> Deserialize<'de> for RawInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = BTreeMap::<String, Option<RawValue>>::deserialize(deserializer)?;
        Ok(Self(
            fields
                .into_iter()
                .filter_map(|(key, value)| value.map(|value| (key, value.into_text())))
                .collect(),
        ))
    }
}

/// A coerced, range-checked field value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
}

impl FieldValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            FieldValue::Integer(value) => *value as f64,
            FieldValue::Float(value) => *value,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(value) => write!(f, "{value}"),
            FieldValue::Float(value) => write!(f, "{value}"),
        }
    }
}

/// Fields that passed validation, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CleanedFeatures(BTreeMap<String, FieldValue>);

impl CleanedFeatures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<FieldValue> {
        self.0.get(field).copied()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) {
        self.0.insert(field.into(), value);
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Numeric value of `field`, falling back to `default` when it is absent.
    pub fn value_or(&self, field: &str, default: f64) -> f64 {
        self.get(field).map(|value| value.as_f64()).unwrap_or(default)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, FieldValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, FieldValue)> for CleanedFeatures {
    fn from_iter<I: IntoIterator<Item = (K, FieldValue)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }
}

/// Heart disease features in classifier order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeartFeatures {
    pub age: f64,
    pub sex: f64,
    pub cp: f64,
    pub trestbps: f64,
    pub chol: f64,
    pub fbs: f64,
    pub restecg: f64,
    pub thalach: f64,
    pub exang: f64,
    pub oldpeak: f64,
    pub slope: f64,
    pub ca: f64,
    pub thal: f64,
}

impl HeartFeatures {
    pub const FEATURE_NAMES: [&'static str; 13] = [
        "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang", "oldpeak",
        "slope", "ca", "thal",
    ];

    /// Missing fields read as zero.
    pub fn from_cleaned(cleaned: &CleanedFeatures) -> Self {
        Self {
            age: cleaned.value_or("age", 0.0),
            sex: cleaned.value_or("sex", 0.0),
            cp: cleaned.value_or("cp", 0.0),
            trestbps: cleaned.value_or("trestbps", 0.0),
            chol: cleaned.value_or("chol", 0.0),
            fbs: cleaned.value_or("fbs", 0.0),
            restecg: cleaned.value_or("restecg", 0.0),
            thalach: cleaned.value_or("thalach", 0.0),
            exang: cleaned.value_or("exang", 0.0),
            oldpeak: cleaned.value_or("oldpeak", 0.0),
            slope: cleaned.value_or("slope", 0.0),
            ca: cleaned.value_or("ca", 0.0),
            thal: cleaned.value_or("thal", 0.0),
        }
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.age,
            self.sex,
            self.cp,
            self.trestbps,
            self.chol,
            self.fbs,
            self.restecg,
            self.thalach,
            self.exang,
            self.oldpeak,
            self.slope,
            self.ca,
            self.thal,
        ]
    }
}

/// Diabetes features in classifier order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DiabetesFeatures {
    pub pregnancies: f64,
    pub glucose: f64,
    pub blood_pressure: f64,
    pub skin_thickness: f64,
    pub insulin: f64,
    pub bmi: f64,
    pub diabetes_pedigree: f64,
    pub age: f64,
}

impl DiabetesFeatures {
    pub const FEATURE_NAMES: [&'static str; 8] = [
        "pregnancies",
        "glucose",
        "blood_pressure",
        "skin_thickness",
        "insulin",
        "bmi",
        "diabetes_pedigree",
        "age",
    ];

    /// Missing fields read as zero.
    pub fn from_cleaned(cleaned: &CleanedFeatures) -> Self {
        Self {
            pregnancies: cleaned.value_or("pregnancies", 0.0),
            glucose: cleaned.value_or("glucose", 0.0),
            blood_pressure: cleaned.value_or("blood_pressure", 0.0),
            skin_thickness: cleaned.value_or("skin_thickness", 0.0),
            insulin: cleaned.value_or("insulin", 0.0),
            bmi: cleaned.value_or("bmi", 0.0),
            diabetes_pedigree: cleaned.value_or("diabetes_pedigree", 0.0),
            age: cleaned.value_or("age", 0.0),
        }
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.pregnancies,
            self.glucose,
            self.blood_pressure,
            self.skin_thickness,
            self.insulin,
            self.bmi,
            self.diabetes_pedigree,
            self.age,
        ]
    }
}

/// Vital signs and symptom severities for the pneumonia screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PneumoniaFeatures {
    /// Body temperature in degrees Fahrenheit.
    pub temperature: f64,
    /// Self-reported severity, 0 to 10.
    pub cough_severity: f64,
    /// Self-reported severity, 0 to 10.
    pub breathing_difficulty: f64,
    /// Peripheral oxygen saturation in percent.
    pub oxygen_level: f64,
}

impl PneumoniaFeatures {
    pub const FEATURE_NAMES: [&'static str; 4] = [
        "temperature",
        "cough_severity",
        "breathing_difficulty",
        "oxygen_level",
    ];

    pub const NORMAL_TEMPERATURE: f64 = 98.6;
    pub const NORMAL_OXYGEN_LEVEL: f64 = 98.0;

    /// Missing vitals read as normal readings, missing severities as zero.
    pub fn from_cleaned(cleaned: &CleanedFeatures) -> Self {
        Self {
            temperature: cleaned.value_or("temperature", Self::NORMAL_TEMPERATURE),
            cough_severity: cleaned.value_or("cough_severity", 0.0),
            breathing_difficulty: cleaned.value_or("breathing_difficulty", 0.0),
            oxygen_level: cleaned.value_or("oxygen_level", Self::NORMAL_OXYGEN_LEVEL),
        }
    }
}

impl Default for PneumoniaFeatures {
    fn default() -> Self {
        Self {
            temperature: Self::NORMAL_TEMPERATURE,
            cough_severity: 0.0,
            breathing_difficulty: 0.0,
            oxygen_level: Self::NORMAL_OXYGEN_LEVEL,
        }
    }
}

/// Coarse risk bucket derived from a probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// High above 0.7, Moderate above 0.4, Low otherwise.
    pub fn from_probability(probability: f64) -> Self {
        if probability > 0.7 {
            Self::High
        } else if probability > 0.4 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Scored outcome of a screening, ready for display or storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: bool,
    pub probability: f64,
    pub risk_level: RiskLevel,
    pub info: ConditionInfo,
}

impl PredictionResult {
    pub fn new(prediction: bool, probability: f64, info: ConditionInfo) -> Self {
        Self {
            prediction,
            probability,
            risk_level: RiskLevel::from_probability(probability),
            info,
        }
    }
}

/// Stored envelope for one scored submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: PredictionId,
    #[serde(rename = "type")]
    pub screening_type: ScreeningType,
    pub result: PredictionResult,
    pub confidence: f64,
    pub input: CleanedFeatures,
    pub user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screening_type_parses_tags_and_aliases() {
        assert_eq!("heart".parse::<ScreeningType>(), Ok(ScreeningType::Heart));
        assert_eq!(
            "Heart-Disease".parse::<ScreeningType>(),
            Ok(ScreeningType::Heart)
        );
        assert_eq!(
            " pneumonia ".parse::<ScreeningType>(),
            Ok(ScreeningType::Pneumonia)
        );
        assert!("flu".parse::<ScreeningType>().is_err());
    }

    #[test]
    fn screening_type_serializes_as_tag() {
        let value = serde_json::to_value(ScreeningType::Diabetes).expect("serializes");
        assert_eq!(value, serde_json::json!("diabetes"));
    }

    #[test]
    fn risk_level_boundaries_are_exclusive() {
        assert_eq!(RiskLevel::from_probability(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.4), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.40001), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_probability(0.7), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_probability(0.70001), RiskLevel::High);
        assert_eq!(RiskLevel::from_probability(0.99), RiskLevel::High);
    }

    #[test]
    fn raw_input_accepts_numbers_and_strings() {
        let input: RawInput = serde_json::from_value(serde_json::json!({
            "age": 63,
            "oldpeak": 2.3,
            "sex": "1",
            "exang": false,
            "thal": null,
        }))
        .expect("deserializes");

        assert_eq!(input.get("age"), Some("63"));
        assert_eq!(input.get("oldpeak"), Some("2.3"));
        assert_eq!(input.get("sex"), Some("1"));
        assert_eq!(input.get("exang"), Some("0"));
        assert_eq!(input.get("thal"), None);
    }

    #[test]
    fn heart_features_follow_classifier_order_and_default_to_zero() {
        let cleaned: CleanedFeatures = [
            ("age", FieldValue::Integer(63)),
            ("oldpeak", FieldValue::Float(2.3)),
            ("thal", FieldValue::Integer(1)),
        ]
        .into_iter()
        .collect();

        let vector = HeartFeatures::from_cleaned(&cleaned).to_vec();
        assert_eq!(vector.len(), HeartFeatures::FEATURE_NAMES.len());
        assert_eq!(vector[0], 63.0);
        assert_eq!(vector[9], 2.3);
        assert_eq!(vector[12], 1.0);
        assert_eq!(vector[1], 0.0);
    }

    #[test]
    fn pneumonia_features_default_vitals_to_normal_readings() {
        let features = PneumoniaFeatures::from_cleaned(&CleanedFeatures::new());
        assert_eq!(features, PneumoniaFeatures::default());
        assert_eq!(features.temperature, 98.6);
        assert_eq!(features.oxygen_level, 98.0);
    }

    #[test]
    fn field_values_serialize_as_bare_numbers() {
        let cleaned: CleanedFeatures = [
            ("age", FieldValue::Integer(50)),
            ("bmi", FieldValue::Float(33.6)),
        ]
        .into_iter()
        .collect();

        let value = serde_json::to_value(&cleaned).expect("serializes");
        assert_eq!(value, serde_json::json!({ "age": 50, "bmi": 33.6 }));
    }
}
