use std::num::IntErrorKind;

use serde::Serialize;

use crate::screening::domain::FieldValue;

/// Primitive a raw form value is coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Integer,
    Float,
}

/// Acceptance rule applied after (or, for choices, instead of) coercion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Constraint {
    /// Inclusive numeric bounds.
    Range { min: f64, max: f64 },
    /// Coerced integer must be one of the listed codes.
    OneOf { values: &'static [i64] },
    /// Raw string must match one option exactly before it is coerced.
    Choice { options: &'static [&'static str] },
}

/// Static declaration of a single form field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub constraint: Constraint,
    /// Reported when the raw value cannot be coerced.
    pub invalid_message: &'static str,
    /// Reported when the coerced value violates the constraint.
    pub constraint_message: &'static str,
}

impl FieldSpec {
    pub const fn range(
        name: &'static str,
        label: &'static str,
        kind: FieldKind,
        min: f64,
        max: f64,
        invalid_message: &'static str,
        constraint_message: &'static str,
    ) -> Self {
        Self {
            name,
            label,
            kind,
            constraint: Constraint::Range { min, max },
            invalid_message,
            constraint_message,
        }
    }

    pub const fn one_of(
        name: &'static str,
        label: &'static str,
        values: &'static [i64],
        invalid_message: &'static str,
        constraint_message: &'static str,
    ) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Integer,
            constraint: Constraint::OneOf { values },
            invalid_message,
            constraint_message,
        }
    }

    pub const fn choice(
        name: &'static str,
        label: &'static str,
        options: &'static [&'static str],
        message: &'static str,
    ) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Integer,
            constraint: Constraint::Choice { options },
            invalid_message: message,
            constraint_message: message,
        }
    }

    /// Coerce and check one raw value.
    ///
    /// The outer `Err` is reserved for declarations that cannot be applied at all; a
    /// bad user value is always an `Ok(FieldCheck::Rejected(..))`.
    pub(crate) fn check(&self, raw: &str) -> Result<FieldCheck, SchemaError> {
        match self.constraint {
            Constraint::Choice { options } => {
                if self.kind != FieldKind::Integer {
                    return Err(SchemaError::CategoricalFloat { field: self.name });
                }
                if !options.contains(&raw) {
                    return Ok(FieldCheck::Rejected(self.invalid_message));
                }
                let value = parse_integer(raw).map_err(|_| SchemaError::UnparsableOption {
                    field: self.name,
                    option: raw.to_string(),
                })?;
                Ok(FieldCheck::Accepted(FieldValue::Integer(value)))
            }
            Constraint::OneOf { values } => {
                if self.kind != FieldKind::Integer {
                    return Err(SchemaError::CategoricalFloat { field: self.name });
                }
                match parse_integer(raw) {
                    Err(Coercion::NotNumeric) => Ok(FieldCheck::Rejected(self.invalid_message)),
                    Ok(value) if values.contains(&value) => {
                        Ok(FieldCheck::Accepted(FieldValue::Integer(value)))
                    }
                    Ok(_) | Err(Coercion::OutOfRange) => {
                        Ok(FieldCheck::Rejected(self.constraint_message))
                    }
                }
            }
            Constraint::Range { min, max } => {
                if !(min.is_finite() && max.is_finite()) || min > max {
                    return Err(SchemaError::InvalidRange {
                        field: self.name,
                        min,
                        max,
                    });
                }
                let coerced = match self.kind {
                    FieldKind::Integer => parse_integer(raw).map(FieldValue::Integer),
                    FieldKind::Float => parse_float(raw).map(FieldValue::Float),
                };
                match coerced {
                    Err(Coercion::NotNumeric) => Ok(FieldCheck::Rejected(self.invalid_message)),
                    Ok(value) if (min..=max).contains(&value.as_f64()) => {
                        Ok(FieldCheck::Accepted(value))
                    }
                    Ok(_) | Err(Coercion::OutOfRange) => {
                        Ok(FieldCheck::Rejected(self.constraint_message))
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FieldCheck {
    Accepted(FieldValue),
    Rejected(&'static str),
}

/// A field declaration that cannot be evaluated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("field '{field}' declares an unusable range [{min}, {max}]")]
    InvalidRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("field '{field}' declares a categorical constraint on a float value")]
    CategoricalFloat { field: &'static str },
    #[error("field '{field}' lists option '{option}' which is not an integer")]
    UnparsableOption { field: &'static str, option: String },
}

/// Why a raw value did not produce a usable number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Coercion {
    NotNumeric,
    /// Numeric text whose magnitude no `i64`/`f64` can hold.
    OutOfRange,
}

fn parse_integer(raw: &str) -> Result<i64, Coercion> {
    raw.trim().parse::<i64>().map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Coercion::OutOfRange,
        _ => Coercion::NotNumeric,
    })
}

fn parse_float(raw: &str) -> Result<f64, Coercion> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_nan() => Err(Coercion::NotNumeric),
        Ok(value) if value.is_infinite() => Err(Coercion::OutOfRange),
        Ok(value) => Ok(value),
        Err(_) => Err(Coercion::NotNumeric),
    }
}

const BINARY: &[&str] = &["0", "1"];

pub const HEART_SCHEMA: [FieldSpec; 13] = [
    FieldSpec::range(
        "age",
        "Age",
        FieldKind::Integer,
        0.0,
        120.0,
        "Age must be a number",
        "Age must be between 0 and 120",
    ),
    FieldSpec::choice("sex", "Sex", BINARY, "Sex must be selected"),
    FieldSpec::one_of(
        "cp",
        "Chest pain type",
        &[0, 1, 2, 3],
        "Chest pain type must be selected",
        "Invalid chest pain type",
    ),
    FieldSpec::range(
        "trestbps",
        "Resting blood pressure",
        FieldKind::Integer,
        50.0,
        250.0,
        "Blood pressure must be a number",
        "Blood pressure must be between 50 and 250",
    ),
    FieldSpec::range(
        "chol",
        "Serum cholesterol",
        FieldKind::Integer,
        100.0,
        600.0,
        "Cholesterol must be a number",
        "Cholesterol must be between 100 and 600",
    ),
    FieldSpec::choice(
        "fbs",
        "Fasting blood sugar",
        BINARY,
        "Fasting blood sugar must be selected",
    ),
    FieldSpec::one_of(
        "restecg",
        "Resting ECG",
        &[0, 1, 2],
        "Resting ECG must be selected",
        "Invalid resting ECG value",
    ),
    FieldSpec::range(
        "thalach",
        "Maximum heart rate",
        FieldKind::Integer,
        60.0,
        220.0,
        "Maximum heart rate must be a number",
        "Maximum heart rate must be between 60 and 220",
    ),
    FieldSpec::choice(
        "exang",
        "Exercise induced angina",
        BINARY,
        "Exercise induced angina must be selected",
    ),
    FieldSpec::range(
        "oldpeak",
        "ST depression",
        FieldKind::Float,
        0.0,
        10.0,
        "ST depression must be a number",
        "ST depression must be between 0 and 10",
    ),
    FieldSpec::one_of(
        "slope",
        "Slope of peak exercise ST segment",
        &[0, 1, 2],
        "Slope must be selected",
        "Invalid slope value",
    ),
    FieldSpec::one_of(
        "ca",
        "Number of major vessels",
        &[0, 1, 2, 3, 4],
        "Number of major vessels must be selected",
        "Invalid number of major vessels",
    ),
    FieldSpec::one_of(
        "thal",
        "Thalassemia",
        &[0, 1, 2, 3],
        "Thalassemia must be selected",
        "Invalid thalassemia value",
    ),
];

pub const DIABETES_SCHEMA: [FieldSpec; 8] = [
    FieldSpec::range(
        "pregnancies",
        "Pregnancies",
        FieldKind::Integer,
        0.0,
        20.0,
        "Pregnancies must be a number",
        "Pregnancies must be between 0 and 20",
    ),
    FieldSpec::range(
        "glucose",
        "Glucose",
        FieldKind::Integer,
        0.0,
        300.0,
        "Glucose must be a number",
        "Glucose must be between 0 and 300",
    ),
    FieldSpec::range(
        "blood_pressure",
        "Blood pressure",
        FieldKind::Integer,
        0.0,
        200.0,
        "Blood pressure must be a number",
        "Blood pressure must be between 0 and 200",
    ),
    FieldSpec::range(
        "skin_thickness",
        "Skin thickness",
        FieldKind::Integer,
        0.0,
        100.0,
        "Skin thickness must be a number",
        "Skin thickness must be between 0 and 100",
    ),
    FieldSpec::range(
        "insulin",
        "Insulin",
        FieldKind::Integer,
        0.0,
        900.0,
        "Insulin must be a number",
        "Insulin must be between 0 and 900",
    ),
    FieldSpec::range(
        "bmi",
        "BMI",
        FieldKind::Float,
        0.0,
        70.0,
        "BMI must be a number",
        "BMI must be between 0 and 70",
    ),
    FieldSpec::range(
        "diabetes_pedigree",
        "Diabetes pedigree function",
        FieldKind::Float,
        0.0,
        3.0,
        "Diabetes pedigree must be a number",
        "Diabetes pedigree must be between 0 and 3",
    ),
    FieldSpec::range(
        "age",
        "Age",
        FieldKind::Integer,
        0.0,
        120.0,
        "Age must be a number",
        "Age must be between 0 and 120",
    ),
];

pub const PNEUMONIA_SCHEMA: [FieldSpec; 4] = [
    FieldSpec::range(
        "temperature",
        "Temperature (°F)",
        FieldKind::Float,
        95.0,
        108.0,
        "Temperature must be a number",
        "Temperature must be between 95 and 108°F",
    ),
    FieldSpec::range(
        "cough_severity",
        "Cough severity",
        FieldKind::Integer,
        0.0,
        10.0,
        "Cough severity must be a number",
        "Cough severity must be between 0 and 10",
    ),
    FieldSpec::range(
        "breathing_difficulty",
        "Breathing difficulty",
        FieldKind::Integer,
        0.0,
        10.0,
        "Breathing difficulty must be a number",
        "Breathing difficulty must be between 0 and 10",
    ),
    FieldSpec::range(
        "oxygen_level",
        "Oxygen saturation",
        FieldKind::Integer,
        70.0,
        100.0,
        "Oxygen level must be a number",
        "Oxygen level must be between 70 and 100",
    ),
];
