//! Field-level validation of raw form input.
//!
//! Every declared field is checked, so a single submission reports all of its problems
//! at once. Fields that pass are coerced into [`CleanedFeatures`] even when sibling
//! fields fail.

mod schema;

pub use schema::{
    Constraint, FieldKind, FieldSpec, SchemaError, DIABETES_SCHEMA, HEART_SCHEMA,
    PNEUMONIA_SCHEMA,
};

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::domain::{CleanedFeatures, RawInput, ScreeningType};
use schema::FieldCheck;

/// Error map key used when the batch itself could not be validated.
pub const GENERAL_ERROR_KEY: &str = "general";

/// Static field declarations for a screening type, in classifier order.
pub fn schema_for(screening_type: ScreeningType) -> &'static [FieldSpec] {
    match screening_type {
        ScreeningType::Heart => &HEART_SCHEMA,
        ScreeningType::Diabetes => &DIABETES_SCHEMA,
        ScreeningType::Pneumonia => &PNEUMONIA_SCHEMA,
    }
}

/// Validate `input` against the schema for `screening_type`.
pub fn validate(screening_type: ScreeningType, input: &RawInput) -> ValidationResult {
    FormValidator::for_type(screening_type).validate(input)
}

/// Outcome of validating one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    is_valid: bool,
    errors: BTreeMap<String, String>,
    cleaned: CleanedFeatures,
}

impl ValidationResult {
    fn from_parts(errors: BTreeMap<String, String>, cleaned: CleanedFeatures) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            cleaned,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn cleaned(&self) -> &CleanedFeatures {
        &self.cleaned
    }

    pub fn into_cleaned(self) -> CleanedFeatures {
        self.cleaned
    }
}

/// Applies a field schema to raw input.
#[derive(Debug, Clone, Copy)]
pub struct FormValidator<'a> {
    schema: &'a [FieldSpec],
}

impl FormValidator<'static> {
    pub fn for_type(screening_type: ScreeningType) -> Self {
        Self::with_schema(schema_for(screening_type))
    }
}

impl<'a> FormValidator<'a> {
    pub fn with_schema(schema: &'a [FieldSpec]) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &'a [FieldSpec] {
        self.schema
    }

    pub fn validate(&self, input: &RawInput) -> ValidationResult {
        let mut errors = BTreeMap::new();
        let mut cleaned = CleanedFeatures::new();

        if let Err(err) = self.check_fields(input, &mut errors, &mut cleaned) {
            warn!(error = %err, "field schema could not be applied");
            errors.insert(
                GENERAL_ERROR_KEY.to_string(),
                format!("Validation error: {err}"),
            );
        }

        if !errors.is_empty() {
            debug!(
                rejected = errors.len(),
                accepted = cleaned.len(),
                "submission failed validation"
            );
        }

        ValidationResult::from_parts(errors, cleaned)
    }

    fn check_fields(
        &self,
        input: &RawInput,
        errors: &mut BTreeMap<String, String>,
        cleaned: &mut CleanedFeatures,
    ) -> Result<(), SchemaError> {
        for field in self.schema {
            let raw = input.get(field.name).unwrap_or("");
            match field.check(raw)? {
                FieldCheck::Accepted(value) => cleaned.insert(field.name, value),
                FieldCheck::Rejected(message) => {
                    errors.insert(field.name.to_string(), message.to_string());
                }
            }
        }
        Ok(())
    }
}
