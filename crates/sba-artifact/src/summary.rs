//! Analyzer summary record

use crate::error::SummaryError;
use serde::Serialize;
use serde_json::{Map, Value};

const REQUIRED_FIELDS: [&str; 2] = ["thresholds", "counts"];

/// Structured summary written next to the matrix image
///
/// Only `thresholds` and `counts` are checked. Every other field the
/// analyzer writes (`top_products`, notes, ...) is kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SummaryArtifact {
    fields: Map<String, Value>,
}

impl SummaryArtifact {
    /// Validate a parsed summary
    ///
    /// # Errors
    /// - `SummaryError::NotObject` for any non-object value
    /// - `SummaryError::MissingField` for the first absent or null required field
    pub fn from_value(value: Value) -> Result<Self, SummaryError> {
        let Value::Object(fields) = value else {
            return Err(SummaryError::NotObject(kind_of(&value)));
        };
        if let Some(field) = REQUIRED_FIELDS
            .into_iter()
            .find(|field| fields.get(*field).map_or(true, Value::is_null))
        {
            return Err(SummaryError::MissingField(field));
        }
        Ok(Self { fields })
    }

    /// Parse and validate summary text
    ///
    /// # Errors
    /// `SummaryError::NotJson`, or any error from [`Self::from_value`]
    pub fn parse(text: &str) -> Result<Self, SummaryError> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Category thresholds used by the analyzer
    #[must_use]
    pub fn thresholds(&self) -> &Value {
        &self.fields["thresholds"]
    }

    /// Per-category item counts
    #[must_use]
    pub fn counts(&self) -> &Value {
        &self.fields["counts"]
    }

    /// Count for one category, when numeric
    #[must_use]
    pub fn count(&self, category: &str) -> Option<u64> {
        self.counts().get(category).and_then(Value::as_u64)
    }

    /// Any other field
    #[inline]
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Consume into a JSON value
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
