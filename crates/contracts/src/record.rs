//! Record - one timestamped telemetry sample
//!
//! Values are stored positionally against the owning stream's schema.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::sync::Arc;

use crate::{ContractError, StreamSchema, TIMESTAMP_FIELD};

/// Telemetry record
///
/// `numeric[i]` belongs to `schema.numeric_fields()[i]`, `text[i]` to
/// `schema.text_fields()[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: Arc<StreamSchema>,

    /// Seconds, monotonically non-decreasing within a stream
    timestamp: f64,

    numeric: Box<[f64]>,

    text: Box<[Arc<str>]>,
}

impl Record {
    /// Create a record laid out against `schema`
    ///
    /// # Errors
    /// - Value counts do not match the schema field counts
    pub fn new(
        schema: Arc<StreamSchema>,
        timestamp: f64,
        numeric: Vec<f64>,
        text: Vec<Arc<str>>,
    ) -> Result<Self, ContractError> {
        if numeric.len() != schema.numeric_fields().len() {
            return Err(ContractError::Other(format!(
                "record expects {} numeric values, got {}",
                schema.numeric_fields().len(),
                numeric.len()
            )));
        }
        if text.len() != schema.text_fields().len() {
            return Err(ContractError::Other(format!(
                "record expects {} text values, got {}",
                schema.text_fields().len(),
                text.len()
            )));
        }
        Ok(Self {
            schema,
            timestamp,
            numeric: numeric.into_boxed_slice(),
            text: text.into_boxed_slice(),
        })
    }

    #[inline]
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    #[inline]
    pub fn schema(&self) -> &Arc<StreamSchema> {
        &self.schema
    }

    /// Numeric field by name; `"timestamp"` resolves to the timestamp
    #[inline]
    pub fn get(&self, field: &str) -> Option<f64> {
        if field == TIMESTAMP_FIELD {
            return Some(self.timestamp);
        }
        self.schema
            .numeric_index(field)
            .map(|idx| self.numeric[idx])
    }

    /// Text field by name
    #[inline]
    pub fn text(&self, field: &str) -> Option<&str> {
        self.schema.text_index(field).map(|idx| &*self.text[idx])
    }

    /// Numeric values in schema order
    #[inline]
    pub fn numeric_values(&self) -> &[f64] {
        &self.numeric
    }

    /// `(field, value)` pairs for numeric fields in schema order
    pub fn numeric_fields(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.schema
            .numeric_fields()
            .iter()
            .map(String::as_str)
            .zip(self.numeric.iter().copied())
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1 + self.schema.field_count()))?;
        map.serialize_entry(TIMESTAMP_FIELD, &self.timestamp)?;
        for (field, value) in self.numeric_fields() {
            map.serialize_entry(field, &value)?;
        }
        for (field, value) in self.schema.text_fields().iter().zip(self.text.iter()) {
            map.serialize_entry(field, &**value)?;
        }
        map.end()
    }
}
