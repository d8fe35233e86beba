//! StreamSchema - explicit per-stream field layout
//!
//! Every stream carries one schema shared by all of its records. The
//! timestamp is implicit and never listed as a field.

use serde::Serialize;
use std::collections::HashSet;

use crate::ContractError;

/// Name under which a record's timestamp is addressed.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// Kind of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Numeric scalar, interpolated and merged
    Numeric,
    /// String payload (event messages), carried but never interpolated
    Text,
}

/// Fixed field set of one stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamSchema {
    numeric: Vec<String>,
    text: Vec<String>,
}

impl StreamSchema {
    /// Create a schema from numeric and text field names
    ///
    /// # Errors
    /// - A field name appears twice (across both lists)
    /// - A field is named `timestamp`
    /// - A field name is empty
    pub fn new(numeric: Vec<String>, text: Vec<String>) -> Result<Self, ContractError> {
        let mut seen = HashSet::new();
        for field in numeric.iter().chain(text.iter()) {
            if field.is_empty() {
                return Err(ContractError::Other(
                    "schema field name cannot be empty".to_string(),
                ));
            }
            if field == TIMESTAMP_FIELD || !seen.insert(field.as_str()) {
                return Err(ContractError::DuplicateField {
                    field: field.clone(),
                });
            }
        }
        Ok(Self { numeric, text })
    }

    /// Schema with numeric fields only
    pub fn numeric<I, S>(fields: I) -> Result<Self, ContractError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(fields.into_iter().map(Into::into).collect(), Vec::new())
    }

    /// Schema without any field (empty streams)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn numeric_fields(&self) -> &[String] {
        &self.numeric
    }

    pub fn text_fields(&self) -> &[String] {
        &self.text
    }

    /// Position of a numeric field in record value order
    #[inline]
    pub fn numeric_index(&self, field: &str) -> Option<usize> {
        self.numeric.iter().position(|f| f == field)
    }

    /// Position of a text field in record text order
    #[inline]
    pub fn text_index(&self, field: &str) -> Option<usize> {
        self.text.iter().position(|f| f == field)
    }

    /// Kind of a field, if declared
    pub fn kind_of(&self, field: &str) -> Option<FieldKind> {
        if self.numeric_index(field).is_some() {
            Some(FieldKind::Numeric)
        } else if self.text_index(field).is_some() {
            Some(FieldKind::Text)
        } else {
            None
        }
    }

    /// Total number of declared fields (timestamp excluded)
    pub fn field_count(&self) -> usize {
        self.numeric.len() + self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }
}
