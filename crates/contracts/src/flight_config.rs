//! FlightSyncConfig - Config Loader output
//!
//! Anchor selection, ordering policy, interpolation grouping, normalization
//! rules and logging, shared across crates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{well_known, ContractError, StreamName, StreamSchema};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightSyncConfig {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Stream whose cadence drives the causal merge
    #[serde(default = "default_anchor_stream")]
    pub anchor_stream: StreamName,

    /// What to do with streams that are not sorted by timestamp
    #[serde(default)]
    pub ordering: OrderingPolicy,

    /// Interpolation group settings
    #[serde(default)]
    pub interpolation: InterpolationConfig,

    /// Normalization rules for untyped upstream records
    #[serde(default)]
    pub normalize: NormalizeConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for FlightSyncConfig {
    fn default() -> Self {
        Self {
            version: ConfigVersion::V1,
            anchor_stream: default_anchor_stream(),
            ordering: OrderingPolicy::default(),
            interpolation: InterpolationConfig::default(),
            normalize: NormalizeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_anchor_stream() -> StreamName {
    StreamName::new(well_known::IMU)
}

/// Policy for streams whose timestamps decrease somewhere
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingPolicy {
    /// Fail normalization at the first out-of-order record
    #[default]
    Reject,
    /// Stable-sort the stream by timestamp
    Sort,
}

/// Interpolation group configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpolationConfig {
    /// Streams with fewer records are not interpolated
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            min_samples: default_min_samples(),
        }
    }
}

fn default_min_samples() -> usize {
    2
}

/// Normalization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Time keys tried in order; the first present one wins
    #[serde(default = "default_time_keys")]
    pub time_keys: Vec<TimeKey>,

    /// Explicit schemas per stream; streams not listed get an inferred schema
    #[serde(default)]
    pub schemas: BTreeMap<StreamName, SchemaConfig>,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            time_keys: default_time_keys(),
            schemas: BTreeMap::new(),
        }
    }
}

impl NormalizeConfig {
    /// Whether `key` is one of the configured time keys
    pub fn is_time_key(&self, key: &str) -> bool {
        self.time_keys.iter().any(|k| k.name == key)
    }
}

fn default_time_keys() -> Vec<TimeKey> {
    vec![
        TimeKey::new("timestamp", 1.0),
        TimeKey::new("time", 1.0),
        TimeKey::new("millis", 0.001),
    ]
}

/// A time field name and its factor to seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeKey {
    pub name: String,

    /// Multiplier converting the raw value to seconds
    #[serde(default = "unit_scale")]
    pub scale: f64,
}

impl TimeKey {
    pub fn new(name: impl Into<String>, scale: f64) -> Self {
        Self {
            name: name.into(),
            scale,
        }
    }
}

fn unit_scale() -> f64 {
    1.0
}

/// Declared schema for one stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub numeric: Vec<String>,

    #[serde(default)]
    pub text: Vec<String>,
}

impl SchemaConfig {
    /// Build the runtime schema
    pub fn to_schema(&self) -> Result<StreamSchema, ContractError> {
        StreamSchema::new(self.numeric.clone(), self.text.clone())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,

    /// Default filter directive, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable
    #[default]
    Pretty,
    /// Single line
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FlightSyncConfig::default();
        assert_eq!(config.anchor_stream, "imu");
        assert_eq!(config.ordering, OrderingPolicy::Reject);
        assert_eq!(config.interpolation.min_samples, 2);
        assert!(config.normalize.is_time_key("millis"));
        assert!(!config.normalize.is_time_key("alt"));
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_deserialize_empty_object_uses_defaults() {
        let config: FlightSyncConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.anchor_stream, "imu");
        assert_eq!(config.normalize.time_keys.len(), 3);
    }

    #[test]
    fn test_schema_config_to_schema() {
        let config = SchemaConfig {
            numeric: vec!["code".into()],
            text: vec!["message".into()],
        };
        let schema = config.to_schema().unwrap();
        assert_eq!(schema.text_fields().to_vec(), vec!["message".to_string()]);
    }
}
