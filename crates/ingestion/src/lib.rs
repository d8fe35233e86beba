//! # Ingestion
//!
//! Telemetry normalization module.
//!
//! Responsibilities:
//! - Turn untyped raw rows into schema-checked `Stream`s
//! - Resolve time keys and convert them to seconds
//! - Enforce (or repair) timestamp ordering
//! - Generate synthetic streams for tests and demos
//!
//! ## Usage Example
//!
//! ```
//! use contracts::{NormalizeConfig, OrderingPolicy};
//! use ingestion::{Normalizer, RawStreamSet, SyntheticStream};
//!
//! let mut raw = RawStreamSet::new();
//! raw.insert("imu".into(), SyntheticStream::imu(100.0).samples(10).generate());
//! raw.insert("gps".into(), SyntheticStream::gps(5.0).samples(2).generate());
//!
//! let normalizer = Normalizer::new(NormalizeConfig::default(), OrderingPolicy::Reject);
//! let streams = normalizer.normalize_set(&raw).unwrap();
//! assert_eq!(streams.total_records(), 12);
//! ```

mod config;
mod error;
mod normalizer;
mod synthetic;

// Re-exports
pub use config::{MetricsSnapshot, NormalizeMetrics};
pub use error::{IngestionError, Result};
pub use normalizer::{Normalizer, RawRecord, RawStreamSet};
pub use synthetic::{SyntheticStream, SyntheticStreamConfig};
