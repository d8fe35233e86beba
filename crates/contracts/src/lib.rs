//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Every record carries a `timestamp` in seconds (f64)
//! - Timestamps are non-decreasing within a stream, unsynchronized across streams
//! - Streams are validated once at the normalization boundary (`ingestion`)

mod composite;
mod error;
mod flight_config;
mod record;
mod schema;
mod stream;
mod stream_name;

pub use composite::*;
pub use error::*;
pub use flight_config::*;
pub use record::Record;
pub use schema::{FieldKind, StreamSchema, TIMESTAMP_FIELD};
pub use stream::{Stream, StreamSet};
pub use stream_name::{well_known, StreamName};
