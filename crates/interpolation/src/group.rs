//! Interpolation engines for a whole stream set.

use std::collections::BTreeMap;

use contracts::{InterpolationConfig, StreamName, StreamSet};
use tracing::{debug, instrument};

use crate::engine::{FlightInterpolator, InterpolatedSample};
use crate::error::{InterpError, Result};

/// Default minimum record count for a stream to get an engine.
pub const DEFAULT_MIN_SAMPLES: usize = 2;

/// One [`FlightInterpolator`] per sufficiently populated stream.
#[derive(Debug, Clone)]
pub struct InterpolationGroup {
    engines: BTreeMap<StreamName, FlightInterpolator>,
    skipped: Vec<StreamName>,
    min_samples: usize,
}

impl InterpolationGroup {
    /// Builds engines for streams with at least two records.
    pub fn build(streams: &StreamSet) -> Self {
        Self::with_min_samples(streams, DEFAULT_MIN_SAMPLES)
    }

    /// Builds engines using the configured threshold.
    pub fn from_config(streams: &StreamSet, config: &InterpolationConfig) -> Self {
        Self::with_min_samples(streams, config.min_samples)
    }

    /// Builds engines for streams with at least `min_samples` records.
    ///
    /// Thresholds below [`DEFAULT_MIN_SAMPLES`] are raised to it.
    #[instrument(
        level = "debug",
        name = "interp_group_build",
        skip(streams),
        fields(streams = streams.len())
    )]
    pub fn with_min_samples(streams: &StreamSet, min_samples: usize) -> Self {
        let min_samples = min_samples.max(DEFAULT_MIN_SAMPLES);
        let mut engines = BTreeMap::new();
        let mut skipped = Vec::new();

        for (name, stream) in streams.iter() {
            if stream.len() < min_samples {
                debug!(
                    stream = %name,
                    records = stream.len(),
                    min_samples,
                    "stream below sample threshold, not interpolated"
                );
                skipped.push(name.clone());
                continue;
            }
            engines.insert(name.clone(), FlightInterpolator::build(stream));
        }

        debug!(
            engines = engines.len(),
            skipped = skipped.len(),
            "interpolation group built"
        );

        Self {
            engines,
            skipped,
            min_samples,
        }
    }

    /// All fields of `stream` at `t`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownGroup` if the stream is absent or was skipped.
    pub fn query(&self, t: f64, stream: &str) -> Result<InterpolatedSample> {
        Ok(self.engine(stream)?.query(t))
    }

    /// One field of `stream` at `t`.
    ///
    /// # Errors
    ///
    /// `UnknownGroup` for the stream, then `MissingField` for the field.
    pub fn value(&self, stream: &str, field: &str, t: f64) -> Result<f64> {
        self.engine(stream)?.value(field, t)
    }

    #[must_use]
    pub fn get(&self, stream: &str) -> Option<&FlightInterpolator> {
        self.engines.get(stream)
    }

    #[must_use]
    pub fn contains(&self, stream: &str) -> bool {
        self.engines.contains_key(stream)
    }

    /// Streams with an engine, in sorted order.
    pub fn streams(&self) -> impl Iterator<Item = &StreamName> {
        self.engines.keys()
    }

    /// Streams left out for having too few records.
    #[must_use]
    pub fn skipped(&self) -> &[StreamName] {
        &self.skipped
    }

    #[must_use]
    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    fn engine(&self, stream: &str) -> Result<&FlightInterpolator> {
        self.engines
            .get(stream)
            .ok_or_else(|| InterpError::unknown_group(stream))
    }
}
