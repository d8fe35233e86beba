//! Per-stream interpolation engine.

use std::collections::BTreeMap;

use contracts::{Stream, StreamName};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::{InterpError, Result};
use crate::linear::LinearInterpolator;

/// Every interpolated field of one stream at one query time.
///
/// Serializes flat: `{"timestamp": t, "<field>": value, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterpolatedSample {
    /// The query time, echoed back.
    pub timestamp: f64,

    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

impl InterpolatedSample {
    #[must_use]
    pub fn get(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Continuous-time view of one stream.
///
/// Holds one [`LinearInterpolator`] per numeric field. Text fields and the
/// timestamp are not interpolated. The engine owns copies of the samples and
/// does not borrow the source stream.
///
/// # Example
///
/// ```
/// use contracts::Stream;
/// use interpolation::FlightInterpolator;
///
/// let air = Stream::from_numeric_rows("air", &["alt"], [(0.0, [0.0]), (10.0, [100.0])]).unwrap();
/// let engine = FlightInterpolator::build(&air);
///
/// assert_eq!(engine.value("alt", 5.0).unwrap(), 50.0);
/// assert_eq!(engine.query(-1.0).get("alt"), Some(0.0));
/// ```
#[derive(Debug, Clone)]
pub struct FlightInterpolator {
    stream: StreamName,
    fields: BTreeMap<String, LinearInterpolator>,
    samples: usize,
}

impl FlightInterpolator {
    /// Builds one interpolator per numeric field of `stream`.
    ///
    /// An empty stream yields an engine with no fields.
    #[instrument(
        level = "debug",
        name = "interp_build",
        skip(stream),
        fields(stream = %stream.name(), records = stream.len())
    )]
    pub fn build(stream: &Stream) -> Self {
        let mut fields = BTreeMap::new();

        if !stream.is_empty() {
            for (idx, field) in stream.schema().numeric_fields().iter().enumerate() {
                let points = stream
                    .iter()
                    .map(|record| (record.timestamp(), record.numeric_values()[idx]));
                fields.insert(field.clone(), LinearInterpolator::new(points));
            }
        }

        debug!(
            fields = fields.len(),
            skipped_text = stream.schema().text_fields().len(),
            "interpolator built"
        );

        Self {
            stream: stream.name().clone(),
            fields,
            samples: stream.len(),
        }
    }

    /// Name of the source stream.
    #[must_use]
    pub fn stream(&self) -> &StreamName {
        &self.stream
    }

    /// Interpolated field names in sorted order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Number of samples the engine was built from.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.samples
    }

    /// Time span shared by every field.
    #[must_use]
    pub fn domain(&self) -> Option<(f64, f64)> {
        self.fields.values().next().and_then(LinearInterpolator::domain)
    }

    /// The interpolator for one field.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` for text fields, unknown names and any field of
    /// an engine built from an empty stream.
    pub fn field(&self, field: &str) -> Result<&LinearInterpolator> {
        self.fields
            .get(field)
            .ok_or_else(|| InterpError::missing_field(self.stream.as_str(), field))
    }

    /// Value of one field at `t`.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` if the field is not interpolated.
    pub fn value(&self, field: &str, t: f64) -> Result<f64> {
        Ok(self.field(field)?.eval(t))
    }

    /// Every field at `t`.
    #[must_use]
    pub fn query(&self, t: f64) -> InterpolatedSample {
        InterpolatedSample {
            timestamp: t,
            values: self
                .fields
                .iter()
                .map(|(name, f)| (name.clone(), f.eval(t)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OUT_OF_DOMAIN_FILL;
    use contracts::StreamSchema;
    use std::sync::Arc;

    fn gps() -> Stream {
        Stream::from_numeric_rows(
            "gps",
            &["lat", "lon"],
            [
                (0.0, [44.90, -93.20]),
                (0.2, [44.92, -93.21]),
                (0.4, [44.95, -93.25]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_query_exact_at_every_sample() {
        let stream = gps();
        let engine = FlightInterpolator::build(&stream);

        for record in &stream {
            let sample = engine.query(record.timestamp());
            assert_eq!(sample.timestamp, record.timestamp());
            for (field, value) in record.numeric_fields() {
                assert_eq!(sample.get(field), Some(value));
            }
        }
    }

    #[test]
    fn test_query_between_samples() {
        let engine = FlightInterpolator::build(&gps());
        let t = 0.3;
        let expected = 44.92 + (44.95 - 44.92) * (t - 0.2) / (0.4 - 0.2);
        assert_eq!(engine.value("lat", t).unwrap(), expected);
    }

    #[test]
    fn test_query_outside_domain() {
        let engine = FlightInterpolator::build(&gps());
        let sample = engine.query(0.5);
        assert_eq!(sample.len(), 2);
        assert!(sample.values.values().all(|&v| v == OUT_OF_DOMAIN_FILL));
        assert_eq!(engine.value("lon", -0.1).unwrap(), 0.0);
    }

    #[test]
    fn test_altitude_scenario() {
        let air = Stream::from_numeric_rows("air", &["alt"], [(0.0, [0.0]), (10.0, [100.0])])
            .unwrap();
        let engine = FlightInterpolator::build(&air);

        assert_eq!(engine.value("alt", 5.0).unwrap(), 50.0);
        assert_eq!(engine.value("alt", -1.0).unwrap(), 0.0);
        assert_eq!(engine.value("alt", 11.0).unwrap(), 0.0);
        assert_eq!(engine.value("alt", 0.0).unwrap(), 0.0);
        assert_eq!(engine.value("alt", 10.0).unwrap(), 100.0);
    }

    #[test]
    fn test_empty_stream_has_no_fields() {
        let stream = Stream::new("gps", StreamSchema::numeric(["lat", "lon"]).unwrap());
        let engine = FlightInterpolator::build(&stream);

        assert_eq!(engine.field_count(), 0);
        assert_eq!(engine.domain(), None);
        assert!(engine.query(1.0).is_empty());
        assert_eq!(
            engine.value("lat", 1.0),
            Err(InterpError::missing_field("gps", "lat"))
        );
    }

    #[test]
    fn test_text_fields_not_interpolated() {
        let schema = Arc::new(
            StreamSchema::new(vec!["severity".into()], vec!["message".into()]).unwrap(),
        );
        let mut stream = Stream::with_schema("event", Arc::clone(&schema));
        stream
            .push_values(1.0, vec![1.0], vec![Arc::from("takeoff")])
            .unwrap();
        stream
            .push_values(2.0, vec![3.0], vec![Arc::from("gear up")])
            .unwrap();

        let engine = FlightInterpolator::build(&stream);
        assert_eq!(engine.fields().collect::<Vec<_>>(), vec!["severity"]);
        assert!(matches!(
            engine.field("message"),
            Err(InterpError::MissingField { .. })
        ));
        assert!(matches!(
            engine.field("timestamp"),
            Err(InterpError::MissingField { .. })
        ));
    }

    #[test]
    fn test_engine_independent_of_stream() {
        let engine = {
            let stream = gps();
            FlightInterpolator::build(&stream)
        };
        assert_eq!(engine.sample_count(), 3);
        assert_eq!(engine.domain(), Some((0.0, 0.4)));
        assert_eq!(engine.stream(), "gps");
    }

    #[test]
    fn test_sample_serializes_flat() {
        let engine = FlightInterpolator::build(&gps());
        let json = serde_json::to_value(engine.query(0.2)).unwrap();
        assert_eq!(json["timestamp"], 0.2);
        assert_eq!(json["lat"], 44.92);
        assert_eq!(json["lon"], -93.21);
    }
}
