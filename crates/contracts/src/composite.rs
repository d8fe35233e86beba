//! CompositeRecord - Causal merge output
//!
//! One synchronized view per anchor sample.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::{Record, StreamName};

/// Synchronized composite record
///
/// Holds the anchor sample plus, for every other stream, the latest record
/// at or before the anchor time (zero-order hold).
#[derive(Debug, Clone, Serialize)]
pub struct CompositeRecord<'a> {
    /// Call index within the session (0-based)
    pub sequence: u64,

    /// Anchor stream name
    pub anchor: StreamName,

    /// Anchor sample time (seconds)
    pub t_anchor: f64,

    /// Stream -> held record (anchor included)
    pub records: BTreeMap<StreamName, &'a Record>,

    /// Streams whose record was consumed by this call
    pub fresh: BTreeSet<StreamName>,

    /// Secondary streams with no record at or before `t_anchor` yet
    pub missing: Vec<StreamName>,
}

impl<'a> CompositeRecord<'a> {
    /// Record held for a stream
    #[inline]
    pub fn get(&self, stream: &str) -> Option<&'a Record> {
        self.records.get(stream).copied()
    }

    /// The anchor sample
    pub fn anchor_record(&self) -> Option<&'a Record> {
        self.get(&self.anchor)
    }

    pub fn contains(&self, stream: &str) -> bool {
        self.records.contains_key(stream)
    }

    /// Whether the stream's record was newly consumed (not held over)
    pub fn is_fresh(&self, stream: &str) -> bool {
        self.fresh.contains(stream)
    }

    /// Seconds between the held record and the anchor time
    pub fn age(&self, stream: &str) -> Option<f64> {
        self.get(stream).map(|r| self.t_anchor - r.timestamp())
    }

    /// Number of streams present (anchor included)
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Present streams over present + missing
    pub fn completeness(&self) -> f64 {
        let total = self.records.len() + self.missing.len();
        if total == 0 {
            0.0
        } else {
            self.records.len() as f64 / total as f64
        }
    }
}

/// Merge session counters (for diagnostics)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergeStats {
    /// Composites emitted
    pub composites: u64,

    /// Records consumed per stream (anchor included)
    pub consumed: BTreeMap<StreamName, u64>,

    /// Records consumed but overwritten within the same call
    pub superseded: BTreeMap<StreamName, u64>,
}

impl MergeStats {
    pub fn consumed_for(&self, stream: &str) -> u64 {
        self.consumed.get(stream).copied().unwrap_or(0)
    }

    pub fn superseded_for(&self, stream: &str) -> u64 {
        self.superseded.get(stream).copied().unwrap_or(0)
    }

    pub fn total_consumed(&self) -> u64 {
        self.consumed.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Stream;

    #[test]
    fn test_composite_accessors() {
        let imu = Stream::from_numeric_rows("imu", &["p"], [(0.2, [0.1])]).unwrap();
        let gps = Stream::from_numeric_rows("gps", &["alt"], [(0.05, [300.0])]).unwrap();

        let composite = CompositeRecord {
            sequence: 2,
            anchor: "imu".into(),
            t_anchor: 0.2,
            records: BTreeMap::from([("imu".into(), &imu[0]), ("gps".into(), &gps[0])]),
            fresh: BTreeSet::from(["imu".into()]),
            missing: vec!["air".into()],
        };

        assert_eq!(composite.anchor_record().and_then(|r| r.get("p")), Some(0.1));
        assert!(composite.is_fresh("imu"));
        assert!(!composite.is_fresh("gps"));
        assert!((composite.age("gps").unwrap() - 0.15).abs() < 1e-12);
        assert_eq!(composite.age("air"), None);
        assert!((composite.completeness() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_merge_stats_defaults() {
        let stats = MergeStats::default();
        assert_eq!(stats.consumed_for("imu"), 0);
        assert_eq!(stats.total_consumed(), 0);
    }
}
