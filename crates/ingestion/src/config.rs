//! Normalization counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Normalization metrics
#[derive(Debug, Default)]
pub struct NormalizeMetrics {
    /// Streams normalized successfully
    pub streams_normalized: AtomicU64,

    /// Records accepted into streams
    pub records_normalized: AtomicU64,

    /// Records that were out of order before sorting
    pub records_reordered: AtomicU64,

    /// Rows that failed validation
    pub rows_rejected: AtomicU64,

    /// Whole streams rejected for being out of order
    pub streams_rejected: AtomicU64,
}

impl NormalizeMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a normalized stream of `records` records
    pub fn record_stream(&self, records: usize) {
        self.streams_normalized.fetch_add(1, Ordering::Relaxed);
        self.records_normalized
            .fetch_add(records as u64, Ordering::Relaxed);
    }

    /// Record records moved by sorting
    pub fn record_reordered(&self, count: usize) {
        self.records_reordered
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Record a rejected row
    pub fn record_rejected(&self) {
        self.rows_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a stream rejected by the ordering policy
    pub fn record_stream_rejected(&self) {
        self.streams_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            streams_normalized: self.streams_normalized.load(Ordering::Relaxed),
            records_normalized: self.records_normalized.load(Ordering::Relaxed),
            records_reordered: self.records_reordered.load(Ordering::Relaxed),
            rows_rejected: self.rows_rejected.load(Ordering::Relaxed),
            streams_rejected: self.streams_rejected.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub streams_normalized: u64,
    pub records_normalized: u64,
    pub records_reordered: u64,
    pub rows_rejected: u64,
    pub streams_rejected: u64,
}
