//! Per-session read positions.

use contracts::{MergeStats, StreamName};

/// Read position of every stream in one merge session.
///
/// Obtained from [`crate::CausalMerge::cursors`]; positions start at 0 and
/// only move forward. A position equals the number of records of that stream
/// consumed so far.
#[derive(Debug, Clone, PartialEq)]
pub struct Cursors {
    names: Vec<StreamName>,
    positions: Vec<usize>,
    stats: MergeStats,
}

impl Cursors {
    pub(crate) fn new(names: Vec<StreamName>) -> Self {
        let positions = vec![0; names.len()];
        Self {
            names,
            positions,
            stats: MergeStats::default(),
        }
    }

    /// Consumed record count for `stream`.
    pub fn position(&self, stream: &str) -> Option<usize> {
        self.lane(stream).map(|lane| self.positions[lane])
    }

    /// Composites produced so far.
    pub fn emitted(&self) -> u64 {
        self.stats.composites
    }

    pub fn stats(&self) -> &MergeStats {
        &self.stats
    }

    /// Streams tracked, in lane order.
    pub fn streams(&self) -> &[StreamName] {
        &self.names
    }

    pub(crate) fn lanes(&self) -> usize {
        self.positions.len()
    }

    pub(crate) fn at(&self, lane: usize) -> usize {
        self.positions[lane]
    }

    /// Moves a lane forward by `consumed` records.
    pub(crate) fn advance_lane(&mut self, lane: usize, consumed: usize) {
        if consumed == 0 {
            return;
        }
        self.positions[lane] += consumed;

        let name = &self.names[lane];
        *self.stats.consumed.entry(name.clone()).or_insert(0) += consumed as u64;
        if consumed > 1 {
            *self.stats.superseded.entry(name.clone()).or_insert(0) += consumed as u64 - 1;
        }
    }

    pub(crate) fn finish_step(&mut self) -> u64 {
        let sequence = self.stats.composites;
        self.stats.composites += 1;
        sequence
    }

    fn lane(&self, stream: &str) -> Option<usize> {
        self.names.iter().position(|name| name == stream)
    }
}
