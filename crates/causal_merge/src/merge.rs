//! Causal merge plan and session.

use std::collections::{BTreeMap, BTreeSet};
use std::iter::FusedIterator;

use contracts::{CompositeRecord, FlightSyncConfig, MergeStats, Stream, StreamName, StreamSet};
use tracing::{debug, instrument, trace, warn};

use crate::cursor::Cursors;

/// Immutable merge plan over a [`StreamSet`].
///
/// Each step takes the next anchor record and, for every other stream, every
/// record at or before the anchor time that has not been taken yet. A stream
/// with nothing new keeps its last taken record (zero-order hold). No record
/// later than the anchor time is ever used.
///
/// The plan holds no position; positions live in [`Cursors`], so any number of
/// sessions can run over one plan.
#[derive(Debug, Clone)]
pub struct CausalMerge<'a> {
    anchor: StreamName,
    anchor_lane: Option<usize>,
    lanes: Vec<&'a Stream>,
}

impl<'a> CausalMerge<'a> {
    /// Plans a merge driven by `anchor`.
    ///
    /// An absent or empty anchor stream is not an error; every session over
    /// the plan is exhausted from the start.
    #[instrument(
        level = "debug",
        name = "causal_merge_new",
        skip(streams, anchor),
        fields(streams = streams.len())
    )]
    pub fn new(streams: &'a StreamSet, anchor: impl Into<StreamName>) -> Self {
        let anchor = anchor.into();
        let lanes: Vec<&'a Stream> = streams.streams().collect();
        let anchor_lane = lanes.iter().position(|s| *s.name() == anchor);

        match anchor_lane.map(|lane| lanes[lane].len()) {
            None => warn!(anchor = %anchor, "anchor stream absent, merge yields nothing"),
            Some(0) => warn!(anchor = %anchor, "anchor stream empty, merge yields nothing"),
            Some(size) => debug!(anchor = %anchor, size, "causal merge planned"),
        }

        Self {
            anchor,
            anchor_lane,
            lanes,
        }
    }

    /// Plans a merge driven by the configured anchor stream.
    pub fn from_config(streams: &'a StreamSet, config: &FlightSyncConfig) -> Self {
        Self::new(streams, config.anchor_stream.clone())
    }

    pub fn anchor(&self) -> &StreamName {
        &self.anchor
    }

    /// Number of composites a session yields: the anchor length, 0 if absent.
    pub fn size(&self) -> usize {
        self.anchor_lane.map_or(0, |lane| self.lanes[lane].len())
    }

    /// Streams taking part, anchor included, in name order.
    pub fn streams(&self) -> impl Iterator<Item = &StreamName> + '_ {
        self.lanes.iter().map(|s| s.name())
    }

    /// Fresh positions, all at 0.
    pub fn cursors(&self) -> Cursors {
        Cursors::new(self.lanes.iter().map(|s| s.name().clone()).collect())
    }

    /// Iterator over a new session.
    pub fn session(&self) -> MergeSession<'_, 'a> {
        MergeSession {
            merge: self,
            cursors: self.cursors(),
        }
    }

    /// Performs one step; `None` once the anchor stream is exhausted.
    ///
    /// `cursors` must come from this plan. Cursors over a different set of
    /// stream names yield `None`.
    #[instrument(
        level = "trace",
        name = "causal_merge_advance",
        skip(self, cursors),
        fields(anchor = %self.anchor, sequence = cursors.emitted())
    )]
    pub fn advance(&self, cursors: &mut Cursors) -> Option<CompositeRecord<'a>> {
        if !self.owns(cursors) {
            warn!(
                expected = self.lanes.len(),
                got = cursors.lanes(),
                "cursors do not belong to this merge"
            );
            return None;
        }

        let anchor_lane = self.anchor_lane?;
        let anchor_stream = self.lanes[anchor_lane];
        let Some(anchor_record) = anchor_stream.get(cursors.at(anchor_lane)) else {
            trace!("anchor exhausted");
            return None;
        };
        let t_anchor = anchor_record.timestamp();
        cursors.advance_lane(anchor_lane, 1);

        let mut records = BTreeMap::new();
        let mut fresh = BTreeSet::new();
        let mut missing = Vec::new();

        records.insert(self.anchor.clone(), anchor_record);
        fresh.insert(self.anchor.clone());

        for (lane, &stream) in self.lanes.iter().enumerate() {
            if lane == anchor_lane {
                continue;
            }

            let start = cursors.at(lane);
            let end = Self::catch_up(stream, start, t_anchor);
            cursors.advance_lane(lane, end - start);

            if end > start {
                fresh.insert(stream.name().clone());
            }
            match end.checked_sub(1).and_then(|held| stream.get(held)) {
                Some(record) => {
                    records.insert(stream.name().clone(), record);
                }
                None => missing.push(stream.name().clone()),
            }
        }

        let composite = CompositeRecord {
            sequence: cursors.finish_step(),
            anchor: self.anchor.clone(),
            t_anchor,
            records,
            fresh,
            missing,
        };

        trace!(
            t_anchor,
            present = composite.len(),
            fresh = composite.fresh.len(),
            missing = composite.missing.len(),
            "composite emitted"
        );
        observability::record_composite_metrics(&composite);

        Some(composite)
    }

    /// Position after taking every record at or before `t` from `start`,
    /// stopping right after an exact match.
    fn owns(&self, cursors: &Cursors) -> bool {
        cursors.lanes() == self.lanes.len()
            && self.streams().eq(cursors.streams().iter())
    }

    fn catch_up(stream: &Stream, start: usize, t: f64) -> usize {
        let mut position = start;
        while let Some(record) = stream.get(position) {
            let ts = record.timestamp();
            if ts > t {
                break;
            }
            position += 1;
            if ts == t {
                break;
            }
        }
        position
    }
}

/// One pass over a [`CausalMerge`], yielding [`CompositeRecord`]s in anchor order.
#[derive(Debug, Clone)]
pub struct MergeSession<'m, 'a> {
    merge: &'m CausalMerge<'a>,
    cursors: Cursors,
}

impl<'m, 'a> MergeSession<'m, 'a> {
    /// Total composites of the session, consumed or not.
    pub fn size(&self) -> usize {
        self.merge.size()
    }

    /// Composites not yet produced.
    pub fn remaining(&self) -> usize {
        let done = usize::try_from(self.cursors.emitted()).unwrap_or(usize::MAX);
        self.size().saturating_sub(done)
    }

    pub fn stats(&self) -> &MergeStats {
        self.cursors.stats()
    }

    pub fn cursors(&self) -> &Cursors {
        &self.cursors
    }

    pub fn into_cursors(self) -> Cursors {
        self.cursors
    }
}

impl<'m, 'a> Iterator for MergeSession<'m, 'a> {
    type Item = CompositeRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let composite = self.merge.advance(&mut self.cursors);
        if composite.is_none() && self.cursors.emitted() > 0 {
            trace!(emitted = self.cursors.emitted(), "merge session finished");
        }
        composite
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for MergeSession<'_, '_> {}

impl FusedIterator for MergeSession<'_, '_> {}
