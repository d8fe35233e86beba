//! Stream / StreamSet - normalized telemetry input
//!
//! The unit both the interpolation engine and the causal merge consume.

use std::collections::BTreeMap;
use std::ops::Index;
use std::sync::Arc;

use crate::{ContractError, Record, StreamName, StreamSchema};

/// Named, time-ordered sequence of records sharing one schema
#[derive(Debug, Clone)]
pub struct Stream {
    name: StreamName,
    schema: Arc<StreamSchema>,
    records: Vec<Record>,
}

impl Stream {
    /// Create an empty stream with the given schema
    pub fn new(name: impl Into<StreamName>, schema: StreamSchema) -> Self {
        Self::with_schema(name, Arc::new(schema))
    }

    /// Create an empty stream sharing an existing schema
    pub fn with_schema(name: impl Into<StreamName>, schema: Arc<StreamSchema>) -> Self {
        Self {
            name: name.into(),
            schema,
            records: Vec::new(),
        }
    }

    /// Stream without fields or records
    pub fn empty(name: impl Into<StreamName>) -> Self {
        Self::new(name, StreamSchema::empty())
    }

    /// Build a numeric-only stream from `(timestamp, values)` rows
    ///
    /// # Errors
    /// - Invalid schema
    /// - A row whose value count differs from `fields`
    pub fn from_numeric_rows<I, V>(
        name: impl Into<StreamName>,
        fields: &[&str],
        rows: I,
    ) -> Result<Self, ContractError>
    where
        I: IntoIterator<Item = (f64, V)>,
        V: AsRef<[f64]>,
    {
        let mut stream = Self::new(name, StreamSchema::numeric(fields.iter().copied())?);
        for (timestamp, values) in rows {
            stream.push_values(timestamp, values.as_ref().to_vec(), Vec::new())?;
        }
        Ok(stream)
    }

    /// Append a record
    ///
    /// # Errors
    /// - The record was laid out against a different schema
    pub fn push(&mut self, record: Record) -> Result<(), ContractError> {
        if !Arc::ptr_eq(record.schema(), &self.schema) && **record.schema() != *self.schema {
            return Err(ContractError::schema_mismatch(
                self.name.as_str(),
                "record schema differs from stream schema",
            ));
        }
        self.records.push(record);
        Ok(())
    }

    /// Append a record built from raw values against this stream's schema
    pub fn push_values(
        &mut self,
        timestamp: f64,
        numeric: Vec<f64>,
        text: Vec<Arc<str>>,
    ) -> Result<(), ContractError> {
        let record = Record::new(Arc::clone(&self.schema), timestamp, numeric, text)
            .map_err(|e| ContractError::schema_mismatch(self.name.as_str(), e.to_string()))?;
        self.records.push(record);
        Ok(())
    }

    #[inline]
    pub fn name(&self) -> &StreamName {
        &self.name
    }

    #[inline]
    pub fn schema(&self) -> &StreamSchema {
        &self.schema
    }

    #[inline]
    pub fn shared_schema(&self) -> &Arc<StreamSchema> {
        &self.schema
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    #[inline]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Timestamps in stream order
    pub fn timestamps(&self) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().map(Record::timestamp)
    }

    pub fn first_timestamp(&self) -> Option<f64> {
        self.records.first().map(Record::timestamp)
    }

    pub fn last_timestamp(&self) -> Option<f64> {
        self.records.last().map(Record::timestamp)
    }

    /// `(min, max)` timestamp over all records
    pub fn time_range(&self) -> Option<(f64, f64)> {
        let mut timestamps = self.timestamps();
        let first = timestamps.next()?;
        Some(timestamps.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
    }

    /// Index of the first record older than its predecessor
    pub fn first_out_of_order(&self) -> Option<usize> {
        self.records
            .windows(2)
            .position(|pair| pair[1].timestamp() < pair[0].timestamp())
            .map(|idx| idx + 1)
    }

    /// Number of records older than their predecessor
    pub fn out_of_order_count(&self) -> usize {
        self.records
            .windows(2)
            .filter(|pair| pair[1].timestamp() < pair[0].timestamp())
            .count()
    }

    /// Stable sort by timestamp
    pub fn sort_by_timestamp(&mut self) {
        self.records
            .sort_by(|a, b| a.timestamp().total_cmp(&b.timestamp()));
    }
}

impl Index<usize> for Stream {
    type Output = Record;

    fn index(&self, index: usize) -> &Self::Output {
        &self.records[index]
    }
}

impl<'a> IntoIterator for &'a Stream {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Stream name -> Stream
///
/// Iterates in name order. Absent and empty streams both mean "no data".
#[derive(Debug, Clone, Default)]
pub struct StreamSet {
    streams: BTreeMap<StreamName, Stream>,
}

impl StreamSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a stream under its own name, returning any stream it replaced
    pub fn insert(&mut self, stream: Stream) -> Option<Stream> {
        self.streams.insert(stream.name().clone(), stream)
    }

    pub fn get(&self, name: &str) -> Option<&Stream> {
        self.streams.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Stream> {
        self.streams.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.streams.contains_key(name)
    }

    /// Number of streams (empty ones included)
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &StreamName> {
        self.streams.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StreamName, &Stream)> {
        self.streams.iter()
    }

    pub fn streams(&self) -> impl Iterator<Item = &Stream> {
        self.streams.values()
    }

    /// Records across all streams
    pub fn total_records(&self) -> usize {
        self.streams.values().map(Stream::len).sum()
    }

    /// Earliest and latest timestamp across all streams
    pub fn time_range(&self) -> Option<(f64, f64)> {
        self.streams
            .values()
            .filter_map(Stream::time_range)
            .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)))
    }
}

impl FromIterator<Stream> for StreamSet {
    fn from_iter<I: IntoIterator<Item = Stream>>(iter: I) -> Self {
        let mut set = Self::new();
        for stream in iter {
            set.insert(stream);
        }
        set
    }
}

impl IntoIterator for StreamSet {
    type Item = (StreamName, Stream);
    type IntoIter = std::collections::btree_map::IntoIter<StreamName, Stream>;

    fn into_iter(self) -> Self::IntoIter {
        self.streams.into_iter()
    }
}
