//! 数据规范化
//!
//! 将无类型的原始行 (JSON map) 转换为带显式 schema 的 `Stream`。
//! 时间字段、字段类型、时间顺序都在这里校验，下游不再重复检查。

use std::collections::BTreeMap;
use std::sync::Arc;

use contracts::{
    FlightSyncConfig, NormalizeConfig, OrderingPolicy, Record, Stream, StreamSchema,
    StreamSet, TIMESTAMP_FIELD,
};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::NormalizeMetrics;
use crate::error::{IngestionError, Result};

/// 一行原始遥测数据
pub type RawRecord = serde_json::Map<String, Value>;

/// 按流名分组的原始数据
pub type RawStreamSet = BTreeMap<String, Vec<RawRecord>>;

/// 原始行规范化器
#[derive(Debug)]
pub struct Normalizer {
    config: NormalizeConfig,
    ordering: OrderingPolicy,
    metrics: NormalizeMetrics,
}

impl Normalizer {
    /// 创建规范化器
    pub fn new(config: NormalizeConfig, ordering: OrderingPolicy) -> Self {
        Self {
            config,
            ordering,
            metrics: NormalizeMetrics::new(),
        }
    }

    /// 从完整配置创建
    pub fn from_config(config: &FlightSyncConfig) -> Self {
        Self::new(config.normalize.clone(), config.ordering)
    }

    /// 获取统计
    pub fn metrics(&self) -> &NormalizeMetrics {
        &self.metrics
    }

    /// 规范化单个流
    ///
    /// # Errors
    /// - 缺少时间字段或时间值非法
    /// - 字段类型与 schema 不一致
    /// - `OrderingPolicy::Reject` 下时间戳非单调
    #[instrument(
        level = "debug",
        name = "normalize_stream",
        skip(self, rows),
        fields(stream = %name, rows = rows.len())
    )]
    pub fn normalize_stream(&self, name: &str, rows: &[RawRecord]) -> Result<Stream> {
        let schema = Arc::new(self.resolve_schema(name, rows)?);
        let mut stream = Stream::with_schema(name, Arc::clone(&schema));

        for (index, row) in rows.iter().enumerate() {
            let record = self
                .extract_record(name, index, row, &schema)
                .inspect_err(|_| {
                    self.metrics.record_rejected();
                    metrics::counter!(
                        "flight_sync_rows_rejected_total",
                        "stream" => name.to_string()
                    )
                    .increment(1);
                })?;
            stream.push(record)?;
        }

        self.apply_ordering(&mut stream)?;

        self.metrics.record_stream(stream.len());
        metrics::counter!("flight_sync_streams_normalized_total").increment(1);
        metrics::counter!("flight_sync_records_normalized_total", "stream" => name.to_string())
            .increment(stream.len() as u64);
        debug!(
            numeric = schema.numeric_fields().len(),
            text = schema.text_fields().len(),
            records = stream.len(),
            "stream normalized"
        );
        Ok(stream)
    }

    /// 规范化一组流
    ///
    /// 第一个失败的流中止整个过程。
    pub fn normalize_set(&self, raw: &RawStreamSet) -> Result<StreamSet> {
        raw.iter()
            .map(|(name, rows)| self.normalize_stream(name, rows))
            .collect()
    }

    /// 配置中的 schema 优先，否则从第一行推断
    fn resolve_schema(&self, name: &str, rows: &[RawRecord]) -> Result<StreamSchema> {
        if let Some(declared) = self.config.schemas.get(name) {
            return Ok(declared.to_schema()?);
        }
        match rows.first() {
            Some(first) => self.infer_schema(name, first),
            None => Ok(StreamSchema::empty()),
        }
    }

    /// 数值与布尔为 numeric，字符串为 text，其余类型忽略
    fn infer_schema(&self, name: &str, first: &RawRecord) -> Result<StreamSchema> {
        let mut numeric = Vec::new();
        let mut text = Vec::new();

        let mut entries: Vec<(&String, &Value)> = first.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        for (key, value) in entries {
            if self.config.is_time_key(key) {
                continue;
            }
            // 未配置为时间字段的 timestamp 列不能成为普通字段
            if key == TIMESTAMP_FIELD {
                debug!(stream = name, field = %key, "reserved field skipped");
                continue;
            }
            match value {
                Value::Number(_) | Value::Bool(_) => numeric.push(key.clone()),
                Value::String(_) => text.push(key.clone()),
                other => {
                    debug!(stream = name, field = %key, kind = value_kind(other), "field skipped");
                }
            }
        }

        Ok(StreamSchema::new(numeric, text)?)
    }

    /// 按配置顺序查找第一个存在的时间字段并换算为秒
    fn extract_timestamp(&self, name: &str, index: usize, row: &RawRecord) -> Result<f64> {
        let Some((key, value)) = self
            .config
            .time_keys
            .iter()
            .find_map(|key| row.get(&key.name).map(|value| (key, value)))
        else {
            return Err(IngestionError::MissingTimestamp {
                stream: name.to_string(),
                index,
                tried: self.config.time_keys.iter().map(|k| k.name.clone()).collect(),
            });
        };

        let seconds = value.as_f64().map(|raw| raw * key.scale);
        match seconds {
            Some(t) if t.is_finite() => Ok(t),
            _ => Err(IngestionError::InvalidTimestamp {
                stream: name.to_string(),
                index,
                key: key.name.clone(),
                value: value.to_string(),
            }),
        }
    }

    fn extract_record(
        &self,
        name: &str,
        index: usize,
        row: &RawRecord,
        schema: &Arc<StreamSchema>,
    ) -> Result<Record> {
        let timestamp = self.extract_timestamp(name, index, row)?;

        let mut numeric = Vec::with_capacity(schema.numeric_fields().len());
        for field in schema.numeric_fields() {
            let value = match row.get(field) {
                Some(Value::Number(n)) => n.as_f64(),
                Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
                Some(other) => {
                    return Err(IngestionError::schema_mismatch(
                        name,
                        index,
                        field,
                        format!("expected numeric, got {}", value_kind(other)),
                    ));
                }
                None => None,
            };
            let value = value.ok_or_else(|| {
                IngestionError::schema_mismatch(name, index, field, "is missing")
            })?;
            numeric.push(value);
        }

        let mut text = Vec::with_capacity(schema.text_fields().len());
        for field in schema.text_fields() {
            match row.get(field) {
                Some(Value::String(s)) => text.push(Arc::<str>::from(s.as_str())),
                Some(other) => {
                    return Err(IngestionError::schema_mismatch(
                        name,
                        index,
                        field,
                        format!("expected text, got {}", value_kind(other)),
                    ));
                }
                None => {
                    return Err(IngestionError::schema_mismatch(name, index, field, "is missing"));
                }
            }
        }

        Ok(Record::new(Arc::clone(schema), timestamp, numeric, text)?)
    }

    fn apply_ordering(&self, stream: &mut Stream) -> Result<()> {
        let Some(index) = stream.first_out_of_order() else {
            return Ok(());
        };

        match self.ordering {
            OrderingPolicy::Reject => {
                self.metrics.record_stream_rejected();
                metrics::counter!(
                    "flight_sync_streams_rejected_total",
                    "stream" => stream.name().to_string()
                )
                .increment(1);
                Err(IngestionError::UnsortedStream {
                    stream: stream.name().to_string(),
                    index,
                    timestamp: stream[index].timestamp(),
                    previous: stream[index - 1].timestamp(),
                })
            }
            OrderingPolicy::Sort => {
                let moved = stream.out_of_order_count();
                warn!(
                    stream = %stream.name(),
                    first_index = index,
                    out_of_order = moved,
                    "stream not sorted by timestamp, sorting"
                );
                stream.sort_by_timestamp();
                self.metrics.record_reordered(moved);
                metrics::counter!(
                    "flight_sync_records_reordered_total",
                    "stream" => stream.name().to_string()
                )
                .increment(moved as u64);
                Ok(())
            }
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizeConfig::default(), OrderingPolicy::default())
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
