//! Ingestion 错误类型

use contracts::ContractError;
use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 记录中没有任何可识别的时间字段
    #[error("stream '{stream}' record {index}: no time field (tried {tried:?})")]
    MissingTimestamp {
        /// 流名称
        stream: String,
        /// 记录序号
        index: usize,
        /// 尝试过的时间字段
        tried: Vec<String>,
    },

    /// 时间字段不是有限数值
    #[error("stream '{stream}' record {index}: invalid time value in '{key}': {value}")]
    InvalidTimestamp {
        /// 流名称
        stream: String,
        /// 记录序号
        index: usize,
        /// 时间字段名
        key: String,
        /// 原始值
        value: String,
    },

    /// 记录与流 schema 不一致
    #[error("stream '{stream}' record {index}: field '{field}' {message}")]
    SchemaMismatch {
        /// 流名称
        stream: String,
        /// 记录序号
        index: usize,
        /// 字段名
        field: String,
        /// 错误消息
        message: String,
    },

    /// 时间戳非单调
    #[error(
        "stream '{stream}' is not sorted: record {index} at {timestamp}s follows {previous}s"
    )]
    UnsortedStream {
        /// 流名称
        stream: String,
        /// 第一个乱序记录的序号
        index: usize,
        /// 该记录时间戳
        timestamp: f64,
        /// 前一条记录时间戳
        previous: f64,
    },

    /// 合约层错误
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl IngestionError {
    pub(crate) fn schema_mismatch(
        stream: &str,
        index: usize,
        field: &str,
        message: impl Into<String>,
    ) -> Self {
        Self::SchemaMismatch {
            stream: stream.to_string(),
            index,
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
