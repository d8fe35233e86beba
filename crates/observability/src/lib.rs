//! # Observability
//!
//! 可观测性模块：Tracing 初始化 + 合并指标。
//!
//! ## 功能
//!
//! - Tracing 初始化 (JSON/Pretty/Compact 格式)，支持 RUST_LOG
//! - CompositeRecord 指标上报 (`metrics` facade)
//! - 内存聚合统计与摘要输出
//!
//! 不安装任何指标导出器；宿主程序可自行安装 `metrics` recorder。
//!
//! ## 使用示例
//!
//! ```ignore
//! use observability::MergeMetricsAggregator;
//!
//! observability::init_with_config(&config.logging)?;
//!
//! let mut aggregator = MergeMetricsAggregator::new();
//! for composite in merge.session() {
//!     aggregator.update(&composite);
//! }
//! println!("{}", aggregator.summary());
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use contracts::{LogFormat, LoggingConfig};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Re-exports
pub use crate::metrics::{
    record_composite_metrics, MergeMetricsAggregator, MergeSummary, RunningStats, StatsSummary,
};

/// 使用默认配置初始化 (Pretty, info)
pub fn init() -> Result<()> {
    init_with_config(&LoggingConfig::default())
}

/// 使用日志配置初始化
///
/// RUST_LOG 存在时优先于 `config.level`。`config.level` 总是先被解析，
/// 非法指令直接返回错误。
pub fn init_with_config(config: &LoggingConfig) -> Result<()> {
    let configured = EnvFilter::try_new(&config.level)
        .with_context(|| format!("Invalid log level directive: {}", config.level))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or(configured);

    match config.format {
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer().pretty();

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
        LogFormat::Compact => {
            let fmt_layer = fmt::layer().compact();

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
    }

    tracing::info!(
        log_format = ?config.format,
        level = %config.level,
        "Observability initialized"
    );

    Ok(())
}
