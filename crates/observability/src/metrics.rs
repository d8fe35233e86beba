//! Causal merge 指标收集模块
//!
//! 基于 CompositeRecord 收集和统计合并过程的运行指标。

use std::collections::BTreeMap;

use contracts::{CompositeRecord, StreamName};
use metrics::{counter, gauge, histogram};

/// 从 CompositeRecord 记录指标
///
/// 每产生一个 CompositeRecord 调用一次。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_composite_metrics;
///
/// while let Some(composite) = merge.advance(&mut cursors) {
///     record_composite_metrics(&composite);
/// }
/// ```
pub fn record_composite_metrics(composite: &CompositeRecord<'_>) {
    // 合成记录计数
    counter!("flight_sync_composites_total", "anchor" => composite.anchor.to_string())
        .increment(1);

    gauge!("flight_sync_last_sequence").set(composite.sequence as f64);
    gauge!("flight_sync_anchor_time_seconds").set(composite.t_anchor);

    histogram!("flight_sync_completeness_ratio").record(composite.completeness());

    // 缺失流
    if !composite.missing.is_empty() {
        counter!("flight_sync_composites_with_missing_total").increment(1);
        for stream in &composite.missing {
            counter!("flight_sync_stream_missing_total", "stream" => stream.to_string())
                .increment(1);
        }
    }

    // 保持时长与新鲜度
    for stream in composite.records.keys() {
        if *stream == composite.anchor {
            continue;
        }
        if let Some(age) = composite.age(stream) {
            histogram!("flight_sync_hold_age_ms", "stream" => stream.to_string())
                .record(age * 1000.0);
        }
        if composite.is_fresh(stream) {
            counter!("flight_sync_stream_fresh_total", "stream" => stream.to_string())
                .increment(1);
        }
    }
}

/// 合并指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct MergeMetricsAggregator {
    /// 合成记录总数
    pub total_composites: u64,

    /// 含缺失流的合成记录数
    pub composites_with_missing: u64,

    /// 完整度统计
    pub completeness_stats: RunningStats,

    /// 相邻 anchor 时间间隔统计 (毫秒)
    pub anchor_interval_stats: RunningStats,

    /// 各流保持时长统计 (毫秒)
    pub hold_age_stats: BTreeMap<StreamName, RunningStats>,

    /// 各流新鲜记录次数
    pub fresh_counts: BTreeMap<StreamName, u64>,

    /// 各流缺失次数
    pub missing_counts: BTreeMap<StreamName, u64>,

    last_anchor_time: Option<f64>,
}

impl MergeMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, composite: &CompositeRecord<'_>) {
        self.total_composites += 1;
        self.completeness_stats.push(composite.completeness());

        if let Some(last) = self.last_anchor_time {
            self.anchor_interval_stats
                .push((composite.t_anchor - last) * 1000.0);
        }
        self.last_anchor_time = Some(composite.t_anchor);

        if !composite.missing.is_empty() {
            self.composites_with_missing += 1;
            for stream in &composite.missing {
                *self.missing_counts.entry(stream.clone()).or_insert(0) += 1;
            }
        }

        for stream in composite.records.keys() {
            if *stream == composite.anchor {
                continue;
            }
            if let Some(age) = composite.age(stream) {
                self.hold_age_stats
                    .entry(stream.clone())
                    .or_default()
                    .push(age * 1000.0);
            }
            if composite.is_fresh(stream) {
                *self.fresh_counts.entry(stream.clone()).or_insert(0) += 1;
            }
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MergeSummary {
        MergeSummary {
            total_composites: self.total_composites,
            composites_with_missing: self.composites_with_missing,
            missing_rate: if self.total_composites > 0 {
                self.composites_with_missing as f64 / self.total_composites as f64 * 100.0
            } else {
                0.0
            },
            completeness: StatsSummary::from(&self.completeness_stats),
            anchor_interval_ms: StatsSummary::from(&self.anchor_interval_stats),
            hold_age_ms: self
                .hold_age_stats
                .iter()
                .map(|(stream, stats)| (stream.clone(), StatsSummary::from(stats)))
                .collect(),
            fresh_counts: self.fresh_counts.clone(),
            missing_counts: self.missing_counts.clone(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MergeSummary {
    pub total_composites: u64,
    pub composites_with_missing: u64,
    pub missing_rate: f64,
    pub completeness: StatsSummary,
    pub anchor_interval_ms: StatsSummary,
    pub hold_age_ms: BTreeMap<StreamName, StatsSummary>,
    pub fresh_counts: BTreeMap<StreamName, u64>,
    pub missing_counts: BTreeMap<StreamName, u64>,
}

impl std::fmt::Display for MergeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Causal Merge Summary ===")?;
        writeln!(f, "Total composites: {}", self.total_composites)?;
        writeln!(
            f,
            "Composites with missing streams: {} ({:.2}%)",
            self.composites_with_missing, self.missing_rate
        )?;
        writeln!(f, "Completeness: {}", self.completeness)?;
        writeln!(f, "Anchor interval (ms): {}", self.anchor_interval_ms)?;

        if !self.hold_age_ms.is_empty() {
            writeln!(f, "Hold age (ms):")?;
            for (stream, stats) in &self.hold_age_ms {
                let fresh = self.fresh_counts.get(stream).copied().unwrap_or(0);
                writeln!(f, "  {stream}: {stats}, fresh={fresh}")?;
            }
        }

        if !self.missing_counts.is_empty() {
            writeln!(f, "Missing stream counts:")?;
            for (stream, count) in &self.missing_counts {
                writeln!(f, "  {stream}: {count}")?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Stream;
    use std::collections::BTreeSet;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_running_stats_empty() {
        let stats = RunningStats::default();
        assert_eq!(stats.mean(), 0.0);
        assert_eq!(stats.std_dev(), 0.0);
        assert_eq!(StatsSummary::from(&stats).to_string(), "N/A");
    }

    #[test]
    fn test_aggregator_update() {
        let imu = Stream::from_numeric_rows("imu", &["p"], [(0.1, [0.0]), (0.2, [0.0])]).unwrap();
        let gps = Stream::from_numeric_rows("gps", &["alt"], [(0.05, [300.0])]).unwrap();

        let first = CompositeRecord {
            sequence: 0,
            anchor: "imu".into(),
            t_anchor: 0.1,
            records: BTreeMap::from([("imu".into(), &imu[0]), ("gps".into(), &gps[0])]),
            fresh: BTreeSet::from(["imu".into(), "gps".into()]),
            missing: vec!["air".into()],
        };
        let second = CompositeRecord {
            sequence: 1,
            t_anchor: 0.2,
            records: BTreeMap::from([("imu".into(), &imu[1]), ("gps".into(), &gps[0])]),
            fresh: BTreeSet::from(["imu".into()]),
            ..first.clone()
        };

        let mut aggregator = MergeMetricsAggregator::new();
        aggregator.update(&first);
        aggregator.update(&second);

        assert_eq!(aggregator.total_composites, 2);
        assert_eq!(aggregator.composites_with_missing, 2);
        assert_eq!(aggregator.missing_counts.get("air"), Some(&2));
        assert_eq!(aggregator.fresh_counts.get("gps"), Some(&1));
        assert!(!aggregator.hold_age_stats.contains_key("imu"));

        let gps_age = &aggregator.hold_age_stats["gps"];
        assert_eq!(gps_age.count(), 2);
        assert!((gps_age.max() - 150.0).abs() < 1e-9);
        assert!((aggregator.anchor_interval_stats.mean() - 100.0).abs() < 1e-9);

        aggregator.reset();
        assert_eq!(aggregator.total_composites, 0);
    }

    #[test]
    fn test_record_without_recorder() {
        let imu = Stream::from_numeric_rows("imu", &["p"], [(0.1, [0.0])]).unwrap();
        let composite = CompositeRecord {
            sequence: 0,
            anchor: "imu".into(),
            t_anchor: 0.1,
            records: BTreeMap::from([("imu".into(), &imu[0])]),
            fresh: BTreeSet::from(["imu".into()]),
            missing: vec!["gps".into()],
        };
        // 未安装 recorder 时为空操作
        record_composite_metrics(&composite);
    }

    #[test]
    fn test_summary_display() {
        let summary = MergeSummary {
            total_composites: 100,
            composites_with_missing: 5,
            missing_rate: 5.0,
            completeness: StatsSummary {
                count: 100,
                min: 0.5,
                max: 1.0,
                mean: 0.95,
                std_dev: 0.1,
            },
            hold_age_ms: BTreeMap::from([(
                "gps".into(),
                StatsSummary {
                    count: 95,
                    min: 0.0,
                    max: 190.0,
                    mean: 95.0,
                    std_dev: 55.0,
                },
            )]),
            fresh_counts: BTreeMap::from([("gps".into(), 10)]),
            missing_counts: BTreeMap::from([("gps".into(), 5)]),
            ..MergeSummary::default()
        };

        let output = format!("{}", summary);
        assert!(output.contains("Total composites: 100"));
        assert!(output.contains("5.00%"));
        assert!(output.contains("gps: min=0.000, max=190.000"));
        assert!(output.contains("fresh=10"));
        assert!(output.contains("Anchor interval (ms): N/A"));
    }
}
