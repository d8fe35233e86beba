//! 合成遥测流
//!
//! 用于无真实飞行日志的测试与演示。输出可复现：相同 seed 得到相同数据。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use tracing::debug;

use crate::normalizer::RawRecord;

/// 合成流配置
#[derive(Debug, Clone)]
pub struct SyntheticStreamConfig {
    /// 流名称
    pub name: String,

    /// 采样频率 (Hz)
    pub rate_hz: f64,

    /// 采样数
    pub samples: usize,

    /// 第一个采样时间 (s)
    pub start_s: f64,

    /// 时间抖动幅度 (s)，限制在半个采样周期内
    pub jitter_s: f64,

    /// 随机种子
    pub seed: u64,

    /// 数值字段
    pub numeric: Vec<String>,

    /// 文本字段，值为 `"{field} {index}"`
    pub text: Vec<String>,
}

impl Default for SyntheticStreamConfig {
    fn default() -> Self {
        Self {
            name: "synthetic".to_string(),
            rate_hz: 10.0,
            samples: 100,
            start_s: 0.0,
            jitter_s: 0.0,
            seed: 0,
            numeric: vec!["value".to_string()],
            text: Vec::new(),
        }
    }
}

/// 合成流
///
/// 第 k 个数值字段在时间 t 的值为 `(k + 1) * sin((k + 1) * t)` 加上小幅噪声。
#[derive(Debug, Clone)]
pub struct SyntheticStream {
    config: SyntheticStreamConfig,
}

impl SyntheticStream {
    pub fn new(config: SyntheticStreamConfig) -> Self {
        Self { config }
    }

    /// IMU 流
    pub fn imu(rate_hz: f64) -> Self {
        Self::numeric_stream(
            "imu",
            rate_hz,
            &["p", "q", "r", "ax", "ay", "az", "hx", "hy", "hz", "temp"],
        )
    }

    /// GPS 流
    pub fn gps(rate_hz: f64) -> Self {
        Self::numeric_stream("gps", rate_hz, &["lat", "lon", "alt", "vn", "ve", "vd"])
    }

    /// 大气数据流
    pub fn air(rate_hz: f64) -> Self {
        Self::numeric_stream("air", rate_hz, &["airspeed", "altitude", "alpha", "beta"])
    }

    /// 事件流 (仅文本字段)
    pub fn event(rate_hz: f64) -> Self {
        Self::new(SyntheticStreamConfig {
            name: "event".to_string(),
            rate_hz,
            numeric: Vec::new(),
            text: vec!["message".to_string()],
            ..SyntheticStreamConfig::default()
        })
    }

    fn numeric_stream(name: &str, rate_hz: f64, fields: &[&str]) -> Self {
        Self::new(SyntheticStreamConfig {
            name: name.to_string(),
            rate_hz,
            numeric: fields.iter().map(|f| f.to_string()).collect(),
            ..SyntheticStreamConfig::default()
        })
    }

    pub fn samples(mut self, samples: usize) -> Self {
        self.config.samples = samples;
        self
    }

    pub fn start_at(mut self, start_s: f64) -> Self {
        self.config.start_s = start_s;
        self
    }

    pub fn jitter(mut self, jitter_s: f64) -> Self {
        self.config.jitter_s = jitter_s;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &SyntheticStreamConfig {
        &self.config
    }

    /// 采样时间序列，单调不减
    pub fn sample_times(&self) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        self.times(&mut rng)
    }

    /// 生成原始行，时间字段为 `timestamp`
    pub fn generate(&self) -> Vec<RawRecord> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let times = self.times(&mut rng);

        let rows: Vec<RawRecord> = times
            .iter()
            .enumerate()
            .map(|(index, &t)| {
                let mut row = RawRecord::new();
                row.insert("timestamp".to_string(), Value::from(t));
                for (k, field) in self.config.numeric.iter().enumerate() {
                    let gain = (k + 1) as f64;
                    let noise: f64 = rng.random_range(-0.01..0.01);
                    row.insert(field.clone(), Value::from(gain * (gain * t).sin() + noise));
                }
                for field in &self.config.text {
                    row.insert(field.clone(), Value::from(format!("{field} {index}")));
                }
                row
            })
            .collect();

        debug!(
            stream = %self.config.name,
            rows = rows.len(),
            rate_hz = self.config.rate_hz,
            "synthetic stream generated"
        );
        rows
    }

    fn times(&self, rng: &mut StdRng) -> Vec<f64> {
        let period = if self.config.rate_hz > 0.0 {
            1.0 / self.config.rate_hz
        } else {
            0.0
        };
        // 抖动不超过半周期，保证时间单调
        let jitter = self.config.jitter_s.abs().min(period * 0.49);

        (0..self.config.samples)
            .map(|i| {
                let offset = if jitter > 0.0 {
                    rng.random_range(-jitter..jitter)
                } else {
                    0.0
                };
                let t = self.config.start_s + i as f64 * period + offset;
                if i == 0 {
                    t.max(self.config.start_s)
                } else {
                    t
                }
            })
            .collect()
    }
}
