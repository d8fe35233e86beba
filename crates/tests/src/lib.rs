//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 合成数据 e2e 测试：原始行 -> 规范化 -> 插值 / 因果合并 -> 指标
//! - 配置驱动的完整流程

#[cfg(test)]
mod contract_tests {
    use contracts::{FlightSyncConfig, LogFormat, OrderingPolicy};

    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_default_config_snapshot() {
        let config = FlightSyncConfig::default();
        assert_eq!(config.anchor_stream, "imu");
        assert_eq!(config.ordering, OrderingPolicy::Reject);
        assert_eq!(config.interpolation.min_samples, 2);
        assert_eq!(config.logging.format, LogFormat::Pretty);

        let keys: Vec<_> = config
            .normalize
            .time_keys
            .iter()
            .map(|k| (k.name.as_str(), k.scale))
            .collect();
        assert_eq!(keys, vec![("timestamp", 1.0), ("time", 1.0), ("millis", 0.001)]);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::io::Write;

    use causal_merge::CausalMerge;
    use config_loader::ConfigLoader;
    use contracts::{well_known, OrderingPolicy, StreamSet};
    use ingestion::{Normalizer, RawRecord, RawStreamSet, SyntheticStream};
    use interpolation::{InterpError, InterpolationGroup, OUT_OF_DOMAIN_FILL};
    use observability::MergeMetricsAggregator;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use serde_json::json;

    fn flight(seed: u64) -> RawStreamSet {
        let mut raw = RawStreamSet::new();
        raw.insert(
            well_known::IMU.into(),
            SyntheticStream::imu(100.0).samples(200).jitter(0.002).seed(seed).generate(),
        );
        raw.insert(
            well_known::GPS.into(),
            SyntheticStream::gps(5.0)
                .samples(10)
                .start_at(0.013)
                .jitter(0.01)
                .seed(seed + 1)
                .generate(),
        );
        raw.insert(
            well_known::AIR.into(),
            SyntheticStream::air(20.0)
                .samples(40)
                .start_at(0.004)
                .seed(seed + 2)
                .generate(),
        );
        raw.insert(
            well_known::EVENT.into(),
            SyntheticStream::event(1.0).samples(2).start_at(0.5).generate(),
        );
        raw
    }

    fn rows(value: serde_json::Value) -> Vec<RawRecord> {
        serde_json::from_value(value).unwrap()
    }

    /// 合成数据完整流程：规范化 -> 插值 -> 因果合并 -> 聚合
    #[test]
    fn test_e2e_synthetic_pipeline() {
        let normalizer = Normalizer::default();
        let streams = normalizer.normalize_set(&flight(11)).unwrap();
        assert_eq!(streams.len(), 4);
        assert_eq!(normalizer.metrics().snapshot().records_normalized, 252);

        // 插值：事件流只有文本字段
        let group = InterpolationGroup::build(&streams);
        assert_eq!(group.len(), 4);
        assert_eq!(group.get(well_known::EVENT).unwrap().field_count(), 0);
        assert!(matches!(
            group.value(well_known::EVENT, "message", 0.5),
            Err(InterpError::MissingField { .. })
        ));

        let gps = streams.get(well_known::GPS).unwrap();
        for record in gps {
            let sample = group.query(record.timestamp(), well_known::GPS).unwrap();
            for (field, value) in record.numeric_fields() {
                assert_eq!(sample.get(field), Some(value));
            }
        }

        // 因果合并
        let merge = CausalMerge::new(&streams, well_known::IMU);
        let mut aggregator = MergeMetricsAggregator::new();
        let mut count = 0;
        for composite in merge.session() {
            aggregator.update(&composite);
            count += 1;
        }
        assert_eq!(count, 200);

        let summary = aggregator.summary();
        assert_eq!(summary.total_composites, 200);
        // gps 在 0.013s 前没有数据
        assert!(summary.missing_counts.get(well_known::GPS).copied().unwrap_or(0) >= 1);
        assert!(summary.hold_age_ms[well_known::GPS].max < 250.0);
        assert!(summary.to_string().contains("Total composites: 200"));
    }

    /// 每个合成记录中，每个流都是 anchor 时间之前 (含) 的最后一条
    #[test]
    fn test_merge_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(2024);

        for _ in 0..8 {
            let seed = rng.random_range(0..10_000u64);
            let streams = Normalizer::default().normalize_set(&flight(seed)).unwrap();
            let merge = CausalMerge::new(&streams, well_known::IMU);
            let imu = streams.get(well_known::IMU).unwrap();

            let composites: Vec<_> = merge.session().collect();
            assert_eq!(composites.len(), imu.len());

            for (k, composite) in composites.iter().enumerate() {
                let t = imu[k].timestamp();
                assert_eq!(composite.t_anchor, t);

                for (name, stream) in streams.iter() {
                    if *name == well_known::IMU {
                        continue;
                    }
                    let expected = stream.iter().filter(|r| r.timestamp() <= t).last();
                    let actual = composite.get(name);
                    assert_eq!(
                        actual.map(|r| r.timestamp()),
                        expected.map(|r| r.timestamp()),
                        "seed {seed}, step {k}, stream {name}"
                    );
                    assert_eq!(actual.is_none(), composite.missing.contains(name));
                }
            }
        }
    }

    #[test]
    fn test_interpolation_out_of_domain_across_streams() {
        let streams = Normalizer::default().normalize_set(&flight(5)).unwrap();
        let group = InterpolationGroup::build(&streams);

        let air = group.get(well_known::AIR).unwrap();
        let (lo, hi) = air.domain().unwrap();
        let before = group.query(lo - 0.001, well_known::AIR).unwrap();
        let after = group.query(hi + 0.001, well_known::AIR).unwrap();
        assert!(before.values.values().all(|&v| v == OUT_OF_DOMAIN_FILL));
        assert!(after.values.values().all(|&v| v == OUT_OF_DOMAIN_FILL));
        assert_eq!(before.len(), 4);
    }

    /// 原始 JSON 行：毫秒时间戳、文本字段
    #[test]
    fn test_raw_json_rows() {
        let mut raw = RawStreamSet::new();
        raw.insert(
            "imu".into(),
            rows(json!([
                {"millis": 0, "az": -9.8},
                {"millis": 100, "az": -9.7},
                {"millis": 200, "az": -9.9},
            ])),
        );
        raw.insert(
            "air".into(),
            rows(json!([
                {"time": 0.0, "alt": 0.0},
                {"time": 10.0, "alt": 100.0},
            ])),
        );
        raw.insert(
            "event".into(),
            rows(json!([{"timestamp": 0.1, "message": "takeoff"}])),
        );

        let streams: StreamSet = Normalizer::default().normalize_set(&raw).unwrap();
        let imu = streams.get("imu").unwrap();
        assert_eq!(imu.timestamps().collect::<Vec<_>>(), vec![0.0, 0.1, 0.2]);

        let group = InterpolationGroup::build(&streams);
        assert_eq!(group.value("air", "alt", 5.0).unwrap(), 50.0);
        assert_eq!(group.value("air", "alt", -1.0).unwrap(), 0.0);
        assert_eq!(group.value("air", "alt", 11.0).unwrap(), 0.0);
        assert_eq!(group.value("air", "alt", 10.0).unwrap(), 100.0);
        assert!(matches!(
            group.query(0.1, "event"),
            Err(InterpError::UnknownGroup { .. })
        ));

        let merge = CausalMerge::new(&streams, "imu");
        let events: Vec<_> = merge
            .session()
            .map(|c| c.get("event").and_then(|r| r.text("message")))
            .collect();
        assert_eq!(events, vec![None, Some("takeoff"), Some("takeoff")]);
    }

    #[test]
    fn test_unsorted_stream_policy() {
        let mut raw = RawStreamSet::new();
        raw.insert(
            "gps".into(),
            rows(json!([
                {"timestamp": 0.4, "alt": 304.0},
                {"timestamp": 0.2, "alt": 302.0},
            ])),
        );

        assert!(Normalizer::default().normalize_set(&raw).is_err());

        let normalizer = Normalizer::new(Default::default(), OrderingPolicy::Sort);
        let streams = normalizer.normalize_set(&raw).unwrap();
        let group = InterpolationGroup::build(&streams);
        assert_eq!(group.value("gps", "alt", 0.3).unwrap(), 303.0);
    }

    /// 配置文件驱动的完整流程
    #[test]
    fn test_config_driven_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flight_sync.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(
            br#"
anchor_stream = "air"
ordering = "sort"

[interpolation]
min_samples = 11

[normalize.schemas.gps]
numeric = ["lat", "lon", "alt"]

[logging]
format = "compact"
level = "warn"
"#,
        )
        .unwrap();

        let config = ConfigLoader::load_from_path(&path).unwrap();
        let normalizer = Normalizer::from_config(&config);
        let streams = normalizer.normalize_set(&flight(3)).unwrap();

        // 声明的 schema 只保留部分字段
        let gps = streams.get(well_known::GPS).unwrap();
        assert_eq!(gps.schema().numeric_fields(), ["lat", "lon", "alt"]);

        let group = InterpolationGroup::from_config(&streams, &config.interpolation);
        assert!(group.contains(well_known::IMU));
        assert!(group.contains(well_known::AIR));
        assert!(!group.contains(well_known::GPS));

        let merge = CausalMerge::from_config(&streams, &config);
        assert_eq!(merge.size(), 40);
        let stats = {
            let mut session = merge.session();
            session.by_ref().for_each(drop);
            session.stats().clone()
        };
        assert_eq!(stats.composites, 40);
        assert_eq!(stats.consumed_for(well_known::AIR), 40);
        assert!(stats.superseded_for(well_known::IMU) > 0);
    }
}
