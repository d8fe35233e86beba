//! Synthetic Flight Example
//!
//! Generates jittered IMU / GPS / air-data / event streams, normalizes them,
//! interpolates GPS onto a fixed grid and runs the causal merge over the IMU
//! cadence.
//!
//! Run with: cargo run -p demos --bin synthetic_flight [-- demos/flight_sync.toml]

use std::path::Path;

use anyhow::Context;
use causal_merge::CausalMerge;
use config_loader::ConfigLoader;
use contracts::{well_known, FlightSyncConfig};
use ingestion::{Normalizer, RawStreamSet, SyntheticStream};
use interpolation::InterpolationGroup;
use observability::MergeMetricsAggregator;

fn main() -> anyhow::Result<()> {
    // ==== Stage 1: Config ====
    let config = match std::env::args().nth(1) {
        Some(path) => ConfigLoader::load_from_path(Path::new(&path))
            .with_context(|| format!("Failed to load config from {path}"))?,
        None => FlightSyncConfig::default(),
    };

    observability::init_with_config(&config.logging)?;
    tracing::info!(anchor = %config.anchor_stream, "Starting synthetic flight demo");

    // ==== Stage 2: Raw streams ====
    let mut raw = RawStreamSet::new();
    raw.insert(
        well_known::IMU.into(),
        SyntheticStream::imu(100.0).samples(500).jitter(0.001).seed(1).generate(),
    );
    raw.insert(
        well_known::GPS.into(),
        SyntheticStream::gps(5.0).samples(25).start_at(0.02).jitter(0.01).seed(2).generate(),
    );
    raw.insert(
        well_known::AIR.into(),
        SyntheticStream::air(25.0).samples(125).start_at(0.005).seed(3).generate(),
    );
    raw.insert(
        well_known::EVENT.into(),
        SyntheticStream::event(0.5).samples(3).start_at(0.5).generate(),
    );

    // ==== Stage 3: Normalize ====
    let normalizer = Normalizer::from_config(&config);
    let streams = normalizer.normalize_set(&raw)?;
    tracing::info!(
        streams = streams.len(),
        records = streams.total_records(),
        "Streams normalized"
    );

    // ==== Stage 4: Interpolate ====
    let group = InterpolationGroup::from_config(&streams, &config.interpolation);
    for step in 0..5 {
        let t = step as f64;
        let sample = group.query(t, well_known::GPS)?;
        println!("{}", serde_json::to_string(&sample)?);
    }

    // ==== Stage 5: Causal merge ====
    let merge = CausalMerge::from_config(&streams, &config);
    let mut aggregator = MergeMetricsAggregator::new();
    let mut session = merge.session();
    for composite in session.by_ref() {
        aggregator.update(&composite);
    }

    tracing::info!(
        composites = session.stats().composites,
        consumed = session.stats().total_consumed(),
        "Causal merge finished"
    );
    println!("{}", aggregator.summary());

    Ok(())
}
