//! Dataset processing example
//!
//! Opens a dataset root, processes any meshes that are not cached yet, and
//! walks the resulting records with an access-time transform that centers
//! each point cloud.
//!
//! Usage:
//!   cargo run --example process_split -- <dataset_root> [split]

use dentascan_data::MeshRecord;
use dentascan_dataset::{DatasetConfig, DatasetHooks, ToothDataset};
use glam::Vec3;
use std::error::Error;
use std::path::PathBuf;
use tracing::{info, warn};

fn center(mut record: MeshRecord) -> MeshRecord {
    if record.is_empty() {
        return record;
    }
    let centroid = record.positions.iter().copied().sum::<Vec3>() / record.len() as f32;
    for p in &mut record.positions {
        *p -= centroid;
    }
    record
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let root = args
        .next()
        .map(PathBuf::from)
        .ok_or("Please provide a dataset root")?;

    let mut config = DatasetConfig::new(root).with_sample_count(4096);
    if let Some(split) = args.next() {
        config = config.with_split(split);
    }

    let hooks = DatasetHooks::new()
        .with_pre_filter(|record: &MeshRecord| record.has_segmentation())
        .with_transform(center);

    let dataset = ToothDataset::open(config, hooks)?;
    info!("{}", dataset);
    if let Some(report) = dataset.report() {
        info!("{}", report);
    }

    let mut upper = 0;
    let mut lower = 0;
    for (i, record) in dataset.iter().enumerate() {
        match record {
            Ok(record) => match record.jaw.as_str() {
                "upper" => upper += 1,
                "lower" => lower += 1,
                other => warn!("Record {} has unexpected jaw '{}'", i, other),
            },
            Err(e) => warn!("Record {} unavailable: {}", i, e),
        }
    }
    info!("{} upper and {} lower jaws available", upper, lower);

    Ok(())
}
