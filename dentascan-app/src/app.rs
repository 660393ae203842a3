//! Subcommand handlers.

use crate::errors::AppError;
use crate::{Command, DatasetArgs};
use dentascan_data::{LandmarkKind, MeshRecord, SamplingConfig};
use dentascan_dataset::{
    DatasetConfig, DatasetHooks, MeshSampleProcessor, Mode, ToothDataset, archives,
};
use glam::Vec3;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

pub fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .init();
}

pub fn run(command: Command) -> Result<(), AppError> {
    match command {
        Command::Process {
            dataset,
            samples,
            seed,
            force,
        } => {
            let mut sampling = SamplingConfig::new(samples);
            sampling.seed = seed;
            let config = dataset_config(dataset)
                .with_sampling(sampling)
                .with_force_reload(force);
            process(config)
        }
        Command::Inspect { dataset, index } => inspect(dataset_config(dataset), index),
        Command::Sample {
            mesh,
            samples,
            seed,
            out,
        } => {
            let mut sampling = SamplingConfig::new(samples);
            sampling.seed = seed;
            sample(mesh, sampling, out)
        }
        Command::Archives => {
            list_archives();
            Ok(())
        }
    }
}

fn dataset_config(args: DatasetArgs) -> DatasetConfig {
    DatasetConfig::new(args.root)
        .with_split(args.split)
        .with_mode(Mode::from_is_train(!args.test))
}

fn process(config: DatasetConfig) -> Result<(), AppError> {
    let mut dataset = ToothDataset::load(config, DatasetHooks::new())?;
    let report = dataset.process()?;

    println!("{}", dataset);
    println!("{}", report);
    for failed in &report.failed {
        println!("  failed {}: {}", failed.identifier, failed.error);
    }
    Ok(())
}

fn inspect(config: DatasetConfig, index: usize) -> Result<(), AppError> {
    let dataset = ToothDataset::load(config, DatasetHooks::new())?;
    let record = dataset.get(index)?;

    println!("{}", dataset);
    println!("[{}] {}", index, dataset.identifiers()[index]);
    print_record(&record);
    Ok(())
}

fn sample(mesh: PathBuf, sampling: SamplingConfig, out: Option<PathBuf>) -> Result<(), AppError> {
    let mut processor = MeshSampleProcessor::new(sampling);
    let record = processor
        .process(&mesh)?
        .ok_or_else(|| AppError::Rejected(mesh.clone()))?;

    println!("{}", mesh.display());
    print_record(&record);

    if let Some(path) = out {
        let output_error = |source| AppError::Output {
            path: path.clone(),
            source,
        };
        let file = File::create(&path).map_err(output_error)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &record)?;
        writer.flush().map_err(output_error)?;
        info!("Record written to {}", path.display());
    }
    Ok(())
}

fn list_archives() {
    for archive in archives() {
        println!("{:<34} {:<10} {}", archive.name, archive.kind, archive.url);
    }
}

fn print_record(record: &MeshRecord) {
    let (min, max) = record.positions.iter().fold(
        (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
        |(min, max), p| (min.min(*p), max.max(*p)),
    );

    println!("  jaw:       {}", record.jaw);
    println!("  points:    {}", record.len());
    println!("  bounds:    {:?} .. {:?}", min, max);
    if record.has_segmentation() {
        let mut teeth: Vec<i32> = record.segmentation_labels.clone();
        teeth.sort_unstable();
        teeth.dedup();
        println!("  labels:    {:?}", teeth);
    } else {
        println!("  labels:    none");
    }
    for kind in LandmarkKind::ALL {
        let group = record.landmarks.group(kind);
        if !group.is_empty() {
            println!("  {:<12} {}", format!("{}:", kind), group.len());
        }
    }
}
