//! Single mesh sampling example
//!
//! Loads one scan, samples a fixed number of points with their normals and
//! labels, and logs what came out.
//!
//! Usage:
//!   cargo run --example sample_mesh -- <path_to_mesh> [sample_count]

use dentascan_data::{DEFAULT_SAMPLE_COUNT, LandmarkKind, SamplingConfig, load_mesh};
use dentascan_dataset::MeshSampleProcessor;
use glam::Vec3;
use std::error::Error;
use std::path::PathBuf;
use tracing::info;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let mesh_path = args
        .next()
        .map(PathBuf::from)
        .ok_or("Please provide a mesh file path")?;
    let sample_count = match args.next() {
        Some(n) => n.parse()?,
        None => DEFAULT_SAMPLE_COUNT,
    };

    let mesh = load_mesh(&mesh_path)?;
    info!(
        "Mesh has {} vertices and {} faces",
        mesh.vertex_count(),
        mesh.face_count()
    );
    if mesh.vertex_count() < sample_count {
        info!("Fewer vertices than samples, drawing with replacement");
    }

    let mut processor = MeshSampleProcessor::new(SamplingConfig::new(sample_count).with_seed(0));
    let Some(record) = processor.process(&mesh_path)? else {
        return Ok(());
    };

    let centroid = record.positions.iter().copied().sum::<Vec3>() / record.len() as f32;
    info!("Sampled {} points on the {} jaw", record.len(), record.jaw);
    info!("Sample centroid: {:?}", centroid);

    if record.has_segmentation() {
        let gingiva = record
            .segmentation_labels
            .iter()
            .filter(|&&label| label == 0)
            .count();
        info!(
            "{} sampled points on gingiva, {} on teeth",
            gingiva,
            record.len() - gingiva
        );
    } else {
        info!("No segmentation annotation next to the mesh");
    }

    for kind in LandmarkKind::ALL {
        let group = record.landmarks.group(kind);
        if !group.is_empty() {
            info!("{} landmarks: {}", kind, group.len());
        }
    }

    Ok(())
}
