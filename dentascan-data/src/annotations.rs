//! Sibling annotation files of a scan mesh.
//!
//! A mesh `X.obj` may be accompanied by:
//! - `X.json`: per-vertex tooth `labels` and `instances`
//! - `X__kpt.json`: landmark keypoints tagged with a class
//!
//! Both are optional. A missing file yields empty annotations, never an error.

use crate::types::{LandmarkKind, Landmarks};
use glam::Vec3;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors raised while reading annotation files.
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("failed to read annotation {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid annotation JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unknown landmark class '{class}' in {}", .path.display())]
    UnknownLandmarkClass { path: PathBuf, class: String },

    #[error(
        "segmentation has {labels} labels and {instances} instances for a mesh with {vertices} vertices"
    )]
    LengthMismatch {
        labels: usize,
        instances: usize,
        vertices: usize,
    },

    #[error("no jaw token in file name {}", .0.display())]
    MissingJawToken(PathBuf),
}

/// Per-vertex segmentation annotation. Unknown JSON fields are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SegmentationAnnotation {
    pub labels: Vec<i32>,
    pub instances: Vec<i32>,
}

impl SegmentationAnnotation {
    /// Reindex labels and instances by the sampled vertex indices.
    ///
    /// Both arrays must hold exactly one entry per mesh vertex.
    pub fn gather(
        &self,
        indices: &[usize],
        vertex_count: usize,
    ) -> Result<(Vec<i32>, Vec<i32>), AnnotationError> {
        if self.labels.len() != vertex_count || self.instances.len() != vertex_count {
            return Err(AnnotationError::LengthMismatch {
                labels: self.labels.len(),
                instances: self.instances.len(),
                vertices: vertex_count,
            });
        }
        let labels = indices.iter().map(|&i| self.labels[i]).collect();
        let instances = indices.iter().map(|&i| self.instances[i]).collect();
        Ok((labels, instances))
    }
}

#[derive(Debug, Deserialize)]
struct LandmarkFile {
    objects: Vec<LandmarkEntry>,
}

#[derive(Debug, Deserialize)]
struct LandmarkEntry {
    class: String,
    coord: [f32; 3],
}

/// Path of the segmentation annotation for a mesh: same name, `.json` extension.
pub fn segmentation_path(mesh_path: &Path) -> PathBuf {
    mesh_path.with_extension("json")
}

/// Path of the landmark annotation for a mesh: `<stem>__kpt.json` alongside it.
pub fn landmark_path(mesh_path: &Path) -> PathBuf {
    let stem = mesh_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    mesh_path.with_file_name(format!("{stem}__kpt.json"))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>, AnnotationError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(AnnotationError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_reader(BufReader::new(file))
        .map(Some)
        .map_err(|source| AnnotationError::Json {
            path: path.to_path_buf(),
            source,
        })
}

/// Load a segmentation annotation, or `None` if the file does not exist.
pub fn load_segmentation(path: &Path) -> Result<Option<SegmentationAnnotation>, AnnotationError> {
    let annotation = read_json::<SegmentationAnnotation>(path)?;
    if annotation.is_none() {
        debug!("No segmentation annotation at {}", path.display());
    }
    Ok(annotation)
}

/// Load landmark keypoints grouped by class, preserving file order per group.
///
/// A missing file gives empty groups. An unrecognised class tag rejects the
/// whole file.
pub fn load_landmarks(path: &Path) -> Result<Landmarks, AnnotationError> {
    let Some(file) = read_json::<LandmarkFile>(path)? else {
        debug!("No landmark annotation at {}", path.display());
        return Ok(Landmarks::default());
    };

    let mut landmarks = Landmarks::default();
    for entry in file.objects {
        let kind = LandmarkKind::from_tag(&entry.class).ok_or_else(|| {
            AnnotationError::UnknownLandmarkClass {
                path: path.to_path_buf(),
                class: entry.class.clone(),
            }
        })?;
        landmarks.push(kind, Vec3::from_array(entry.coord));
    }

    debug!(
        "Loaded {} landmarks from {}",
        landmarks.total(),
        path.display()
    );
    Ok(landmarks)
}

/// Jaw token of a scan: the second `_`-separated segment of the file stem.
///
/// `patient007_upper_scan.obj` gives `upper`.
pub fn jaw_from_path(path: &Path) -> Result<String, AnnotationError> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.split('_').nth(1))
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| AnnotationError::MissingJawToken(path.to_path_buf()))
}
