//! Triangle mesh loading.
//!
//! Vertex order is preserved from the source file, since per-vertex
//! annotation arrays index the raw vertex list. Every loaded mesh carries one
//! normal per vertex, taken from the file when available and computed from the
//! faces otherwise.

mod normals;
mod wavefront;
mod ply;

pub use normals::compute_vertex_normals;

use glam::Vec3;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that make a mesh file unusable.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("failed to open mesh {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse OBJ {}: {message}", .path.display())]
    Obj { path: PathBuf, message: String },

    #[error("failed to parse PLY {}: {message}", .path.display())]
    Ply { path: PathBuf, message: String },

    #[error("mesh {} is missing '{property}' at vertex {index}", .path.display())]
    MissingProperty {
        path: PathBuf,
        property: &'static str,
        index: usize,
    },

    #[error(
        "face {face} in {} references vertex {vertex}, but the mesh has {vertex_count} vertices",
        .path.display()
    )]
    FaceIndexOutOfRange {
        path: PathBuf,
        face: usize,
        vertex: i64,
        vertex_count: usize,
    },

    #[error("unsupported mesh format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("mesh {} contains no geometry", .0.display())]
    NoGeometry(PathBuf),

    #[error("mesh {} has no vertices", .0.display())]
    EmptyMesh(PathBuf),
}

/// An indexed triangle mesh with one normal per vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub faces: Vec<[u32; 3]>,
}

impl TriMesh {
    /// Build a mesh and compute its vertex normals from the faces.
    pub fn from_faces(positions: Vec<Vec3>, faces: Vec<[u32; 3]>) -> Self {
        let normals = compute_vertex_normals(&positions, &faces);
        Self {
            positions,
            normals,
            faces,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Load every geometry stored in a mesh file, in load order.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_geometries(path: &Path) -> Result<Vec<TriMesh>, MeshError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let geometries = match extension.as_deref() {
        Some("obj") => wavefront::load_obj(path)?,
        Some("ply") => ply::load_ply(path)?,
        _ => return Err(MeshError::UnsupportedFormat(path.to_path_buf())),
    };

    for mesh in &geometries {
        info!(
            "Mesh loaded: {} vertices, {} faces",
            mesh.vertex_count(),
            mesh.face_count()
        );
    }
    Ok(geometries)
}

/// Load a single mesh. When a file holds several geometries the first one is
/// kept and the rest are dropped.
pub fn load_mesh(path: &Path) -> Result<TriMesh, MeshError> {
    first_geometry(path, load_geometries(path)?)
}

/// Keep the first of `geometries` loaded from `path`, warning about the rest.
pub fn first_geometry(path: &Path, geometries: Vec<TriMesh>) -> Result<TriMesh, MeshError> {
    let mut geometries = geometries.into_iter();
    let mesh = geometries
        .next()
        .ok_or_else(|| MeshError::NoGeometry(path.to_path_buf()))?;

    let discarded = geometries.count();
    if discarded > 0 {
        warn!(
            "{} holds {} geometries, keeping the first",
            path.display(),
            discarded + 1
        );
    }

    if mesh.is_empty() {
        return Err(MeshError::EmptyMesh(path.to_path_buf()));
    }
    Ok(mesh)
}
