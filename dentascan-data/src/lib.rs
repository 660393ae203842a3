//! Dentascan Data Crate
//!
//! Geometry and annotation layer for intra-oral scan datasets: mesh loading,
//! point subsampling, and parsing of the segmentation and landmark files that
//! sit next to each mesh. This crate knows nothing about dataset layout or
//! caching; that lives in `dentascan-dataset`.

pub mod annotations;
pub mod mesh;
pub mod sampling;
pub mod types;

pub use annotations::{
    AnnotationError, SegmentationAnnotation, jaw_from_path, landmark_path, load_landmarks,
    load_segmentation, segmentation_path,
};
pub use mesh::{
    MeshError, TriMesh, compute_vertex_normals, first_geometry, load_geometries, load_mesh,
};
pub use sampling::{
    DEFAULT_BUCKET_HEIGHT, DEFAULT_SAMPLE_COUNT, SamplingConfig, SamplingError, bucket_fps,
    ensure_sample_count, sample_indices, sample_with_replacement,
};
pub use types::{LandmarkKind, Landmarks, MeshRecord};
