//! Dentascan dataset driver
//!
//! Turns a Teeth3DS-style collection of intraoral scans into a cache of
//! fixed-size point records, one per manifest identifier.
//!
//! ## Modules
//!
//! - [`config`]: dataset root, split, mode and sampling settings
//! - [`manifest`]: train/test manifest discovery
//! - [`resolve`]: locating the mesh file for an identifier
//! - [`processor`]: one mesh file to one [`MeshRecord`](dentascan_data::MeshRecord)
//! - [`cache`]: on-disk record storage
//! - [`dataset`]: batch processing and indexed access
//! - [`remote`]: the published archive catalogue

pub mod cache;
pub mod config;
pub mod dataset;
pub mod error;
pub mod manifest;
pub mod processor;
pub mod remote;
pub mod resolve;

pub use cache::RecordCache;
pub use config::{DEFAULT_MESH_EXTENSION, DEFAULT_SPLIT, DatasetConfig, Mode};
pub use dataset::{DatasetHooks, FailedEntry, ProcessReport, ToothDataset};
pub use error::{DatasetError, ProcessError};
pub use manifest::{cache_key, load_identifiers, manifest_files, read_identifiers};
pub use processor::{MeshSampleProcessor, RecordFilter, RecordTransform, sample_mesh};
pub use remote::{
    ArchiveKind, DATA_ARCHIVES, LANDMARK_ARCHIVES, RAW_MARKER, RemoteArchive, archives,
    raw_data_present,
};
pub use resolve::{MeshIndex, Resolution, resolve_mesh};
