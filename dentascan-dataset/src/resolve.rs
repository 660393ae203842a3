//! Locating mesh files for manifest identifiers.
//!
//! A mesh for identifier `ID` is any file exactly two directories below the
//! raw directory (`raw/<a>/<b>/*ID.<extension>`). Exactly one
//! match is required; zero or several matches mean the identifier is skipped.

use crate::error::DatasetError;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Walk depth of mesh files: `raw/<a>/<b>/<file>`.
const MESH_DEPTH: usize = 3;

/// Outcome of looking up one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Unique(PathBuf),
    Missing,
    Ambiguous(Vec<PathBuf>),
}

/// Every candidate mesh file under a raw directory, scanned once.
#[derive(Debug, Clone, Default)]
pub struct MeshIndex {
    files: Vec<(String, PathBuf)>,
    extension: String,
}

impl MeshIndex {
    /// Walk `raw_dir` and collect files with the given extension.
    pub fn scan(raw_dir: &Path, extension: &str) -> Result<Self, DatasetError> {
        let suffix = format!(".{extension}");
        let mut files = Vec::new();
        for entry in WalkDir::new(raw_dir)
            .min_depth(MESH_DEPTH)
            .max_depth(MESH_DEPTH)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| DatasetError::Io {
                path: e.path().map(Path::to_path_buf).unwrap_or_else(|| raw_dir.to_path_buf()),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(&suffix) {
                    files.push((name.to_owned(), entry.into_path()));
                }
            }
        }

        debug!(
            "Indexed {} {} file(s) under {}",
            files.len(),
            suffix,
            raw_dir.display()
        );
        Ok(Self {
            files,
            extension: extension.to_owned(),
        })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Find the mesh file for `identifier`.
    pub fn resolve(&self, identifier: &str) -> Resolution {
        let wanted = format!("{identifier}.{}", self.extension);
        let mut matches: Vec<PathBuf> = self
            .files
            .iter()
            .filter(|(name, _)| name.ends_with(&wanted))
            .map(|(_, path)| path.clone())
            .collect();

        match matches.len() {
            0 => Resolution::Missing,
            1 => Resolution::Unique(matches.remove(0)),
            _ => Resolution::Ambiguous(matches),
        }
    }
}

/// One-off lookup; prefer [`MeshIndex`] when resolving many identifiers.
pub fn resolve_mesh(
    raw_dir: &Path,
    identifier: &str,
    extension: &str,
) -> Result<Resolution, DatasetError> {
    Ok(MeshIndex::scan(raw_dir, extension)?.resolve(identifier))
}
