//! Train/test manifest discovery.
//!
//! Each split ships a directory of plain-text manifests, one mesh identifier
//! per line. Files whose names start with the mode (`training*.txt`,
//! `testing*.txt`) are concatenated in file-name order to form the dataset's
//! identifier list. Duplicates are kept.

use crate::config::DatasetConfig;
use crate::error::DatasetError;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Manifest files for the configured split and mode, sorted by file name.
pub fn manifest_files(config: &DatasetConfig) -> Result<Vec<PathBuf>, DatasetError> {
    let dir = config.split_dir();
    if !dir.is_dir() {
        return Err(DatasetError::SplitDirMissing(dir));
    }

    let prefix = config.mode.as_str();
    let mut files = Vec::new();
    for entry in fs::read_dir(&dir).map_err(DatasetError::io(&dir))? {
        let entry = entry.map_err(DatasetError::io(&dir))?;
        let path = entry.path();
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(prefix) && name.ends_with(".txt"));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    debug!(
        "Found {} {} manifest(s) in {}",
        files.len(),
        prefix,
        dir.display()
    );
    Ok(files)
}

/// Concatenate the identifiers listed in `files`, in order.
///
/// Lines are trimmed and blank lines dropped.
pub fn read_identifiers(files: &[PathBuf]) -> Result<Vec<String>, DatasetError> {
    let mut identifiers = Vec::new();
    for file in files {
        let contents = fs::read_to_string(file).map_err(DatasetError::io(file))?;
        identifiers.extend(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_owned),
        );
    }
    Ok(identifiers)
}

/// Identifiers for the configured split and mode.
pub fn load_identifiers(config: &DatasetConfig) -> Result<Vec<String>, DatasetError> {
    read_identifiers(&manifest_files(config)?)
}

/// Cache key and mesh lookup name for an identifier: everything before the first `.`.
pub fn cache_key(identifier: &str) -> &str {
    identifier.split('.').next().unwrap_or(identifier)
}
