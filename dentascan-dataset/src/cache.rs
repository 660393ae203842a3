//! On-disk record cache, one JSON file per mesh identifier.

use crate::error::DatasetError;
use dentascan_data::MeshRecord;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A directory of serialized [`MeshRecord`]s keyed by identifier.
#[derive(Debug, Clone)]
pub struct RecordCache {
    dir: PathBuf,
}

impl RecordCache {
    /// Wrap an existing or future cache directory without touching the disk.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Open a cache directory, creating it if needed.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, DatasetError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(DatasetError::io(&dir))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entry_path(key).is_file()
    }

    /// Persist a record. The entry is written to a temporary file first and
    /// renamed into place, so readers never see a partial entry.
    pub fn store(&self, key: &str, record: &MeshRecord) -> Result<PathBuf, DatasetError> {
        let path = self.entry_path(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));

        let file = File::create(&tmp).map_err(DatasetError::io(&tmp))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, record).map_err(|source| {
            DatasetError::CacheEncode {
                path: path.clone(),
                source,
            }
        })?;
        writer.flush().map_err(DatasetError::io(&tmp))?;
        drop(writer);

        fs::rename(&tmp, &path).map_err(DatasetError::io(&path))?;
        debug!("Cached {} points at {}", record.len(), path.display());
        Ok(path)
    }

    /// Read a record back.
    pub fn load(&self, key: &str) -> Result<MeshRecord, DatasetError> {
        let path = self.entry_path(key);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DatasetError::CacheEntryMissing {
                    key: key.to_owned(),
                    path,
                });
            }
            Err(source) => return Err(DatasetError::Io { path, source }),
        };
        serde_json::from_reader(BufReader::new(file))
            .map_err(|source| DatasetError::CorruptCacheEntry { path, source })
    }

    /// Delete an entry. Returns whether one existed.
    pub fn remove(&self, key: &str) -> Result<bool, DatasetError> {
        let path = self.entry_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(DatasetError::Io { path, source }),
        }
    }
}
