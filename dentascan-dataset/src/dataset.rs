//! The cached dataset: manifest identifiers backed by one processed record each.

use crate::cache::RecordCache;
use crate::config::DatasetConfig;
use crate::error::{DatasetError, ProcessError};
use crate::manifest::{cache_key, load_identifiers};
use crate::processor::{MeshSampleProcessor, RecordFilter, RecordTransform};
use crate::remote::raw_data_present;
use crate::resolve::{MeshIndex, Resolution};
use dentascan_data::MeshRecord;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Optional user hooks.
///
/// `pre_filter` and `pre_transform` run once, before a record is cached.
/// `transform` runs on every [`ToothDataset::get`].
#[derive(Default)]
pub struct DatasetHooks {
    pre_filter: Option<Box<dyn RecordFilter>>,
    pre_transform: Option<Box<dyn RecordTransform>>,
    transform: Option<Box<dyn RecordTransform>>,
}

impl DatasetHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pre_filter(mut self, filter: impl RecordFilter + 'static) -> Self {
        self.pre_filter = Some(Box::new(filter));
        self
    }

    pub fn with_pre_transform(mut self, transform: impl RecordTransform + 'static) -> Self {
        self.pre_transform = Some(Box::new(transform));
        self
    }

    pub fn with_transform(mut self, transform: impl RecordTransform + 'static) -> Self {
        self.transform = Some(Box::new(transform));
        self
    }
}

/// A mesh that could not be turned into a record.
#[derive(Debug)]
pub struct FailedEntry {
    pub identifier: String,
    pub path: PathBuf,
    pub error: ProcessError,
}

/// Outcome of one processing pass.
#[derive(Debug, Default)]
pub struct ProcessReport {
    pub total: usize,
    /// Entries already cached and left untouched.
    pub cached: usize,
    /// Repeated manifest identifiers, handled by their first occurrence.
    pub duplicates: usize,
    pub processed: usize,
    /// Entries rejected by the pre-filter; nothing is cached for them.
    pub filtered: usize,
    pub skipped_missing: usize,
    pub skipped_ambiguous: usize,
    pub failed: Vec<FailedEntry>,
}

impl ProcessReport {
    /// Number of identifiers that have no cache entry after this pass.
    pub fn uncached(&self) -> usize {
        self.filtered + self.skipped_missing + self.skipped_ambiguous + self.failed.len()
    }
}

impl fmt::Display for ProcessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entries: {} processed, {} cached, {} duplicate, {} filtered, {} missing, {} ambiguous, {} failed",
            self.total,
            self.processed,
            self.cached,
            self.duplicates,
            self.filtered,
            self.skipped_missing,
            self.skipped_ambiguous,
            self.failed.len()
        )
    }
}

/// One split and mode of a Teeth3DS-style collection, processed into a record cache.
pub struct ToothDataset {
    config: DatasetConfig,
    identifiers: Vec<String>,
    cache: RecordCache,
    processor: MeshSampleProcessor,
    transform: Option<Box<dyn RecordTransform>>,
    report: Option<ProcessReport>,
}

impl ToothDataset {
    /// Open a dataset, processing every entry that is not cached yet
    /// (or every entry when `force_reload` is set).
    pub fn open(config: DatasetConfig, hooks: DatasetHooks) -> Result<Self, DatasetError> {
        let mut dataset = Self::load(config, hooks)?;
        if dataset.needs_processing() {
            let report = dataset.process()?;
            info!("{}", report);
            dataset.report = Some(report);
        }
        Ok(dataset)
    }

    /// Open a dataset without processing anything.
    pub fn load(config: DatasetConfig, hooks: DatasetHooks) -> Result<Self, DatasetError> {
        if !raw_data_present(&config) {
            return Err(DatasetError::RawDataMissing(config.raw_dir()));
        }
        let identifiers = load_identifiers(&config)?;
        let cache = RecordCache::create(config.processed_dir())?;

        let mut processor = MeshSampleProcessor::new(config.sampling);
        processor.set_pre_filter(hooks.pre_filter);
        processor.set_pre_transform(hooks.pre_transform);

        info!(
            "Opened {} {} split with {} identifiers",
            config.split,
            config.mode,
            identifiers.len()
        );
        Ok(Self {
            config,
            identifiers,
            cache,
            processor,
            transform: hooks.transform,
            report: None,
        })
    }

    /// Whether [`process`](Self::process) would do any work.
    pub fn needs_processing(&self) -> bool {
        self.config.force_reload
            || self
                .identifiers
                .iter()
                .any(|id| !self.cache.contains(cache_key(id)))
    }

    /// Process every identifier without a cache entry, or all of them when
    /// `force_reload` is set.
    ///
    /// Per-mesh failures are logged and reported; they do not stop the pass.
    pub fn process(&mut self) -> Result<ProcessReport, DatasetError> {
        let mut report = ProcessReport {
            total: self.identifiers.len(),
            ..Default::default()
        };

        let mut pending = Vec::new();
        let mut seen = HashSet::new();
        for identifier in &self.identifiers {
            let key = cache_key(identifier);
            if !seen.insert(key) {
                report.duplicates += 1;
            } else if !self.config.force_reload && self.cache.contains(key) {
                report.cached += 1;
            } else {
                pending.push(identifier.clone());
            }
        }
        if pending.is_empty() {
            return Ok(report);
        }

        let index = MeshIndex::scan(&self.config.raw_dir(), &self.config.mesh_extension)?;

        let pb = ProgressBar::new(pending.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.cyan/blue}] {pos}/{len} meshes ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb.set_message("Processing meshes");

        for identifier in pending {
            let key = cache_key(&identifier).to_owned();
            match index.resolve(&key) {
                Resolution::Missing => {
                    warn!("No mesh found for {}, skipping", identifier);
                    report.skipped_missing += 1;
                }
                Resolution::Ambiguous(paths) => {
                    warn!(
                        "{} matches {} meshes, skipping",
                        identifier,
                        paths.len()
                    );
                    report.skipped_ambiguous += 1;
                }
                Resolution::Unique(path) => match self.processor.process(&path) {
                    Ok(Some(record)) => {
                        self.cache.store(&key, &record)?;
                        report.processed += 1;
                    }
                    Ok(None) => {
                        // A stale entry from an earlier pass must not outlive the filter.
                        self.cache.remove(&key)?;
                        report.filtered += 1;
                    }
                    Err(e) => {
                        error!("Failed to process {}: {}", identifier, e);
                        report.failed.push(FailedEntry {
                            identifier: identifier.clone(),
                            path,
                            error: e,
                        });
                    }
                },
            }
            pb.inc(1);
        }

        pb.finish_with_message("Meshes processed");
        Ok(report)
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    /// Load the record at `index` and apply the access-time transform.
    pub fn get(&self, index: usize) -> Result<MeshRecord, DatasetError> {
        let identifier = self
            .identifiers
            .get(index)
            .ok_or(DatasetError::IndexOutOfRange {
                index,
                len: self.identifiers.len(),
            })?;
        let record = self.cache.load(cache_key(identifier))?;
        Ok(match &self.transform {
            Some(transform) => transform.apply(record),
            None => record,
        })
    }

    /// Records in manifest order.
    pub fn iter(&self) -> impl Iterator<Item = Result<MeshRecord, DatasetError>> + '_ {
        (0..self.len()).map(|i| self.get(i))
    }

    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn cache(&self) -> &RecordCache {
        &self.cache
    }

    /// Report of the processing pass run by [`open`](Self::open), if any.
    pub fn report(&self) -> Option<&ProcessReport> {
        self.report.as_ref()
    }
}

impl fmt::Display for ToothDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Teeth3DS({}, mode={}, split={})",
            self.len(),
            self.config.mode,
            self.config.split
        )
    }
}
