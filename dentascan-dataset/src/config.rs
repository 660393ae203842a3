//! Dataset configuration.
//!
//! Fixed when the dataset is constructed and passed by reference to everything
//! that needs it.

use dentascan_data::SamplingConfig;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default split name.
pub const DEFAULT_SPLIT: &str = "Teeth3DS";

/// Default mesh file extension.
pub const DEFAULT_MESH_EXTENSION: &str = "obj";

/// Which half of a split to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Training,
    Testing,
}

impl Mode {
    pub fn from_is_train(is_train: bool) -> Self {
        if is_train { Mode::Training } else { Mode::Testing }
    }

    /// Name used in manifest file prefixes and cache directory names.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Training => "training",
            Mode::Testing => "testing",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to locate, process and cache one split/mode of the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetConfig {
    /// Dataset root; raw data lives in `root/raw`.
    pub root: PathBuf,
    /// Split name, e.g. `Teeth3DS`, `3DTeethSeg22_challenge` or `3DTeethLand_challenge`.
    pub split: String,
    pub mode: Mode,
    pub sampling: SamplingConfig,
    /// Reprocess every entry even if it is already cached.
    pub force_reload: bool,
    /// Extension of the mesh files to look up (without the dot).
    pub mesh_extension: String,
}

impl DatasetConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            split: DEFAULT_SPLIT.to_string(),
            mode: Mode::Training,
            sampling: SamplingConfig::default(),
            force_reload: false,
            mesh_extension: DEFAULT_MESH_EXTENSION.to_string(),
        }
    }

    pub fn with_split(mut self, split: impl Into<String>) -> Self {
        self.split = split.into();
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_sample_count(mut self, sample_count: usize) -> Self {
        self.sampling.sample_count = sample_count;
        self
    }

    pub fn with_force_reload(mut self, force_reload: bool) -> Self {
        self.force_reload = force_reload;
        self
    }

    pub fn with_mesh_extension(mut self, extension: impl Into<String>) -> Self {
        self.mesh_extension = extension.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.root.join("raw")
    }

    /// Cache directory, scoped by split and mode.
    pub fn processed_dir(&self) -> PathBuf {
        self.root
            .join(format!("processed_{}_{}", self.split, self.mode))
    }

    /// Directory holding the train/test manifest files for this split.
    pub fn split_dir(&self) -> PathBuf {
        self.raw_dir()
            .join(format!("{}_train_test_split", self.split))
    }
}
