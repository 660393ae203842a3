//! Catalogue of the published dataset archives.
//!
//! Fetching and unpacking is left to the user. Every archive extracts into
//! the raw directory; the mesh parts also carry `license.txt`, whose presence
//! marks the raw data as available.

use crate::config::DatasetConfig;
use std::fmt;

/// File whose presence in the raw directory marks extracted data.
pub const RAW_MARKER: &str = "license.txt";

/// What an archive contributes to the raw directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Meshes,
    Splits,
    Landmarks,
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArchiveKind::Meshes => "meshes",
            ArchiveKind::Splits => "splits",
            ArchiveKind::Landmarks => "landmarks",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteArchive {
    pub name: &'static str,
    pub url: &'static str,
    pub kind: ArchiveKind,
}

impl RemoteArchive {
    const fn new(name: &'static str, url: &'static str, kind: ArchiveKind) -> Self {
        Self { name, url, kind }
    }
}

/// Mesh parts and split manifests, in download order.
pub static DATA_ARCHIVES: [RemoteArchive; 8] = [
    RemoteArchive::new("data_part_1.zip", "https://osf.io/download/qhprs/", ArchiveKind::Meshes),
    RemoteArchive::new("data_part_2.zip", "https://osf.io/download/4pwnr/", ArchiveKind::Meshes),
    RemoteArchive::new("data_part_3.zip", "https://osf.io/download/frwdp/", ArchiveKind::Meshes),
    RemoteArchive::new("data_part_4.zip", "https://osf.io/download/2arn4/", ArchiveKind::Meshes),
    RemoteArchive::new("data_part_5.zip", "https://osf.io/download/xrz5f/", ArchiveKind::Meshes),
    RemoteArchive::new("data_part_6.zip", "https://osf.io/download/23hgq/", ArchiveKind::Meshes),
    RemoteArchive::new("data_part_7.zip", "https://osf.io/download/u83ad/", ArchiveKind::Meshes),
    RemoteArchive::new(
        "train_test_split",
        "https://files.de-1.osf.io/v1/resources/xctdy/providers/osfstorage/?zip=",
        ArchiveKind::Splits,
    ),
];

pub static LANDMARK_ARCHIVES: [RemoteArchive; 2] = [
    RemoteArchive::new(
        "3DTeethLand_landmarks_train.zip",
        "https://osf.io/download/k5hbj/",
        ArchiveKind::Landmarks,
    ),
    RemoteArchive::new(
        "3DTeethLand_landmarks_test.zip",
        "https://osf.io/download/sqw5e/",
        ArchiveKind::Landmarks,
    ),
];

/// Every archive, data first.
pub fn archives() -> impl Iterator<Item = &'static RemoteArchive> {
    DATA_ARCHIVES.iter().chain(LANDMARK_ARCHIVES.iter())
}

/// Whether the raw directory holds extracted data.
pub fn raw_data_present(config: &DatasetConfig) -> bool {
    config.raw_dir().join(RAW_MARKER).is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;

    #[test]
    fn test_catalogue_names_are_unique() {
        let names: HashSet<_> = archives().map(|a| a.name).collect();
        assert_eq!(names.len(), 10);
        assert_eq!(
            archives().filter(|a| a.kind == ArchiveKind::Meshes).count(),
            7
        );
        assert!(archives().all(|a| a.url.starts_with("https://")));
    }

    #[test]
    fn test_raw_marker_detection() {
        let root = std::env::temp_dir().join(format!(
            "dentascan-remote-marker-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&root);
        let config = DatasetConfig::new(&root);
        assert!(!raw_data_present(&config));

        fs::create_dir_all(config.raw_dir()).unwrap();
        fs::write(config.raw_dir().join(RAW_MARKER), "CC BY-NC-ND 4.0").unwrap();
        assert!(raw_data_present(&config));
    }
}
