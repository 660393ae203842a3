//! Core record types produced by mesh processing.
//!
//! A [`MeshRecord`] is built once per source mesh and is read-only afterwards.
//! Landmark groups hold raw annotated keypoints and are independent of the
//! sampled point cloud.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Anatomical landmark classes found in keypoint annotation files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandmarkKind {
    Mesial,
    Distal,
    Cusp,
    InnerPoint,
    OuterPoint,
    FacialPoint,
}

/// Class tags as written in annotation files, indexed by `LandmarkKind as usize`.
const LANDMARK_TAGS: [&str; 6] = [
    "Mesial",
    "Distal",
    "Cusp",
    "InnerPoint",
    "OuterPoint",
    "FacialPoint",
];

impl LandmarkKind {
    /// Every landmark kind, in tag-table order.
    pub const ALL: [LandmarkKind; 6] = [
        LandmarkKind::Mesial,
        LandmarkKind::Distal,
        LandmarkKind::Cusp,
        LandmarkKind::InnerPoint,
        LandmarkKind::OuterPoint,
        LandmarkKind::FacialPoint,
    ];

    /// The class tag used for this kind in annotation files.
    pub fn tag(self) -> &'static str {
        LANDMARK_TAGS[self as usize]
    }

    /// Look up a kind by its exact class tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl std::fmt::Display for LandmarkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// The six landmark groups attached to a scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmarks {
    pub mesial: Vec<Vec3>,
    pub distal: Vec<Vec3>,
    pub cusp: Vec<Vec3>,
    pub inner_point: Vec<Vec3>,
    pub outer_point: Vec<Vec3>,
    pub facial_point: Vec<Vec3>,
}

impl Landmarks {
    /// Points recorded for one landmark kind, in file order.
    pub fn group(&self, kind: LandmarkKind) -> &[Vec3] {
        match kind {
            LandmarkKind::Mesial => &self.mesial,
            LandmarkKind::Distal => &self.distal,
            LandmarkKind::Cusp => &self.cusp,
            LandmarkKind::InnerPoint => &self.inner_point,
            LandmarkKind::OuterPoint => &self.outer_point,
            LandmarkKind::FacialPoint => &self.facial_point,
        }
    }

    fn group_mut(&mut self, kind: LandmarkKind) -> &mut Vec<Vec3> {
        match kind {
            LandmarkKind::Mesial => &mut self.mesial,
            LandmarkKind::Distal => &mut self.distal,
            LandmarkKind::Cusp => &mut self.cusp,
            LandmarkKind::InnerPoint => &mut self.inner_point,
            LandmarkKind::OuterPoint => &mut self.outer_point,
            LandmarkKind::FacialPoint => &mut self.facial_point,
        }
    }

    /// Append a point to the group for `kind`.
    pub fn push(&mut self, kind: LandmarkKind, point: Vec3) {
        self.group_mut(kind).push(point);
    }

    /// Total number of landmarks across all groups.
    pub fn total(&self) -> usize {
        LandmarkKind::ALL
            .iter()
            .map(|&kind| self.group(kind).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// One processed scan: a fixed-size point cloud plus its annotations.
///
/// `positions`, `normals` and (when present) both label arrays are co-indexed.
/// Label arrays are empty when the scan has no segmentation annotation, which
/// is distinct from a scan annotated as all background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshRecord {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub segmentation_labels: Vec<i32>,
    pub instance_labels: Vec<i32>,
    /// Jaw token taken from the file name (e.g. `upper` or `lower`).
    pub jaw: String,
    pub landmarks: Landmarks,
}

impl MeshRecord {
    /// Number of sampled points.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Whether per-point segmentation and instance labels are attached.
    pub fn has_segmentation(&self) -> bool {
        !self.segmentation_labels.is_empty()
    }
}
