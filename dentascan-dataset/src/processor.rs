//! Turning one mesh file into a [`MeshRecord`].
//!
//! The processor loads the mesh, picks a fixed number of vertex indices,
//! gathers positions and normals at those indices, reindexes the segmentation
//! labels with the same index array, attaches landmark groups and the jaw
//! token, then runs the optional filter and transform hooks.

use crate::error::ProcessError;
use dentascan_data::{
    MeshRecord, SamplingConfig, ensure_sample_count, jaw_from_path, landmark_path,
    load_landmarks, load_mesh, load_segmentation, sample_indices, segmentation_path,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use tracing::debug;

/// Decides whether a freshly built record is kept.
pub trait RecordFilter {
    fn accept(&self, record: &MeshRecord) -> bool;
}

impl<F> RecordFilter for F
where
    F: Fn(&MeshRecord) -> bool,
{
    fn accept(&self, record: &MeshRecord) -> bool {
        self(record)
    }
}

/// Rewrites a record, either before it is cached or when it is read back.
pub trait RecordTransform {
    fn apply(&self, record: MeshRecord) -> MeshRecord;
}

impl<F> RecordTransform for F
where
    F: Fn(MeshRecord) -> MeshRecord,
{
    fn apply(&self, record: MeshRecord) -> MeshRecord {
        self(record)
    }
}

/// Build a record from a mesh file and its sibling annotations.
///
/// Fails on any mesh, sampling or annotation problem; the error names the file.
/// Missing annotation files are not errors.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn sample_mesh<R: Rng + ?Sized>(
    path: &Path,
    sampling: &SamplingConfig,
    rng: &mut R,
) -> Result<MeshRecord, ProcessError> {
    let mesh = load_mesh(path)?;

    let indices =
        sample_indices(&mesh.positions, sampling, rng).map_err(ProcessError::sampling(path))?;
    ensure_sample_count(&indices, sampling.sample_count).map_err(ProcessError::sampling(path))?;

    let positions = indices.iter().map(|&i| mesh.positions[i]).collect();
    let normals = indices.iter().map(|&i| mesh.normals[i]).collect();

    let (segmentation_labels, instance_labels) =
        match load_segmentation(&segmentation_path(path)).map_err(ProcessError::annotation(path))? {
            Some(annotation) => annotation
                .gather(&indices, mesh.vertex_count())
                .map_err(ProcessError::annotation(path))?,
            None => (Vec::new(), Vec::new()),
        };

    let landmarks =
        load_landmarks(&landmark_path(path)).map_err(ProcessError::annotation(path))?;
    let jaw = jaw_from_path(path).map_err(ProcessError::annotation(path))?;

    debug!(
        "Sampled {} of {} vertices, {} landmarks, jaw {}",
        indices.len(),
        mesh.vertex_count(),
        landmarks.total(),
        jaw
    );

    Ok(MeshRecord {
        positions,
        normals,
        segmentation_labels,
        instance_labels,
        jaw,
        landmarks,
    })
}

/// Processes mesh files one at a time with a fixed sampling configuration.
pub struct MeshSampleProcessor {
    sampling: SamplingConfig,
    rng: StdRng,
    pre_filter: Option<Box<dyn RecordFilter>>,
    pre_transform: Option<Box<dyn RecordTransform>>,
}

impl MeshSampleProcessor {
    /// Create a processor. The with-replacement branch draws from an RNG seeded
    /// with `sampling.seed`, or from OS entropy when no seed is set.
    pub fn new(sampling: SamplingConfig) -> Self {
        let rng = match sampling.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            sampling,
            rng,
            pre_filter: None,
            pre_transform: None,
        }
    }

    /// Keep only records accepted by `filter`.
    pub fn with_pre_filter(mut self, filter: impl RecordFilter + 'static) -> Self {
        self.pre_filter = Some(Box::new(filter));
        self
    }

    /// Rewrite every kept record before it is returned.
    pub fn with_pre_transform(mut self, transform: impl RecordTransform + 'static) -> Self {
        self.pre_transform = Some(Box::new(transform));
        self
    }

    pub(crate) fn set_pre_filter(&mut self, filter: Option<Box<dyn RecordFilter>>) {
        self.pre_filter = filter;
    }

    pub(crate) fn set_pre_transform(&mut self, transform: Option<Box<dyn RecordTransform>>) {
        self.pre_transform = transform;
    }

    pub fn sampling(&self) -> &SamplingConfig {
        &self.sampling
    }

    /// Process one mesh file. `Ok(None)` means the filter rejected the record.
    pub fn process(&mut self, path: &Path) -> Result<Option<MeshRecord>, ProcessError> {
        let record = sample_mesh(path, &self.sampling, &mut self.rng)?;
        Ok(self.finish(record))
    }

    /// Like [`process`](Self::process), drawing random indices from `rng`.
    pub fn process_with_rng<R: Rng + ?Sized>(
        &self,
        path: &Path,
        rng: &mut R,
    ) -> Result<Option<MeshRecord>, ProcessError> {
        let record = sample_mesh(path, &self.sampling, rng)?;
        Ok(self.finish(record))
    }

    fn finish(&self, record: MeshRecord) -> Option<MeshRecord> {
        if let Some(filter) = &self.pre_filter {
            if !filter.accept(&record) {
                debug!("Record rejected by pre-filter");
                return None;
            }
        }
        Some(match &self.pre_transform {
            Some(transform) => transform.apply(record),
            None => record,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dentascan_data::{AnnotationError, MeshError, SamplingError};
    use glam::Vec3;
    use std::collections::HashSet;
    use std::fs;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "dentascan-processor-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// A `side x side` grid in the XY plane with a distinct height per vertex,
    /// so every vertex position is unique. Returns (obj text, vertex count).
    fn grid_obj(side: usize) -> (String, usize) {
        let mut text = String::new();
        for y in 0..side {
            for x in 0..side {
                let id = y * side + x;
                text.push_str(&format!("v {} {} {}\n", x, y, id as f32 * 0.001));
            }
        }
        for y in 0..side - 1 {
            for x in 0..side - 1 {
                let a = y * side + x + 1;
                let b = a + 1;
                let c = a + side;
                let d = c + 1;
                text.push_str(&format!("f {a} {b} {d}\nf {a} {d} {c}\n"));
            }
        }
        (text, side * side)
    }

    fn write_mesh(dir: &Path, name: &str, side: usize) -> (PathBuf, usize) {
        let (text, count) = grid_obj(side);
        let path = dir.join(name);
        fs::write(&path, text).unwrap();
        (path, count)
    }

    /// Labels encode the vertex index so co-indexing can be checked exactly.
    fn write_segmentation(mesh: &Path, count: usize) {
        let labels: Vec<i32> = (0..count as i32).collect();
        let instances: Vec<i32> = (0..count as i32).map(|i| i * 10).collect();
        let json = serde_json::json!({ "labels": labels, "instances": instances });
        fs::write(segmentation_path(mesh), json.to_string()).unwrap();
    }

    fn vertex_id(p: Vec3, side: usize) -> i32 {
        (p.y as usize * side + p.x as usize) as i32
    }

    #[test]
    fn test_dense_mesh_yields_exact_sample_count() {
        let dir = scratch_dir("dense");
        let (path, _) = write_mesh(&dir, "P1_upper.obj", 12);
        let mut processor = MeshSampleProcessor::new(SamplingConfig::new(50));

        let record = processor.process(&path).unwrap().unwrap();
        assert_eq!(record.positions.len(), 50);
        assert_eq!(record.normals.len(), 50);
        assert_eq!(record.jaw, "upper");
        let unique: HashSet<i32> = record.positions.iter().map(|p| vertex_id(*p, 12)).collect();
        assert_eq!(unique.len(), 50);
    }

    #[test]
    fn test_sparse_mesh_samples_with_replacement() {
        let dir = scratch_dir("sparse");
        let (path, count) = write_mesh(&dir, "P2_lower.obj", 4);
        let mut processor = MeshSampleProcessor::new(SamplingConfig::new(40).with_seed(3));

        let record = processor.process(&path).unwrap().unwrap();
        assert_eq!(record.positions.len(), 40);
        let mesh = load_mesh(&path).unwrap();
        assert_eq!(mesh.vertex_count(), count);
        for p in &record.positions {
            assert!(mesh.positions.contains(p));
        }
    }

    #[test]
    fn test_labels_are_coindexed_with_positions() {
        let dir = scratch_dir("coindex");
        let (path, count) = write_mesh(&dir, "P3_upper.obj", 10);
        write_segmentation(&path, count);

        for sample_count in [30, 250] {
            let mut processor =
                MeshSampleProcessor::new(SamplingConfig::new(sample_count).with_seed(1));
            let record = processor.process(&path).unwrap().unwrap();
            assert_eq!(record.segmentation_labels.len(), sample_count);
            assert_eq!(record.instance_labels.len(), sample_count);
            for (i, p) in record.positions.iter().enumerate() {
                let id = vertex_id(*p, 10);
                assert_eq!(record.segmentation_labels[i], id);
                assert_eq!(record.instance_labels[i], id * 10);
            }
        }
    }

    #[test]
    fn test_missing_annotations_are_empty() {
        let dir = scratch_dir("no-annotations");
        let (path, _) = write_mesh(&dir, "P4_lower.obj", 6);
        let mut processor = MeshSampleProcessor::new(SamplingConfig::new(10));

        let record = processor.process(&path).unwrap().unwrap();
        assert!(record.segmentation_labels.is_empty());
        assert!(record.instance_labels.is_empty());
        assert!(record.landmarks.is_empty());
    }

    #[test]
    fn test_landmarks_attached() {
        let dir = scratch_dir("landmarks");
        let (path, _) = write_mesh(&dir, "P5_upper.obj", 6);
        fs::write(
            landmark_path(&path),
            r#"{"objects": [
                {"class": "Cusp", "coord": [1, 1, 0]},
                {"class": "Cusp", "coord": [2, 2, 0]},
                {"class": "Mesial", "coord": [3, 3, 0]}
            ]}"#,
        )
        .unwrap();

        let mut processor = MeshSampleProcessor::new(SamplingConfig::new(10));
        let record = processor.process(&path).unwrap().unwrap();
        assert_eq!(record.landmarks.cusp.len(), 2);
        assert_eq!(record.landmarks.mesial.len(), 1);
        assert!(record.landmarks.distal.is_empty());
        assert!(record.landmarks.inner_point.is_empty());
        assert!(record.landmarks.outer_point.is_empty());
        assert!(record.landmarks.facial_point.is_empty());
    }

    #[test]
    fn test_fps_branch_is_repeatable() {
        let dir = scratch_dir("repeatable");
        let (path, _) = write_mesh(&dir, "P6_upper.obj", 9);
        let mut processor = MeshSampleProcessor::new(SamplingConfig::new(40));

        let first = processor.process(&path).unwrap().unwrap();
        let second = processor.process(&path).unwrap().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_seeded_replacement_branch_is_repeatable() {
        let dir = scratch_dir("seeded");
        let (path, _) = write_mesh(&dir, "P7_lower.obj", 3);
        let processor = MeshSampleProcessor::new(SamplingConfig::new(20));

        let a = processor
            .process_with_rng(&path, &mut StdRng::seed_from_u64(8))
            .unwrap()
            .unwrap();
        let b = processor
            .process_with_rng(&path, &mut StdRng::seed_from_u64(8))
            .unwrap()
            .unwrap();
        assert_eq!(a.positions, b.positions);
    }

    #[test]
    fn test_pre_filter_rejects_record() {
        let dir = scratch_dir("filter");
        let (path, _) = write_mesh(&dir, "P8_lower.obj", 5);
        let mut processor = MeshSampleProcessor::new(SamplingConfig::new(8))
            .with_pre_filter(|record: &MeshRecord| record.jaw == "upper");

        assert!(processor.process(&path).unwrap().is_none());
    }

    #[test]
    fn test_pre_transform_applied() {
        let dir = scratch_dir("transform");
        let (path, _) = write_mesh(&dir, "P9_upper.obj", 5);
        let mut processor = MeshSampleProcessor::new(SamplingConfig::new(8))
            .with_pre_filter(|record: &MeshRecord| record.jaw == "upper")
            .with_pre_transform(|mut record: MeshRecord| {
                for p in &mut record.positions {
                    *p += Vec3::new(0.0, 0.0, 100.0);
                }
                record
            });

        let record = processor.process(&path).unwrap().unwrap();
        assert!(record.positions.iter().all(|p| p.z >= 100.0));
    }

    #[test]
    fn test_label_length_mismatch_is_fatal() {
        let dir = scratch_dir("label-mismatch");
        let (path, count) = write_mesh(&dir, "P10_upper.obj", 5);
        write_segmentation(&path, count - 1);

        let mut processor = MeshSampleProcessor::new(SamplingConfig::new(8));
        let err = processor.process(&path).unwrap_err();
        assert!(matches!(
            err,
            ProcessError::Annotation {
                source: AnnotationError::LengthMismatch { .. },
                ..
            }
        ));
        assert!(err.to_string().contains("P10_upper.obj"));
    }

    #[test]
    fn test_unknown_landmark_is_fatal() {
        let dir = scratch_dir("bad-landmark");
        let (path, _) = write_mesh(&dir, "P11_upper.obj", 5);
        fs::write(
            landmark_path(&path),
            r#"{"objects": [{"class": "Root", "coord": [0, 0, 0]}]}"#,
        )
        .unwrap();

        let mut processor = MeshSampleProcessor::new(SamplingConfig::new(8));
        assert!(matches!(
            processor.process(&path),
            Err(ProcessError::Annotation {
                source: AnnotationError::UnknownLandmarkClass { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_corrupt_mesh_is_fatal() {
        let dir = scratch_dir("corrupt");
        let path = dir.join("P12_upper.obj");
        fs::write(&path, "v 0 0 0\nf 1 2 3\n").unwrap();

        let mut processor = MeshSampleProcessor::new(SamplingConfig::new(8));
        let err = processor.process(&path).unwrap_err();
        assert!(matches!(err, ProcessError::Mesh(_)));
        assert!(err.to_string().contains("P12_upper.obj"));
    }

    #[test]
    fn test_missing_mesh_is_fatal() {
        let dir = scratch_dir("missing-mesh");
        let mut processor = MeshSampleProcessor::new(SamplingConfig::new(8));
        assert!(matches!(
            processor.process(&dir.join("absent_upper.obj")),
            Err(ProcessError::Mesh(MeshError::Io { .. }))
        ));
    }

    #[test]
    fn test_bad_start_index_reports_sampling_error() {
        let dir = scratch_dir("start-index");
        let (path, _) = write_mesh(&dir, "P13_upper.obj", 4);
        let mut processor =
            MeshSampleProcessor::new(SamplingConfig::new(8).with_start_index(99));
        assert!(matches!(
            processor.process(&path),
            Err(ProcessError::Sampling {
                source: SamplingError::StartIndexOutOfRange { .. },
                ..
            })
        ));
    }
}
