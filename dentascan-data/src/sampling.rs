//! Point subsampling for mesh vertices.
//!
//! Meshes with fewer vertices than the requested sample count are sampled
//! uniformly with replacement, so every record ends up the same size. Denser
//! meshes go through farthest-point sampling, accelerated by grouping the
//! vertices into the leaf buckets of a shallow k-d tree.

use glam::Vec3;
use rand::Rng;
use thiserror::Error;
use tracing::debug;

/// Default number of points sampled per mesh.
pub const DEFAULT_SAMPLE_COUNT: usize = 30_000;

/// Default k-d tree height; the tree has at most `2^height` leaf buckets.
pub const DEFAULT_BUCKET_HEIGHT: u32 = 5;

/// Errors raised while choosing sample indices.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SamplingError {
    #[error("cannot sample from an empty point set")]
    EmptyPointSet,

    #[error("start index {index} is out of range for {len} points")]
    StartIndexOutOfRange { index: usize, len: usize },

    #[error("sampled {actual} points, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Sampling parameters shared by every mesh in a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingConfig {
    /// Number of points per record.
    pub sample_count: usize,
    /// Height of the k-d tree used by farthest-point sampling.
    pub bucket_height: u32,
    /// Vertex that seeds farthest-point sampling.
    pub start_index: usize,
    /// Seed for the with-replacement branch. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl SamplingConfig {
    pub fn new(sample_count: usize) -> Self {
        Self {
            sample_count,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_bucket_height(mut self, bucket_height: u32) -> Self {
        self.bucket_height = bucket_height;
        self
    }

    pub fn with_start_index(mut self, start_index: usize) -> Self {
        self.start_index = start_index;
        self
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
            bucket_height: DEFAULT_BUCKET_HEIGHT,
            start_index: 0,
            seed: None,
        }
    }
}

/// Choose `config.sample_count` vertex indices from `points`.
///
/// Sparse inputs (fewer points than requested) are sampled uniformly with
/// replacement. Otherwise [`bucket_fps`] picks distinct indices starting at
/// `config.start_index`.
pub fn sample_indices<R: Rng + ?Sized>(
    points: &[Vec3],
    config: &SamplingConfig,
    rng: &mut R,
) -> Result<Vec<usize>, SamplingError> {
    if points.is_empty() {
        return Err(SamplingError::EmptyPointSet);
    }

    if points.len() < config.sample_count {
        debug!(
            "Sparse mesh ({} < {}), sampling with replacement",
            points.len(),
            config.sample_count
        );
        return Ok(sample_with_replacement(
            points.len(),
            config.sample_count,
            rng,
        ));
    }

    if config.start_index >= points.len() {
        return Err(SamplingError::StartIndexOutOfRange {
            index: config.start_index,
            len: points.len(),
        });
    }

    Ok(bucket_fps(
        points,
        config.sample_count,
        config.bucket_height,
        config.start_index,
    ))
}

/// Draw `sample_count` indices uniformly from `0..vertex_count`, duplicates allowed.
pub fn sample_with_replacement<R: Rng + ?Sized>(
    vertex_count: usize,
    sample_count: usize,
    rng: &mut R,
) -> Vec<usize> {
    if vertex_count == 0 {
        return Vec::new();
    }
    (0..sample_count)
        .map(|_| rng.gen_range(0..vertex_count))
        .collect()
}

/// Fail unless exactly `expected` indices were produced.
pub fn ensure_sample_count(indices: &[usize], expected: usize) -> Result<(), SamplingError> {
    if indices.len() == expected {
        Ok(())
    } else {
        Err(SamplingError::SizeMismatch {
            expected,
            actual: indices.len(),
        })
    }
}

/// A k-d tree leaf: its members, their bounding box, and the member that is
/// currently farthest from every selected sample.
struct Bucket {
    members: Vec<usize>,
    min: Vec3,
    max: Vec3,
    far_dist: f32,
    far_index: usize,
}

impl Bucket {
    fn new(members: Vec<usize>, points: &[Vec3]) -> Self {
        let (min, max) = bounds(points, &members);
        Self {
            members,
            min,
            max,
            // Forces a full scan on the first refresh.
            far_dist: f32::INFINITY,
            far_index: usize::MAX,
        }
    }

    /// Squared distance from `p` to the bucket's bounding box. Never exceeds
    /// the squared distance from `p` to any member.
    fn distance_lower_bound(&self, p: Vec3) -> f32 {
        (self.min - p).max(p - self.max).max(Vec3::ZERO).length_squared()
    }

    fn refresh(&mut self, points: &[Vec3], nearest: &mut [f32], sample: Vec3) {
        let mut far_dist = f32::NEG_INFINITY;
        let mut far_index = usize::MAX;
        for &i in &self.members {
            let d = (points[i] - sample).length_squared();
            if d < nearest[i] {
                nearest[i] = d;
            }
            let n = nearest[i];
            if n > far_dist || (n == far_dist && i < far_index) {
                far_dist = n;
                far_index = i;
            }
        }
        self.far_dist = far_dist;
        self.far_index = far_index;
    }
}

fn bounds(points: &[Vec3], members: &[usize]) -> (Vec3, Vec3) {
    members.iter().fold(
        (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
        |(lo, hi), &i| (lo.min(points[i]), hi.max(points[i])),
    )
}

/// Median-split `members` along the widest axis until `height` levels deep.
fn partition(
    points: &[Vec3],
    members: &mut [usize],
    depth: u32,
    height: u32,
    leaves: &mut Vec<Vec<usize>>,
) {
    if depth >= height || members.len() <= 1 {
        leaves.push(members.to_vec());
        return;
    }

    let (lo, hi) = bounds(points, members);
    let extent = hi - lo;
    let axis = if extent.x >= extent.y && extent.x >= extent.z {
        0
    } else if extent.y >= extent.z {
        1
    } else {
        2
    };

    let mid = members.len() / 2;
    members.select_nth_unstable_by(mid, |&a, &b| {
        points[a][axis]
            .total_cmp(&points[b][axis])
            .then(a.cmp(&b))
    });
    let (left, right) = members.split_at_mut(mid);
    partition(points, left, depth + 1, height, leaves);
    partition(points, right, depth + 1, height, leaves);
}

fn next_farthest(buckets: &[Bucket]) -> Option<usize> {
    buckets
        .iter()
        .filter(|b| b.far_dist > f32::NEG_INFINITY)
        .fold(None, |best: Option<(f32, usize)>, b| match best {
            Some((d, i)) if d > b.far_dist || (d == b.far_dist && i < b.far_index) => {
                Some((d, i))
            }
            _ => Some((b.far_dist, b.far_index)),
        })
        .map(|(_, i)| i)
}

/// Farthest-point sampling over a bucketed k-d tree.
///
/// Returns up to `sample_count` distinct indices in selection order, starting
/// with `start_index`. Each subsequent index is the unselected point with the
/// largest distance to its nearest selected point; ties go to the lowest index.
/// The result matches exhaustive farthest-point sampling exactly. Buckets whose
/// bounding box is no closer to the new sample than their current farthest
/// member are skipped.
pub fn bucket_fps(
    points: &[Vec3],
    sample_count: usize,
    height: u32,
    start_index: usize,
) -> Vec<usize> {
    let target = sample_count.min(points.len());
    if target == 0 || start_index >= points.len() {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..points.len()).collect();
    let mut leaves = Vec::new();
    partition(points, &mut order, 0, height, &mut leaves);

    let mut buckets: Vec<Bucket> = leaves
        .into_iter()
        .map(|members| Bucket::new(members, points))
        .collect();
    let mut bucket_of = vec![0usize; points.len()];
    for (b, bucket) in buckets.iter().enumerate() {
        for &i in &bucket.members {
            bucket_of[i] = b;
        }
    }

    // Squared distance to the nearest selected sample; selected points hold -inf.
    let mut nearest = vec![f32::INFINITY; points.len()];
    let mut selected = Vec::with_capacity(target);
    let mut current = start_index;
    let mut scans = 0usize;

    loop {
        selected.push(current);
        nearest[current] = f32::NEG_INFINITY;
        if selected.len() == target {
            break;
        }

        let sample = points[current];
        let home = bucket_of[current];
        for (b, bucket) in buckets.iter_mut().enumerate() {
            if b == home || bucket.distance_lower_bound(sample) < bucket.far_dist {
                bucket.refresh(points, &mut nearest, sample);
                scans += 1;
            }
        }

        match next_farthest(&buckets) {
            Some(next) => current = next,
            None => break,
        }
    }

    debug!(
        "Farthest-point sampled {} of {} points ({} buckets, {} bucket scans)",
        selected.len(),
        points.len(),
        buckets.len(),
        scans
    );
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn random_cloud(count: usize, seed: u64) -> Vec<Vec3> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|_| {
                Vec3::new(
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-5.0..5.0),
                    rng.gen_range(0.0..2.0),
                )
            })
            .collect()
    }

    /// Exhaustive O(n * k) farthest-point sampling with the same tie rule.
    fn exhaustive_fps(points: &[Vec3], count: usize, start: usize) -> Vec<usize> {
        let mut nearest = vec![f32::INFINITY; points.len()];
        let mut selected = vec![start];
        nearest[start] = f32::NEG_INFINITY;
        while selected.len() < count.min(points.len()) {
            let last = points[*selected.last().unwrap()];
            let mut best = (f32::NEG_INFINITY, usize::MAX);
            for (i, p) in points.iter().enumerate() {
                let d = (*p - last).length_squared();
                if d < nearest[i] {
                    nearest[i] = d;
                }
                if nearest[i] > best.0 {
                    best = (nearest[i], i);
                }
            }
            nearest[best.1] = f32::NEG_INFINITY;
            selected.push(best.1);
        }
        selected
    }

    #[test]
    fn test_bucket_fps_matches_exhaustive() {
        let points = random_cloud(2_000, 7);
        let fast = bucket_fps(&points, 300, DEFAULT_BUCKET_HEIGHT, 0);
        let slow = exhaustive_fps(&points, 300, 0);
        assert_eq!(fast, slow);
    }

    #[test]
    fn test_bucket_fps_matches_exhaustive_on_grid() {
        // Regular grids produce many exact distance ties.
        let mut points = Vec::new();
        for x in 0..8 {
            for y in 0..8 {
                for z in 0..4 {
                    points.push(Vec3::new(x as f32, y as f32, z as f32));
                }
            }
        }
        let fast = bucket_fps(&points, 100, 3, 5);
        let slow = exhaustive_fps(&points, 100, 5);
        assert_eq!(fast, slow);
    }

    #[test]
    fn test_bucket_fps_distinct_and_exact_size() {
        let points = random_cloud(1_000, 11);
        let indices = bucket_fps(&points, 1_000, DEFAULT_BUCKET_HEIGHT, 0);
        assert_eq!(indices.len(), 1_000);
        let unique: HashSet<_> = indices.iter().copied().collect();
        assert_eq!(unique.len(), 1_000);
    }

    #[test]
    fn test_bucket_fps_starts_at_start_index() {
        let points = random_cloud(500, 3);
        let indices = bucket_fps(&points, 10, DEFAULT_BUCKET_HEIGHT, 42);
        assert_eq!(indices[0], 42);
    }

    #[test]
    fn test_bucket_fps_is_deterministic() {
        let points = random_cloud(1_500, 19);
        let first = bucket_fps(&points, 200, DEFAULT_BUCKET_HEIGHT, 0);
        let second = bucket_fps(&points, 200, DEFAULT_BUCKET_HEIGHT, 0);
        assert_eq!(first, second);
    }

    #[test]
    fn test_bucket_fps_duplicate_points() {
        // All points coincide: selection falls back to lowest unselected index.
        let points = vec![Vec3::ONE; 6];
        let indices = bucket_fps(&points, 6, 2, 0);
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_bucket_fps_second_pick_is_farthest() {
        let points = vec![
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
        ];
        let indices = bucket_fps(&points, 2, 1, 0);
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn test_bucket_fps_zero_height_is_single_bucket() {
        let points = random_cloud(200, 23);
        let flat = bucket_fps(&points, 50, 0, 0);
        let tree = bucket_fps(&points, 50, 6, 0);
        assert_eq!(flat, tree);
    }

    #[test]
    fn test_sample_indices_sparse_mesh_uses_replacement() {
        let points = random_cloud(10, 1);
        let config = SamplingConfig::new(64);
        let mut rng = StdRng::seed_from_u64(5);
        let indices = sample_indices(&points, &config, &mut rng).unwrap();
        assert_eq!(indices.len(), 64);
        assert!(indices.iter().all(|&i| i < points.len()));
    }

    #[test]
    fn test_sample_indices_dense_mesh_uses_fps() {
        let points = random_cloud(400, 2);
        let config = SamplingConfig::new(40);
        let mut rng = StdRng::seed_from_u64(5);
        let indices = sample_indices(&points, &config, &mut rng).unwrap();
        assert_eq!(indices, bucket_fps(&points, 40, DEFAULT_BUCKET_HEIGHT, 0));
    }

    #[test]
    fn test_sample_indices_exact_vertex_count_uses_fps() {
        let points = random_cloud(32, 9);
        let config = SamplingConfig::new(32);
        let mut rng = StdRng::seed_from_u64(0);
        let indices = sample_indices(&points, &config, &mut rng).unwrap();
        let unique: HashSet<_> = indices.iter().copied().collect();
        assert_eq!(unique.len(), 32);
    }

    #[test]
    fn test_sample_indices_empty_input() {
        let config = SamplingConfig::new(8);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            sample_indices(&[], &config, &mut rng),
            Err(SamplingError::EmptyPointSet)
        );
    }

    #[test]
    fn test_sample_indices_start_out_of_range() {
        let points = random_cloud(16, 4);
        let config = SamplingConfig::new(8).with_start_index(16);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            sample_indices(&points, &config, &mut rng),
            Err(SamplingError::StartIndexOutOfRange { index: 16, len: 16 })
        );
    }

    #[test]
    fn test_seeded_replacement_is_reproducible() {
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        assert_eq!(
            sample_with_replacement(7, 50, &mut a),
            sample_with_replacement(7, 50, &mut b)
        );
    }

    #[test]
    fn test_ensure_sample_count() {
        assert!(ensure_sample_count(&[0, 1, 2], 3).is_ok());
        assert_eq!(
            ensure_sample_count(&[0, 1], 3),
            Err(SamplingError::SizeMismatch {
                expected: 3,
                actual: 2
            })
        );
    }
}
