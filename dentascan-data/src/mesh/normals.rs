//! Per-vertex normals from triangle faces.

use glam::Vec3;

/// Angle-weighted vertex normals.
///
/// Each face adds its unit normal to its three corners, weighted by the
/// corner angle. Degenerate faces contribute nothing and vertices that no face
/// references get a zero normal.
pub fn compute_vertex_normals(positions: &[Vec3], faces: &[[u32; 3]]) -> Vec<Vec3> {
    let mut sums = vec![Vec3::ZERO; positions.len()];

    for face in faces {
        let [a, b, c] = face.map(|i| i as usize);
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let (pa, pb, pc) = (positions[a], positions[b], positions[c]);

        let normal = (pb - pa).cross(pc - pa).normalize_or_zero();
        if normal == Vec3::ZERO {
            continue;
        }

        sums[a] += normal * (pb - pa).angle_between(pc - pa);
        sums[b] += normal * (pc - pb).angle_between(pa - pb);
        sums[c] += normal * (pa - pc).angle_between(pb - pc);
    }

    sums.into_iter().map(Vec3::normalize_or_zero).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_triangle_normals() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        let normals = compute_vertex_normals(&positions, &[[0, 1, 2]]);
        for n in normals {
            assert!((n - Vec3::Z).length() < 1e-5);
        }
    }

    #[test]
    fn test_winding_flips_normal() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        let normals = compute_vertex_normals(&positions, &[[0, 2, 1]]);
        assert!((normals[0] + Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_degenerate_face_is_ignored() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::new(2.0, 0.0, 0.0)];
        let normals = compute_vertex_normals(&positions, &[[0, 1, 2]]);
        assert!(normals.iter().all(|n| *n == Vec3::ZERO));
    }

    #[test]
    fn test_shared_vertex_blends_faces() {
        // Two faces meeting at a right-angle edge along X.
        let positions = vec![
            Vec3::ZERO,
            Vec3::X,
            Vec3::Y,
            Vec3::new(0.0, 0.0, -1.0),
        ];
        let faces = [[0, 1, 2], [0, 1, 3]];
        let normals = compute_vertex_normals(&positions, &faces);

        let expected = (Vec3::Z + Vec3::Y).normalize();
        assert!((normals[0] - expected).length() < 1e-5);
        assert!((normals[1] - expected).length() < 1e-5);
        assert!((normals[2] - Vec3::Z).length() < 1e-5);
        assert!((normals[3] - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_output_matches_vertex_count() {
        let positions = vec![Vec3::ZERO; 5];
        assert_eq!(compute_vertex_normals(&positions, &[]).len(), 5);
    }
}
