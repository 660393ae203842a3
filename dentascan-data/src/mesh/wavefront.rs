//! Wavefront OBJ loading.

use super::{MeshError, TriMesh, compute_vertex_normals};
use glam::Vec3;
use obj::raw::object::Polygon;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// One polygon corner: position index and optional normal index.
type Corner = (usize, Option<usize>);

fn polygon_corners(polygon: &Polygon) -> Vec<Corner> {
    match polygon {
        Polygon::P(idx) => idx.iter().map(|&v| (v, None)).collect(),
        Polygon::PT(idx) => idx.iter().map(|&(v, _)| (v, None)).collect(),
        Polygon::PN(idx) => idx.iter().map(|&(v, n)| (v, Some(n))).collect(),
        Polygon::PTN(idx) => idx.iter().map(|&(v, _, n)| (v, Some(n))).collect(),
    }
}

/// Load an OBJ file as a single geometry over the raw vertex list.
///
/// Polygons are fan-triangulated. File normals are used only when every face
/// corner references one; otherwise normals are computed from the faces.
pub(super) fn load_obj(path: &Path) -> Result<Vec<TriMesh>, MeshError> {
    debug!("Loading OBJ mesh from: {}", path.display());
    let file = File::open(path).map_err(|source| MeshError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let raw = obj::raw::parse_obj(BufReader::new(file)).map_err(|e| MeshError::Obj {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let positions: Vec<Vec3> = raw
        .positions
        .iter()
        .map(|v| Vec3::new(v.0, v.1, v.2))
        .collect();
    let file_normals: Vec<Vec3> = raw
        .normals
        .iter()
        .map(|n| Vec3::new(n.0, n.1, n.2))
        .collect();

    let mut faces = Vec::with_capacity(raw.polygons.len());
    let mut normal_sums = vec![Vec3::ZERO; positions.len()];
    let mut all_corners_have_normals = !file_normals.is_empty();

    for (face, polygon) in raw.polygons.iter().enumerate() {
        let corners = polygon_corners(polygon);
        for &(v, n) in &corners {
            if v >= positions.len() {
                return Err(MeshError::FaceIndexOutOfRange {
                    path: path.to_path_buf(),
                    face,
                    vertex: v as i64,
                    vertex_count: positions.len(),
                });
            }
            match n.and_then(|n| file_normals.get(n)) {
                Some(normal) => normal_sums[v] += *normal,
                None => all_corners_have_normals = false,
            }
        }

        if corners.len() < 3 {
            continue;
        }
        let (first, _) = corners[0];
        for pair in corners[1..].windows(2) {
            faces.push([first as u32, pair[0].0 as u32, pair[1].0 as u32]);
        }
    }

    let normals = if all_corners_have_normals {
        normal_sums
            .into_iter()
            .map(Vec3::normalize_or_zero)
            .collect()
    } else {
        compute_vertex_normals(&positions, &faces)
    };

    debug!(
        "OBJ parsed: {} vertices, {} file normals, {} triangles",
        positions.len(),
        file_normals.len(),
        faces.len()
    );

    Ok(vec![TriMesh {
        positions,
        normals,
        faces,
    }])
}
