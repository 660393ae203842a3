//! PLY mesh loading

use super::{MeshError, TriMesh, compute_vertex_normals};
use glam::Vec3;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

// Face structure for PLY files
#[derive(Deserialize, Debug)]
struct PlyFace {
    #[serde(alias = "vertex_index")]
    vertex_indices: Vec<i32>,
}

// PLY file structure
#[derive(Deserialize, Debug)]
struct PlyFile {
    #[serde(rename = "vertex")]
    vertex: Vec<HashMap<String, JsonValue>>,
    #[serde(default, rename = "face")]
    face: Vec<PlyFace>,
}

fn get_f32(prop: Option<&JsonValue>) -> Option<f32> {
    prop.and_then(|v| match v {
        JsonValue::Number(n) => n.as_f64().map(|f| f as f32),
        _ => None,
    })
}

/// Load a PLY mesh. Vertex normals come from `nx`/`ny`/`nz` when every vertex
/// has them and are computed from the faces otherwise.
pub(super) fn load_ply(path: &Path) -> Result<Vec<TriMesh>, MeshError> {
    debug!("Loading PLY mesh from: {}", path.display());
    let file = File::open(path).map_err(|source| MeshError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let ply_data: PlyFile = serde_ply::from_reader(reader).map_err(|e| {
        warn!("Failed to parse PLY file: {}", e);
        MeshError::Ply {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    debug!(
        "PLY file parsed: {} vertices, {} faces",
        ply_data.vertex.len(),
        ply_data.face.len()
    );

    let missing = |property: &'static str, index: usize| MeshError::MissingProperty {
        path: path.to_path_buf(),
        property,
        index,
    };

    let mut positions = Vec::with_capacity(ply_data.vertex.len());
    let mut file_normals = Vec::with_capacity(ply_data.vertex.len());

    for (i, vertex) in ply_data.vertex.iter().enumerate() {
        let x = get_f32(vertex.get("x")).ok_or_else(|| missing("x", i))?;
        let y = get_f32(vertex.get("y")).ok_or_else(|| missing("y", i))?;
        let z = get_f32(vertex.get("z")).ok_or_else(|| missing("z", i))?;
        positions.push(Vec3::new(x, y, z));

        if let (Some(nx), Some(ny), Some(nz)) = (
            get_f32(vertex.get("nx")),
            get_f32(vertex.get("ny")),
            get_f32(vertex.get("nz")),
        ) {
            file_normals.push(Vec3::new(nx, ny, nz));
        }
    }

    let mut faces = Vec::with_capacity(ply_data.face.len());
    for (face, ply_face) in ply_data.face.iter().enumerate() {
        let indices = &ply_face.vertex_indices;
        if let Some(&bad) = indices
            .iter()
            .find(|&&v| v < 0 || v as usize >= positions.len())
        {
            return Err(MeshError::FaceIndexOutOfRange {
                path: path.to_path_buf(),
                face,
                vertex: bad as i64,
                vertex_count: positions.len(),
            });
        }
        if indices.len() < 3 {
            continue;
        }
        let first = indices[0] as u32;
        for pair in indices[1..].windows(2) {
            faces.push([first, pair[0] as u32, pair[1] as u32]);
        }
    }

    let normals = if !positions.is_empty() && file_normals.len() == positions.len() {
        file_normals
            .into_iter()
            .map(Vec3::normalize_or_zero)
            .collect()
    } else {
        compute_vertex_normals(&positions, &faces)
    };

    Ok(vec![TriMesh {
        positions,
        normals,
        faces,
    }])
}
