use std::collections::{BTreeMap, HashMap};

use crate::math::{Vector2, Vector4};

/// Material name → properties, as read from one `.mtl` file.
pub type MaterialTable = HashMap<String, Material>;

/// Reflectance record from an `.mtl` file. Every field is optional; callers
/// check presence before use.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Material {
    pub ka: Option<Vector4>,
    pub kd: Option<Vector4>,
    pub ks: Option<Vector4>,
    pub ns: Option<f32>,
    /// Raw `map_Kd` reference, surfaced as written in the file.
    pub diffuse_texture: Option<String>,
}

/// Output of one OBJ parse: index pools plus the fan-triangulated stream.
///
/// The three `face_*` streams always have the same length, a multiple of 3.
/// A polygon without UVs or normals leaves `None` in that stream for each of
/// its corners.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GeometryResult {
    pub vertices: Vec<Vector4>,
    pub normals: Vec<Vector4>,
    pub uvs: Vec<Vector2>,

    pub face_vertices: Vec<Vector4>,
    pub face_normals: Vec<Option<Vector4>>,
    pub face_uvs: Vec<Option<Vector2>>,

    /// Stream offset (multiple of 3) → material that becomes active there.
    pub material_switches: BTreeMap<usize, String>,
    /// `mtllib` reference, if the file names one.
    pub material_library: Option<String>,
}

impl GeometryResult {
    /// Number of corners in the triangulated stream.
    pub fn vertex_count(&self) -> usize {
        self.face_vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.face_vertices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.face_vertices.is_empty()
    }

    pub fn flattened_positions(&self) -> Vec<f32> {
        self.face_vertices.iter().flat_map(|v| v.to_array()).collect()
    }

    /// Holes become zero vectors.
    pub fn flattened_normals(&self) -> Vec<f32> {
        self.face_normals
            .iter()
            .flat_map(|n| n.unwrap_or_default().to_array())
            .collect()
    }

    /// Holes become `(0, 0)`.
    pub fn flattened_uvs(&self) -> Vec<f32> {
        self.face_uvs
            .iter()
            .flat_map(|uv| {
                let uv = uv.unwrap_or_default();
                [uv.x, uv.y]
            })
            .collect()
    }
}
