use log::debug;

use super::index::{parse_face_vertex, required_argument, scan_floats, FaceStyle};
use super::types::GeometryResult;
use crate::error::SceneError;
use crate::math::{Vector2, Vector4};

/// One polygon corner with its pool references already resolved.
#[derive(Debug, Clone, Copy)]
struct FaceCorner {
    position: Vector4,
    uv: Option<Vector2>,
    normal: Option<Vector4>,
}

/// Parses OBJ text into pools and a fan-triangulated face stream.
///
/// Each call starts from an empty result, so concurrent or repeated parses
/// never observe each other. Empty input yields an empty result.
pub fn parse_obj(text: &str) -> Result<GeometryResult, SceneError> {
    let mut geometry = GeometryResult::default();

    for (line_index, raw_line) in text.lines().enumerate() {
        let line_number = line_index + 1;
        let line = raw_line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (keyword, rest) = split_keyword(line);
        let mut face: Vec<FaceCorner> = Vec::new();

        match keyword {
            "vn" => {
                let [x, y, z] = scan_floats::<3>(rest, line_number, "vertex normal")?;
                geometry.normals.push(Vector4::point(x, y, z));
            }
            "vt" => {
                let [u, v] = scan_floats::<2>(rest, line_number, "texture coordinate")?;
                geometry.uvs.push(Vector2::new(u, 1.0 - v));
            }
            "v" => {
                let [x, y, z] = scan_floats::<3>(rest, line_number, "vertex position")?;
                geometry.vertices.push(Vector4::point(x, y, z));
            }
            "usemtl" => {
                let name = required_argument(rest, "usemtl", line_number)?;
                geometry
                    .material_switches
                    .insert(geometry.face_vertices.len(), name.to_string());
            }
            "mtllib" => {
                let file_name = required_argument(rest, "mtllib", line_number)?;
                geometry.material_library = Some(file_name.to_string());
            }
            "f" => face = parse_face(rest, line_number, &geometry)?,
            _ => {}
        }

        // No-op unless this line was a face.
        fan_triangulate(&face, &mut geometry);
    }

    debug!(
        "parsed OBJ: {} vertices, {} normals, {} uvs, {} triangles, {} material switches",
        geometry.vertices.len(),
        geometry.normals.len(),
        geometry.uvs.len(),
        geometry.triangle_count(),
        geometry.material_switches.len()
    );

    Ok(geometry)
}

fn split_keyword(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    }
}

fn parse_face(
    rest: &str,
    line_number: usize,
    geometry: &GeometryResult,
) -> Result<Vec<FaceCorner>, SceneError> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err(SceneError::malformed(
            line_number,
            format!("face requires at least 3 vertices, found {}", tokens.len()),
        ));
    }

    let style = FaceStyle::of(tokens[0]).ok_or_else(|| {
        SceneError::malformed(
            line_number,
            format!("invalid face reference '{}'", tokens[0]),
        )
    })?;

    let mut corners = Vec::with_capacity(tokens.len());
    for token in tokens {
        let (position, uv, normal) = parse_face_vertex(
            token,
            style,
            line_number,
            geometry.vertices.len(),
            geometry.uvs.len(),
            geometry.normals.len(),
        )?;

        corners.push(FaceCorner {
            position: geometry.vertices[position],
            uv: uv.map(|index| geometry.uvs[index]),
            normal: normal.map(|index| geometry.normals[index]),
        });
    }

    Ok(corners)
}

/// Emits `(c0, ci, ci+1)` for every `i` in `1..n-1`.
fn fan_triangulate(corners: &[FaceCorner], geometry: &mut GeometryResult) {
    for i in 1..corners.len().saturating_sub(1) {
        for corner in [&corners[0], &corners[i], &corners[i + 1]] {
            geometry.face_vertices.push(corner.position);
            geometry.face_normals.push(corner.normal);
            geometry.face_uvs.push(corner.uv);
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::parse_obj;
    use crate::error::SceneError;
    use crate::math::{Vector2, Vector4};

    const QUAD: &str = "
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3 4
";

    const TEXTURED_CUBE_SIDE: &str = "
# two triangles, full references
v -1 -1 0
v 1 -1 0
v 1 1 0
v -1 1 0
vt 0 0
vt 1 0
vt 1 1
vn 0 0 1
usemtl paint
f 1/1/1 2/2/1 3/3/1
f 1/1/1 3/3/1 4/3/1
";

    #[test]
    fn empty_input_yields_empty_result() {
        let geometry = parse_obj(" \n\t\n").unwrap();
        assert!(geometry.is_empty());
        assert!(geometry.vertices.is_empty());
        assert!(geometry.material_switches.is_empty());
    }

    #[test]
    fn quad_is_fan_triangulated_around_first_vertex() {
        let geometry = parse_obj(QUAD).unwrap();
        let v = &geometry.vertices;

        assert_eq!(geometry.triangle_count(), 2);
        assert_eq!(
            geometry.face_vertices,
            vec![v[0], v[1], v[2], v[0], v[2], v[3]]
        );
        assert!(geometry.face_normals.iter().all(Option::is_none));
        assert!(geometry.face_uvs.iter().all(Option::is_none));
    }

    #[test]
    fn pentagon_yields_three_triangles() {
        let text = "v 0 0 0\nv 1 0 0\nv 2 1 0\nv 1 2 0\nv 0 1 0\nf 1 2 3 4 5\n";
        let geometry = parse_obj(text).unwrap();
        let v = &geometry.vertices;
        assert_eq!(
            geometry.face_vertices,
            vec![v[0], v[1], v[2], v[0], v[2], v[3], v[0], v[3], v[4]]
        );
    }

    #[test]
    fn triangle_streams_have_matching_lengths() {
        let geometry = parse_obj(TEXTURED_CUBE_SIDE).unwrap();
        assert_eq!(geometry.face_vertices.len(), 6);
        assert_eq!(geometry.face_normals.len(), 6);
        assert_eq!(geometry.face_uvs.len(), 6);
        assert!(geometry.face_normals.iter().all(Option::is_some));
        assert!(geometry.face_uvs.iter().all(Option::is_some));
    }

    #[test]
    fn positions_and_normals_are_homogeneous() {
        let geometry = parse_obj(TEXTURED_CUBE_SIDE).unwrap();
        assert_eq!(geometry.vertices[1], Vector4::new(1.0, -1.0, 0.0, 1.0));
        assert_eq!(geometry.normals[0], Vector4::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn uv_v_channel_is_flipped() {
        let geometry = parse_obj("vt 0.2 0.3").unwrap();
        assert_eq!(geometry.uvs.len(), 1);
        assert_relative_eq!(geometry.uvs[0].x, 0.2, epsilon = 1e-6);
        assert_relative_eq!(geometry.uvs[0].y, 0.7, epsilon = 1e-6);
    }

    #[test]
    fn position_normal_faces_leave_uv_holes() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n";
        let geometry = parse_obj(text).unwrap();
        assert!(geometry.face_uvs.iter().all(Option::is_none));
        assert_eq!(
            geometry.face_normals,
            vec![Some(Vector4::new(0.0, 0.0, 1.0, 1.0)); 3]
        );
    }

    #[test]
    fn holes_are_tracked_per_polygon() {
        let text = "
v 0 0 0
v 1 0 0
v 0 1 0
vt 0.5 0.5
f 1 2 3
f 1/1 2/1 3/1
";
        let geometry = parse_obj(text).unwrap();
        assert_eq!(&geometry.face_uvs[..3], &[None, None, None]);
        assert_eq!(
            &geometry.face_uvs[3..],
            &[Some(Vector2::new(0.5, 0.5)); 3]
        );
        let flat = geometry.flattened_uvs();
        assert_eq!(flat.len(), 12);
        assert_eq!(&flat[..6], &[0.0; 6]);
    }

    #[test]
    fn usemtl_records_the_accumulated_stream_offset() {
        let text = "
v 0 0 0
v 1 0 0
v 0 1 0
v 1 1 0
usemtl first
f 1 2 3
f 2 4 3
usemtl second
f 1 2 4 3
";
        let geometry = parse_obj(text).unwrap();
        let offsets: Vec<(usize, &str)> = geometry
            .material_switches
            .iter()
            .map(|(offset, name)| (*offset, name.as_str()))
            .collect();
        assert_eq!(offsets, vec![(0, "first"), (6, "second")]);
        assert_eq!(geometry.vertex_count(), 12);
    }

    #[test]
    fn later_usemtl_at_same_offset_wins() {
        let geometry = parse_obj("usemtl a\nusemtl b\n").unwrap();
        assert_eq!(geometry.material_switches.get(&0).map(String::as_str), Some("b"));
    }

    #[test]
    fn repeated_parses_are_identical() {
        let first = parse_obj(TEXTURED_CUBE_SIDE).unwrap();
        let _other = parse_obj(QUAD).unwrap();
        let second = parse_obj(TEXTURED_CUBE_SIDE).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn out_of_range_face_index_is_malformed() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 99\n";
        let err = parse_obj(text).unwrap_err();
        assert!(matches!(err, SceneError::MalformedInput { line: 4, .. }));
    }

    #[test]
    fn forward_references_are_malformed() {
        let text = "f 1 2 3\nv 0 0 0\nv 1 0 0\nv 0 1 0\n";
        assert!(matches!(
            parse_obj(text),
            Err(SceneError::MalformedInput { line: 1, .. })
        ));
    }

    #[test]
    fn mixed_reference_styles_are_malformed() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\nf 1/1 2//1 3/1\n";
        assert!(matches!(
            parse_obj(text),
            Err(SceneError::MalformedInput { line: 6, .. })
        ));
    }

    #[test]
    fn degenerate_face_is_malformed() {
        let text = "v 0 0 0\nv 1 0 0\nf 1 2\n";
        assert!(parse_obj(text).is_err());
    }

    #[test]
    fn short_vertex_line_is_malformed() {
        assert!(matches!(
            parse_obj("v 1.0 2.0"),
            Err(SceneError::MalformedInput { line: 1, .. })
        ));
    }

    #[test]
    fn unknown_lines_and_comments_are_ignored() {
        let text = "
# header
o car
g body
s off
mtllib car.mtl
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
";
        let geometry = parse_obj(text).unwrap();
        assert_eq!(geometry.triangle_count(), 1);
        assert_eq!(geometry.material_library.as_deref(), Some("car.mtl"));
    }

    #[test]
    fn flattened_positions_keep_w() {
        let geometry = parse_obj("v 1 2 3\nv 4 5 6\nv 7 8 9\nf 1 2 3\n").unwrap();
        let flat = geometry.flattened_positions();
        assert_eq!(flat.len(), 12);
        assert_eq!(&flat[..4], &[1.0, 2.0, 3.0, 1.0]);
    }
}
