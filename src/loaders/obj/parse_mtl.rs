use log::debug;

use super::index::{required_argument, scan_floats};
use super::types::{Material, MaterialTable};
use crate::error::SceneError;
use crate::math::Vector4;

/// Parses MTL text into a name-keyed material table.
///
/// Attribute lines apply to the most recent `newmtl`; an attribute before
/// any `newmtl` is malformed.
pub fn parse_mtl(text: &str) -> Result<MaterialTable, SceneError> {
    let mut materials = MaterialTable::new();
    let mut current_material: Option<String> = None;

    for (line_index, raw_line) in text.lines().enumerate() {
        let line_number = line_index + 1;
        let line = raw_line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest),
            None => (line, ""),
        };

        if keyword == "newmtl" {
            let material_name = required_argument(rest, "newmtl", line_number)?;
            materials.insert(material_name.to_string(), Material::default());
            current_material = Some(material_name.to_string());
            continue;
        }

        if !matches!(keyword, "Ka" | "Kd" | "Ks" | "Ns" | "map_Kd") {
            continue;
        }

        let material = current_material
            .as_ref()
            .and_then(|name| materials.get_mut(name))
            .ok_or_else(|| {
                SceneError::malformed(
                    line_number,
                    format!("'{}' appears before any newmtl", keyword),
                )
            })?;

        match keyword {
            "Ka" => material.ka = Some(parse_colour(rest, line_number, "ambient colour")?),
            "Kd" => material.kd = Some(parse_colour(rest, line_number, "diffuse colour")?),
            "Ks" => material.ks = Some(parse_colour(rest, line_number, "specular colour")?),
            "Ns" => {
                let [ns] = scan_floats::<1>(rest, line_number, "shininess")?;
                material.ns = Some(ns);
            }
            "map_Kd" => {
                let diffuse_texture = required_argument(rest, "map_Kd", line_number)?;
                material.diffuse_texture = Some(diffuse_texture.to_string());
            }
            _ => unreachable!("filtered above"),
        }
    }

    debug!("parsed MTL: {} materials", materials.len());
    Ok(materials)
}

fn parse_colour(rest: &str, line_number: usize, label: &str) -> Result<Vector4, SceneError> {
    let [r, g, b] = scan_floats::<3>(rest, line_number, label)?;
    Ok(Vector4::new(r, g, b, 1.0))
}
