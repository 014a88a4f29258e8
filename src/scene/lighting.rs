use crate::error::SceneError;
use crate::loaders::Material;
use crate::math::Vector4;
use crate::renderer::backend::RenderBackend;
use crate::renderer::shaders::{
    AMBIENT_PRODUCT, DIFFUSE_PRODUCT, LIGHT_POSITION, SHININESS, SPECULAR_PRODUCT,
};

/// Single point light shared by every entity in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vector4,
    pub ambient: Vector4,
    pub diffuse: Vector4,
    pub specular: Vector4,
}

impl Default for Light {
    fn default() -> Self {
        Light {
            position: Vector4::new(0.0, 3.0, 0.0, 1.0),
            ambient: Vector4::new(0.1, 0.1, 0.1, 1.0),
            diffuse: Vector4::new(1.0, 1.0, 1.0, 1.0),
            specular: Vector4::new(1.0, 1.0, 1.0, 1.0),
        }
    }
}

/// Material used in place of a missing record or field.
pub fn fallback_material() -> Material {
    Material {
        ka: Some(Vector4::new(0.2, 0.2, 0.2, 1.0)),
        kd: Some(Vector4::new(0.8, 0.8, 0.8, 1.0)),
        ks: Some(Vector4::new(0.0, 0.0, 0.0, 1.0)),
        ns: Some(1.0),
        diffuse_texture: None,
    }
}

/// Values uploaded when a material becomes active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialUniforms {
    pub ambient_product: Vector4,
    pub diffuse_product: Vector4,
    pub specular_product: Vector4,
    pub light_position: Vector4,
    pub shininess: f32,
}

/// Computes the products for `name`, failing on the first missing record or
/// field the current lighting mode needs.
pub fn material_uniforms(
    name: &str,
    material: Option<&Material>,
    light: &Light,
    lighting_enabled: bool,
) -> Result<MaterialUniforms, SceneError> {
    let (uniforms, mut problems) = resolve_material(name, material, light, lighting_enabled);
    if problems.is_empty() {
        Ok(uniforms)
    } else {
        Err(problems.remove(0))
    }
}

/// Like [`material_uniforms`], but substitutes [`fallback_material`] values
/// for whatever is missing and returns the problems alongside.
pub fn resolve_material(
    name: &str,
    material: Option<&Material>,
    light: &Light,
    lighting_enabled: bool,
) -> (MaterialUniforms, Vec<SceneError>) {
    let fallback = fallback_material();
    let mut problems = Vec::new();

    let material = match material {
        Some(material) => material,
        None => {
            problems.push(SceneError::MissingMaterial(name.to_string()));
            &fallback
        }
    };

    let mut field = |value: Option<Vector4>, default: Option<Vector4>, label: &'static str| {
        value.unwrap_or_else(|| {
            problems.push(SceneError::MissingMaterialField {
                material: name.to_string(),
                field: label,
            });
            default.unwrap_or_default()
        })
    };

    let (ambient_product, diffuse_product) = if lighting_enabled {
        let ka = field(material.ka, fallback.ka, "Ka");
        let kd = field(material.kd, fallback.kd, "Kd");
        (light.ambient.mul_elementwise(ka), light.diffuse.mul_elementwise(kd))
    } else {
        (Vector4::zero(), Vector4::zero())
    };
    let ks = field(material.ks, fallback.ks, "Ks");

    let shininess = material.ns.unwrap_or_else(|| {
        problems.push(SceneError::MissingMaterialField {
            material: name.to_string(),
            field: "Ns",
        });
        fallback.ns.unwrap_or(1.0)
    });

    let uniforms = MaterialUniforms {
        ambient_product,
        diffuse_product,
        specular_product: light.specular.mul_elementwise(ks),
        light_position: light.position,
        shininess,
    };
    (uniforms, problems)
}

pub fn bind_material<B: RenderBackend>(backend: &mut B, uniforms: &MaterialUniforms) {
    backend.set_uniform_vec4(DIFFUSE_PRODUCT, &uniforms.diffuse_product);
    backend.set_uniform_vec4(AMBIENT_PRODUCT, &uniforms.ambient_product);
    backend.set_uniform_vec4(SPECULAR_PRODUCT, &uniforms.specular_product);
    backend.set_uniform_vec4(LIGHT_POSITION, &uniforms.light_position);
    backend.set_uniform_float(SHININESS, uniforms.shininess);
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::renderer::recording::RecordingBackend;

    fn red_plastic() -> Material {
        Material {
            ka: Some(Vector4::new(1.0, 0.0, 0.0, 1.0)),
            kd: Some(Vector4::new(0.5, 0.0, 0.0, 1.0)),
            ks: Some(Vector4::new(0.25, 0.25, 0.25, 1.0)),
            ns: Some(32.0),
            diffuse_texture: None,
        }
    }

    #[test]
    fn lit_products_multiply_light_by_material() {
        let material = red_plastic();
        let uniforms = material_uniforms("Red", Some(&material), &Light::default(), true).unwrap();

        assert_relative_eq!(uniforms.ambient_product.x, 0.1);
        assert_relative_eq!(uniforms.ambient_product.y, 0.0);
        assert_relative_eq!(uniforms.diffuse_product.x, 0.5);
        assert_relative_eq!(uniforms.specular_product.z, 0.25);
        assert_relative_eq!(uniforms.shininess, 32.0);
        assert_eq!(uniforms.light_position, Vector4::new(0.0, 3.0, 0.0, 1.0));
    }

    #[test]
    fn unlit_products_zero_ambient_and_diffuse_but_keep_specular() {
        let material = red_plastic();
        let uniforms = material_uniforms("Red", Some(&material), &Light::default(), false).unwrap();

        assert_eq!(uniforms.ambient_product, Vector4::zero());
        assert_eq!(uniforms.diffuse_product, Vector4::zero());
        assert_relative_eq!(uniforms.specular_product.x, 0.25);
    }

    #[test]
    fn unlit_mode_does_not_require_ambient_or_diffuse() {
        let material = Material {
            ks: Some(Vector4::new(1.0, 1.0, 1.0, 1.0)),
            ns: Some(4.0),
            ..Material::default()
        };
        assert!(material_uniforms("Chrome", Some(&material), &Light::default(), false).is_ok());

        let error = material_uniforms("Chrome", Some(&material), &Light::default(), true).unwrap_err();
        assert_eq!(
            error,
            SceneError::MissingMaterialField {
                material: "Chrome".to_string(),
                field: "Ka",
            }
        );
    }

    #[test]
    fn missing_material_reports_and_falls_back() {
        let (uniforms, problems) = resolve_material("Ghost", None, &Light::default(), true);

        assert_eq!(problems, vec![SceneError::MissingMaterial("Ghost".to_string())]);
        assert_relative_eq!(uniforms.diffuse_product.x, 0.8);
        assert_relative_eq!(uniforms.shininess, 1.0);
    }

    #[test]
    fn missing_fields_are_each_reported() {
        let material = Material {
            kd: Some(Vector4::new(1.0, 0.0, 0.0, 1.0)),
            ..Material::default()
        };
        let (uniforms, problems) = resolve_material("A", Some(&material), &Light::default(), true);

        let fields: Vec<_> = problems
            .iter()
            .map(|problem| match problem {
                SceneError::MissingMaterialField { field, .. } => *field,
                other => panic!("unexpected problem {other:?}"),
            })
            .collect();
        assert_eq!(fields, vec!["Ka", "Ks", "Ns"]);
        assert_relative_eq!(uniforms.diffuse_product.x, 1.0);
        assert_relative_eq!(uniforms.ambient_product.x, 0.02, epsilon = 1e-6);
    }

    #[test]
    fn binding_uploads_every_uniform() {
        let material = red_plastic();
        let uniforms = material_uniforms("Red", Some(&material), &Light::default(), true).unwrap();
        let mut backend = RecordingBackend::new();
        bind_material(&mut backend, &uniforms);

        assert_eq!(backend.vec4_uniforms(DIFFUSE_PRODUCT), vec![uniforms.diffuse_product]);
        assert_eq!(backend.vec4_uniforms(AMBIENT_PRODUCT), vec![uniforms.ambient_product]);
        assert_eq!(backend.vec4_uniforms(SPECULAR_PRODUCT), vec![uniforms.specular_product]);
        assert_eq!(backend.vec4_uniforms(LIGHT_POSITION), vec![uniforms.light_position]);
        assert_eq!(backend.float_uniforms(SHININESS), vec![32.0]);
    }
}
