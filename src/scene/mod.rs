mod driver;
mod entity;
mod lighting;

pub use driver::{FrameMatrices, SceneDriver, SceneToggles};
pub use entity::{
    DrawContext, DrawReport, Entity, EntityGeometry, LoadState, TransformPropagation,
};
pub use lighting::{
    bind_material, fallback_material, material_uniforms, resolve_material, Light,
    MaterialUniforms,
};
