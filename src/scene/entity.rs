use std::cell::RefCell;
use std::collections::HashSet;

use futures::future::{FutureExt, LocalBoxFuture};
use log::{debug, info, warn};

use super::lighting::{bind_material, resolve_material, Light};
use crate::error::SceneError;
use crate::loaders::{parse_mtl, parse_obj, AssetSource, GeometryResult, MaterialTable};
use crate::math::Matrix4;
use crate::renderer::backend::{ProgramHandle, RenderBackend};
use crate::renderer::shaders::{
    MODEL_MATRIX, NORMAL_ATTRIBUTE, POSITION_ATTRIBUTE, PROJECTION_MATRIX, UV_ATTRIBUTE,
    VIEW_MATRIX,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Ready,
}

/// How an entity's uploaded model matrix relates to its ancestors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformPropagation {
    /// Each entity uploads its own local transform.
    #[default]
    Independent,
    /// `world(child) = world(parent) * local(child)`.
    Composed,
}

/// Per-frame inputs shared by every entity drawn in one pass.
#[derive(Debug, Clone, Copy)]
pub struct DrawContext {
    pub program: ProgramHandle,
    pub view: Matrix4,
    pub projection: Matrix4,
    pub light: Light,
    pub lighting_enabled: bool,
    pub propagation: TransformPropagation,
}

/// What one draw traversal did, plus the problems it worked around.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawReport {
    pub triangles: usize,
    pub material_switches: usize,
    pub diagnostics: Vec<SceneError>,
}

impl DrawReport {
    pub fn merge(&mut self, other: DrawReport) {
        self.triangles += other.triangles;
        self.material_switches += other.material_switches;
        self.diagnostics.extend(other.diagnostics);
    }
}

/// Parsed data an entity owns once it is ready, with the attribute arrays
/// flattened once up front.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityGeometry {
    pub geometry: GeometryResult,
    pub materials: MaterialTable,
    positions: Vec<f32>,
    normals: Vec<f32>,
    uvs: Vec<f32>,
}

impl EntityGeometry {
    pub fn new(geometry: GeometryResult, materials: MaterialTable) -> Self {
        let positions = geometry.flattened_positions();
        let normals = geometry.flattened_normals();
        let uvs = geometry.flattened_uvs();
        Self {
            geometry,
            materials,
            positions,
            normals,
            uvs,
        }
    }
}

/// Scene graph node: a model loaded from an `.obj`/`.mtl` pair, placed by a
/// local transform, owning its children.
#[derive(Debug, Clone)]
pub struct Entity {
    obj_file: String,
    mtl_file: Option<String>,
    transform: Matrix4,
    state: LoadState,
    geometry: Option<EntityGeometry>,
    children: Vec<Entity>,
    /// Material problems already logged at `warn!` since the last setup.
    warned: RefCell<HashSet<String>>,
}

impl Entity {
    pub fn new(obj_file: impl Into<String>) -> Self {
        Self {
            obj_file: obj_file.into(),
            mtl_file: None,
            transform: Matrix4::identity(),
            state: LoadState::Unloaded,
            geometry: None,
            children: Vec::new(),
            warned: RefCell::new(HashSet::new()),
        }
    }

    /// Material file to load instead of the geometry's own `mtllib`.
    pub fn with_materials(mut self, mtl_file: impl Into<String>) -> Self {
        self.mtl_file = Some(mtl_file.into());
        self
    }

    pub fn with_transform(mut self, transform: Matrix4) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_child(mut self, child: Entity) -> Self {
        self.children.push(child);
        self
    }

    pub fn add_child(&mut self, child: Entity) {
        self.children.push(child);
    }

    pub fn obj_file(&self) -> &str {
        &self.obj_file
    }

    pub fn mtl_file(&self) -> Option<&str> {
        self.mtl_file.as_deref()
    }

    pub fn transform(&self) -> &Matrix4 {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Matrix4) {
        self.transform = transform;
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn geometry(&self) -> Option<&EntityGeometry> {
        self.geometry.as_ref()
    }

    pub fn children(&self) -> &[Entity] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Entity] {
        &mut self.children
    }

    /// Loads this entity's files, then its children's one after another.
    ///
    /// On failure the entity that failed is left `Unloaded` and the error is
    /// returned; children after it are not attempted. Dropping the future
    /// before it finishes also leaves the entity `Unloaded`.
    pub fn setup<'a, S: AssetSource>(
        &'a mut self,
        source: &'a S,
    ) -> LocalBoxFuture<'a, Result<(), SceneError>> {
        async move {
            let Entity {
                obj_file,
                mtl_file,
                state,
                geometry,
                children,
                warned,
                ..
            } = self;

            let loading = LoadingGuard::begin(state);
            *geometry = None;
            warned.get_mut().clear();
            info!("setting up {}", obj_file);

            *geometry = Some(load_geometry(obj_file, mtl_file.as_deref(), source).await?);
            loading.finish();

            for child in children.iter_mut() {
                child.setup(source).await?;
            }
            Ok(())
        }
        .boxed_local()
    }

    /// Draws the children, then this entity.
    pub fn draw<B: RenderBackend>(
        &self,
        backend: &mut B,
        context: &DrawContext,
    ) -> Result<DrawReport, SceneError> {
        let mut report = DrawReport::default();
        self.draw_tree(backend, context, &Matrix4::identity(), &mut report)?;
        Ok(report)
    }

    fn draw_tree<B: RenderBackend>(
        &self,
        backend: &mut B,
        context: &DrawContext,
        parent_world: &Matrix4,
        report: &mut DrawReport,
    ) -> Result<(), SceneError> {
        let loaded = match (self.state, &self.geometry) {
            (LoadState::Ready, Some(loaded)) => loaded,
            _ => {
                return Err(SceneError::UsageError(format!(
                    "{} drawn before setup completed",
                    self.obj_file
                )))
            }
        };

        let world = match context.propagation {
            TransformPropagation::Independent => self.transform,
            TransformPropagation::Composed => *parent_world * self.transform,
        };

        for child in &self.children {
            child.draw_tree(backend, context, &world, report)?;
        }

        self.draw_own(backend, context, loaded, &world, report);
        Ok(())
    }

    fn draw_own<B: RenderBackend>(
        &self,
        backend: &mut B,
        context: &DrawContext,
        loaded: &EntityGeometry,
        world: &Matrix4,
        report: &mut DrawReport,
    ) {
        backend.use_program(context.program);

        let positions = backend.create_buffer();
        backend.upload_floats(positions, POSITION_ATTRIBUTE, 4, &loaded.positions);
        let uvs = backend.create_buffer();
        backend.upload_floats(uvs, UV_ATTRIBUTE, 2, &loaded.uvs);
        let normals = backend.create_buffer();
        backend.upload_floats(normals, NORMAL_ATTRIBUTE, 4, &loaded.normals);

        backend.bind_placeholder_texture();

        backend.set_uniform_mat4(MODEL_MATRIX, world);
        backend.set_uniform_mat4(VIEW_MATRIX, &context.view);
        backend.set_uniform_mat4(PROJECTION_MATRIX, &context.projection);

        let geometry = &loaded.geometry;
        for offset in (0..geometry.vertex_count()).step_by(3) {
            if let Some(name) = geometry.material_switches.get(&offset) {
                debug!("{}: switching to {} at {}", self.obj_file, name, offset);
                self.use_material(backend, context, loaded, name, report);
                report.material_switches += 1;
            }
            backend.draw_triangles(offset, 3);
            report.triangles += 1;
        }
    }

    fn use_material<B: RenderBackend>(
        &self,
        backend: &mut B,
        context: &DrawContext,
        loaded: &EntityGeometry,
        name: &str,
        report: &mut DrawReport,
    ) {
        let (uniforms, problems) = resolve_material(
            name,
            loaded.materials.get(name),
            &context.light,
            context.lighting_enabled,
        );
        for problem in problems {
            if self.warned.borrow_mut().insert(problem.to_string()) {
                warn!("{}: {}, using the fallback material", self.obj_file, problem);
            } else {
                debug!("{}: {}, using the fallback material", self.obj_file, problem);
            }
            report.diagnostics.push(problem);
        }
        bind_material(backend, &uniforms);
    }
}

/// Holds an entity in `Loading` and puts it back to `Unloaded` unless
/// [`LoadingGuard::finish`] runs first.
struct LoadingGuard<'e> {
    state: &'e mut LoadState,
}

impl<'e> LoadingGuard<'e> {
    fn begin(state: &'e mut LoadState) -> Self {
        *state = LoadState::Loading;
        Self { state }
    }

    fn finish(self) {
        *self.state = LoadState::Ready;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if *self.state == LoadState::Loading {
            *self.state = LoadState::Unloaded;
        }
    }
}

async fn load_geometry<S: AssetSource>(
    obj_file: &str,
    mtl_file: Option<&str>,
    source: &S,
) -> Result<EntityGeometry, SceneError> {
    let obj_text = source.fetch_text(obj_file).await?;
    let geometry = parse_obj(&obj_text)?;

    let mtl_name = mtl_file
        .map(str::to_string)
        .or_else(|| geometry.material_library.clone());
    let materials = match mtl_name {
        Some(name) => parse_mtl(&source.fetch_text(&name).await?)?,
        None => MaterialTable::new(),
    };

    Ok(EntityGeometry::new(geometry, materials))
}
