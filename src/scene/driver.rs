use futures::future::try_join_all;
use log::info;

use super::entity::{DrawContext, DrawReport, Entity, TransformPropagation};
use super::lighting::Light;
use crate::error::SceneError;
use crate::loaders::AssetSource;
use crate::math::{Matrix4, Vector3, Vector4};
use crate::renderer::backend::{ProgramHandle, RenderBackend};

const TRACK_STEP: f32 = 0.05;
const TRACK_RADIUS: f32 = 3.0;
const CAMERA_ABOVE_CAR: f32 = 0.5;

const FIELD_OF_VIEW_DEGREES: f32 = 90.0;
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 20.0;

/// Per-frame switches flipped by the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneToggles {
    pub lighting: bool,
    pub car_moving: bool,
    pub camera_on_car: bool,
}

impl Default for SceneToggles {
    fn default() -> Self {
        Self {
            lighting: true,
            car_moving: false,
            camera_on_car: false,
        }
    }
}

impl SceneToggles {
    pub fn toggle_lighting(&mut self) {
        self.lighting = !self.lighting;
        info!("Toggling lighting: {}", on_off(self.lighting));
    }

    pub fn toggle_car_movement(&mut self) {
        self.car_moving = !self.car_moving;
        info!("Toggling car movement: {}", on_off(self.car_moving));
    }

    pub fn toggle_camera(&mut self) {
        self.camera_on_car = !self.camera_on_car;
        info!("Toggling camera position: {}", on_off(self.camera_on_car));
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMatrices {
    pub view: Matrix4,
    pub projection: Matrix4,
}

/// Owns the root entities and advances the car and camera each frame.
#[derive(Debug)]
pub struct SceneDriver {
    roots: Vec<Entity>,
    car: Option<usize>,
    track: f32,
    aspect_ratio: f32,
    light: Light,
    propagation: TransformPropagation,
}

impl SceneDriver {
    /// `car` indexes into `roots`; that entity is driven around the track.
    pub fn new(roots: Vec<Entity>, car: Option<usize>) -> Self {
        let car = car.filter(|&index| index < roots.len());
        Self {
            roots,
            car,
            track: 0.0,
            aspect_ratio: 1.0,
            light: Light::default(),
            propagation: TransformPropagation::default(),
        }
    }

    /// A car circling a street with a lamp on it.
    pub fn street_scene() -> Self {
        let car = Entity::new("car.obj").with_materials("car.mtl");
        let street = Entity::new("street.obj")
            .with_materials("street.mtl")
            .with_child(Entity::new("lamp.obj").with_materials("lamp.mtl"));

        Self::new(vec![car, street], Some(0))
    }

    pub fn with_propagation(mut self, propagation: TransformPropagation) -> Self {
        self.propagation = propagation;
        self
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            self.aspect_ratio = aspect_ratio;
        }
    }

    pub fn roots(&self) -> &[Entity] {
        &self.roots
    }

    pub fn car(&self) -> Option<&Entity> {
        self.car.map(|index| &self.roots[index])
    }

    pub fn track(&self) -> f32 {
        self.track
    }

    /// Sets up every root concurrently; each root loads its own subtree.
    pub async fn setup<S: AssetSource>(&mut self, source: &S) -> Result<(), SceneError> {
        try_join_all(self.roots.iter_mut().map(|root| root.setup(source))).await?;
        info!("scene ready with {} root entities", self.roots.len());
        Ok(())
    }

    /// Advances the car along its circle and computes this frame's camera.
    pub fn update(&mut self, toggles: &SceneToggles) -> FrameMatrices {
        if toggles.car_moving {
            self.track -= TRACK_STEP;
        }

        let car_transform = Matrix4::from_angle_y(self.track)
            * Matrix4::from_translation(Vector3::new(TRACK_RADIUS, 0.0, 0.0));

        let view = match self.car {
            Some(index) => {
                self.roots[index].set_transform(car_transform);
                if toggles.camera_on_car {
                    follow_view(&car_transform)
                } else {
                    overview()
                }
            }
            None => overview(),
        };

        FrameMatrices {
            view,
            projection: Matrix4::perspective(
                FIELD_OF_VIEW_DEGREES,
                self.aspect_ratio,
                NEAR_PLANE,
                FAR_PLANE,
            ),
        }
    }

    pub fn draw<B: RenderBackend>(
        &self,
        backend: &mut B,
        program: ProgramHandle,
        frame: &FrameMatrices,
        toggles: &SceneToggles,
    ) -> Result<DrawReport, SceneError> {
        let context = DrawContext {
            program,
            view: frame.view,
            projection: frame.projection,
            light: self.light,
            lighting_enabled: toggles.lighting,
            propagation: self.propagation,
        };

        let mut report = DrawReport::default();
        for root in &self.roots {
            report.merge(root.draw(backend, &context)?);
        }
        Ok(report)
    }
}

fn overview() -> Matrix4 {
    let eye = Vector3::new(5.5, 3.5, 5.5 * (-0.5f32).sin());
    Matrix4::look_at(eye, Vector3::zero(), Vector3::unit_y())
}

/// Looks straight down at the car from just above it. The car's heading is
/// used as "up" since world up is parallel to the line of sight.
fn follow_view(car_transform: &Matrix4) -> Matrix4 {
    let at = car_transform.transform_point(Vector3::zero());
    let eye = Matrix4::from_translation(Vector3::new(0.0, CAMERA_ABOVE_CAR, 0.0))
        .transform_point(at);
    let heading = (*car_transform * Vector4::new(0.0, 0.0, 1.0, 0.0)).truncate();
    Matrix4::look_at(eye, at, heading)
}
