pub mod app;
pub mod error;
pub mod loaders;
pub mod math;
pub mod renderer;
pub mod scene;

pub use error::SceneError;
