#[cfg(feature = "window")]
mod runtime;

pub mod backend;
pub mod gl_backend;
pub mod recording;
pub mod shader_program;
pub mod shaders;

pub use backend::{BufferHandle, ProgramHandle, RenderBackend};
pub use gl_backend::GlBackend;
pub use recording::{DrawCommand, RecordingBackend};
#[cfg(feature = "window")]
pub use runtime::{run, WindowSettings};
pub use shader_program::{compile_and_link_program, ShaderProgram};
