use crate::math::{Matrix4, Vector4};

/// Linked shader program as known to the graphics context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferHandle(pub u32);

/// The graphics calls the scene graph issues while drawing.
///
/// Uniform setters apply to the program last passed to `use_program`.
pub trait RenderBackend {
    fn use_program(&mut self, program: ProgramHandle);

    fn create_buffer(&mut self) -> BufferHandle;

    /// Fills `buffer` with `data` and binds it to the named vertex attribute,
    /// `components` floats per vertex.
    fn upload_floats(&mut self, buffer: BufferHandle, attribute: &str, components: usize, data: &[f32]);

    fn bind_placeholder_texture(&mut self);

    fn set_uniform_mat4(&mut self, name: &str, value: &Matrix4);

    fn set_uniform_vec4(&mut self, name: &str, value: &Vector4);

    fn set_uniform_float(&mut self, name: &str, value: f32);

    /// Draws `count` vertices of the bound attributes starting at `first`.
    fn draw_triangles(&mut self, first: usize, count: usize);
}
