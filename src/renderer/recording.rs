use super::backend::{BufferHandle, ProgramHandle, RenderBackend};
use crate::math::{Matrix4, Vector4};

/// One call received by a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    UseProgram(ProgramHandle),
    CreateBuffer(BufferHandle),
    UploadFloats {
        buffer: BufferHandle,
        attribute: String,
        components: usize,
        data: Vec<f32>,
    },
    BindPlaceholderTexture,
    UniformMat4 { name: String, value: Matrix4 },
    UniformVec4 { name: String, value: Vector4 },
    UniformFloat { name: String, value: f32 },
    DrawTriangles { first: usize, count: usize },
}

/// Headless backend that records every call in order.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub commands: Vec<DrawCommand>,
    next_buffer: u32,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn draw_calls(&self) -> Vec<(usize, usize)> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::DrawTriangles { first, count } => Some((*first, *count)),
                _ => None,
            })
            .collect()
    }

    /// Every value set for the named mat4 uniform, in call order.
    pub fn mat4_uniforms(&self, uniform: &str) -> Vec<Matrix4> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::UniformMat4 { name, value } if name == uniform => Some(*value),
                _ => None,
            })
            .collect()
    }

    /// Every value set for the named vec4 uniform, in call order.
    pub fn vec4_uniforms(&self, uniform: &str) -> Vec<Vector4> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::UniformVec4 { name, value } if name == uniform => Some(*value),
                _ => None,
            })
            .collect()
    }

    pub fn float_uniforms(&self, uniform: &str) -> Vec<f32> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::UniformFloat { name, value } if name == uniform => Some(*value),
                _ => None,
            })
            .collect()
    }

    pub fn uploads(&self, attribute: &str) -> Vec<&[f32]> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                DrawCommand::UploadFloats {
                    attribute: uploaded,
                    data,
                    ..
                } if uploaded == attribute => Some(data.as_slice()),
                _ => None,
            })
            .collect()
    }
}

impl RenderBackend for RecordingBackend {
    fn use_program(&mut self, program: ProgramHandle) {
        self.commands.push(DrawCommand::UseProgram(program));
    }

    fn create_buffer(&mut self) -> BufferHandle {
        self.next_buffer += 1;
        let buffer = BufferHandle(self.next_buffer);
        self.commands.push(DrawCommand::CreateBuffer(buffer));
        buffer
    }

    fn upload_floats(&mut self, buffer: BufferHandle, attribute: &str, components: usize, data: &[f32]) {
        self.commands.push(DrawCommand::UploadFloats {
            buffer,
            attribute: attribute.to_string(),
            components,
            data: data.to_vec(),
        });
    }

    fn bind_placeholder_texture(&mut self) {
        self.commands.push(DrawCommand::BindPlaceholderTexture);
    }

    fn set_uniform_mat4(&mut self, name: &str, value: &Matrix4) {
        self.commands.push(DrawCommand::UniformMat4 {
            name: name.to_string(),
            value: *value,
        });
    }

    fn set_uniform_vec4(&mut self, name: &str, value: &Vector4) {
        self.commands.push(DrawCommand::UniformVec4 {
            name: name.to_string(),
            value: *value,
        });
    }

    fn set_uniform_float(&mut self, name: &str, value: f32) {
        self.commands.push(DrawCommand::UniformFloat {
            name: name.to_string(),
            value,
        });
    }

    fn draw_triangles(&mut self, first: usize, count: usize) {
        self.commands.push(DrawCommand::DrawTriangles { first, count });
    }
}
