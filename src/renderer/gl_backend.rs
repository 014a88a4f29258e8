use std::collections::HashMap;
use std::ffi::CString;
use std::os::raw::c_void;
use std::ptr;

use gl::types::*;
use image::{Rgba, RgbaImage};
use log::error;

use super::backend::{BufferHandle, ProgramHandle, RenderBackend};
use super::shaders::PLACEHOLDER_SAMPLER;
use crate::math::{Matrix4, Vector4};

/// OpenGL implementation of [`RenderBackend`]. Needs a current context for
/// its whole lifetime.
///
/// Buffers are pooled: `begin_frame` rewinds the pool so the next frame's
/// `create_buffer` calls reuse the same GL names.
pub struct GlBackend {
    vao: u32,
    buffers: Vec<u32>,
    next_buffer: usize,
    program: u32,
    placeholder_texture: u32,
    uniform_locations: HashMap<(u32, String), GLint>,
}

impl GlBackend {
    pub fn new() -> Self {
        let mut vao = 0;
        unsafe {
            gl::GenVertexArrays(1, &mut vao);
            gl::BindVertexArray(vao);
        }

        Self {
            vao,
            buffers: Vec::new(),
            next_buffer: 0,
            program: 0,
            placeholder_texture: 0,
            uniform_locations: HashMap::new(),
        }
    }

    pub fn begin_frame(&mut self) {
        self.next_buffer = 0;
        unsafe { gl::BindVertexArray(self.vao) };
    }

    fn uniform_location(&mut self, name: &str) -> GLint {
        let program = self.program;
        *self
            .uniform_locations
            .entry((program, name.to_string()))
            .or_insert_with(|| match gl_identifier(name) {
                Ok(c_name) => unsafe { gl::GetUniformLocation(program, c_name.as_ptr()) },
                Err(message) => {
                    error!("{}", message);
                    // GL ignores uploads to location -1
                    -1
                }
            })
    }

    fn create_placeholder_texture(&mut self) {
        let image = placeholder_image();
        let mut texture = 0;
        unsafe {
            gl::GenTextures(1, &mut texture);
            gl::BindTexture(gl::TEXTURE_2D, texture);
            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                gl::RGBA as i32,
                image.width() as i32,
                image.height() as i32,
                0,
                gl::RGBA,
                gl::UNSIGNED_BYTE,
                image.as_raw().as_ptr() as *const c_void,
            );
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::NEAREST as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::NEAREST as i32);
        }
        self.placeholder_texture = texture;
    }
}

impl Default for GlBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn gl_identifier(name: &str) -> Result<CString, String> {
    CString::new(name).map_err(|e| format!("GL identifier '{}' contains null byte: {}", name, e))
}

/// 2x2 texture: blue everywhere except a red top-right texel.
pub fn placeholder_image() -> RgbaImage {
    RgbaImage::from_fn(2, 2, |x, y| {
        if (x, y) == (1, 0) {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 255, 255])
        }
    })
}

impl RenderBackend for GlBackend {
    fn use_program(&mut self, program: ProgramHandle) {
        self.program = program.0;
        unsafe { gl::UseProgram(program.0) };
    }

    fn create_buffer(&mut self) -> BufferHandle {
        if self.next_buffer == self.buffers.len() {
            let mut buffer = 0;
            unsafe { gl::GenBuffers(1, &mut buffer) };
            self.buffers.push(buffer);
        }
        let buffer = self.buffers[self.next_buffer];
        self.next_buffer += 1;
        BufferHandle(buffer)
    }

    fn upload_floats(&mut self, buffer: BufferHandle, attribute: &str, components: usize, data: &[f32]) {
        let c_name = match gl_identifier(attribute) {
            Ok(c_name) => c_name,
            Err(message) => {
                error!("{}", message);
                return;
            }
        };
        unsafe {
            gl::BindBuffer(gl::ARRAY_BUFFER, buffer.0);
            upload_buffer_data(gl::ARRAY_BUFFER, data);

            let location = gl::GetAttribLocation(self.program, c_name.as_ptr());
            // attributes the compiler optimised out report -1
            if location >= 0 {
                gl::VertexAttribPointer(
                    location as GLuint,
                    components as GLint,
                    gl::FLOAT,
                    gl::FALSE,
                    0,
                    ptr::null(),
                );
                gl::EnableVertexAttribArray(location as GLuint);
            }
        }
    }

    fn bind_placeholder_texture(&mut self) {
        if self.placeholder_texture == 0 {
            self.create_placeholder_texture();
        }
        let sampler = self.uniform_location(PLACEHOLDER_SAMPLER);
        unsafe {
            gl::ActiveTexture(gl::TEXTURE0);
            gl::BindTexture(gl::TEXTURE_2D, self.placeholder_texture);
            gl::Uniform1i(sampler, 0);
        }
    }

    fn set_uniform_mat4(&mut self, name: &str, value: &Matrix4) {
        let location = self.uniform_location(name);
        unsafe { gl::UniformMatrix4fv(location, 1, gl::FALSE, value.as_ptr()) };
    }

    fn set_uniform_vec4(&mut self, name: &str, value: &Vector4) {
        let location = self.uniform_location(name);
        unsafe { gl::Uniform4f(location, value.x, value.y, value.z, value.w) };
    }

    fn set_uniform_float(&mut self, name: &str, value: f32) {
        let location = self.uniform_location(name);
        unsafe { gl::Uniform1f(location, value) };
    }

    fn draw_triangles(&mut self, first: usize, count: usize) {
        unsafe { gl::DrawArrays(gl::TRIANGLES, first as GLint, count as GLsizei) };
    }
}

unsafe fn upload_buffer_data<T>(target: u32, data: &[T]) {
    let size = (std::mem::size_of_val(data)) as isize;
    let ptr = if data.is_empty() {
        ptr::null()
    } else {
        data.as_ptr() as *const c_void
    };

    unsafe {
        gl::BufferData(target, size, ptr, gl::DYNAMIC_DRAW);
    }
}

impl Drop for GlBackend {
    fn drop(&mut self) {
        unsafe {
            if !self.buffers.is_empty() {
                gl::DeleteBuffers(self.buffers.len() as GLsizei, self.buffers.as_ptr());
            }
            if self.placeholder_texture != 0 {
                gl::DeleteTextures(1, &self.placeholder_texture);
            }
            if self.vao != 0 {
                gl::DeleteVertexArrays(1, &self.vao);
            }
        }
    }
}
