use std::ffi::CString;
use std::ptr;

use gl::types::*;
use log::debug;

use super::backend::ProgramHandle;

const INFO_LOG_LEN: usize = 1024;

#[derive(Debug, Clone, Copy)]
enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    fn gl_kind(self) -> GLenum {
        match self {
            Stage::Vertex => gl::VERTEX_SHADER,
            Stage::Fragment => gl::FRAGMENT_SHADER,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Stage::Vertex => "VERTEX",
            Stage::Fragment => "FRAGMENT",
        }
    }
}

/// Linked GL program, deleted on drop.
pub struct ShaderProgram {
    id: u32,
}

impl ShaderProgram {
    pub fn handle(&self) -> ProgramHandle {
        ProgramHandle(self.id)
    }
}

/// Compiles both stages from source and links them. Needs a current GL
/// context.
pub fn compile_and_link_program(
    vertex_source: &str,
    fragment_source: &str,
) -> Result<ShaderProgram, String> {
    let vertex = compile_stage(Stage::Vertex, vertex_source)?;
    let fragment = match compile_stage(Stage::Fragment, fragment_source) {
        Ok(fragment) => fragment,
        Err(error) => {
            unsafe { gl::DeleteShader(vertex) };
            return Err(error);
        }
    };

    unsafe {
        let id = gl::CreateProgram();
        gl::AttachShader(id, vertex);
        gl::AttachShader(id, fragment);
        gl::LinkProgram(id);
        gl::DeleteShader(vertex);
        gl::DeleteShader(fragment);

        // owned from here so a link failure still frees the program
        let program = ShaderProgram { id };
        check_link_errors(id)?;
        debug!("linked shader program {}", id);
        Ok(program)
    }
}

fn compile_stage(stage: Stage, source: &str) -> Result<u32, String> {
    let code = CString::new(source.as_bytes())
        .map_err(|e| format!("{} shader contains null byte: {}", stage.label(), e))?;

    unsafe {
        let shader = gl::CreateShader(stage.gl_kind());
        gl::ShaderSource(shader, 1, &code.as_ptr(), ptr::null());
        gl::CompileShader(shader);

        let mut success = gl::FALSE as GLint;
        gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut success);
        if success != gl::TRUE as GLint {
            let mut info_log = vec![0_u8; INFO_LOG_LEN];
            gl::GetShaderInfoLog(
                shader,
                INFO_LOG_LEN as GLsizei,
                ptr::null_mut(),
                info_log.as_mut_ptr() as *mut GLchar,
            );
            gl::DeleteShader(shader);
            return Err(format!(
                "Shader compilation error ({}): {}",
                stage.label(),
                trim_log(&info_log)
            ));
        }
        Ok(shader)
    }
}

unsafe fn check_link_errors(program: u32) -> Result<(), String> {
    let mut success = gl::FALSE as GLint;
    unsafe {
        gl::GetProgramiv(program, gl::LINK_STATUS, &mut success);
        if success != gl::TRUE as GLint {
            let mut info_log = vec![0_u8; INFO_LOG_LEN];
            gl::GetProgramInfoLog(
                program,
                INFO_LOG_LEN as GLsizei,
                ptr::null_mut(),
                info_log.as_mut_ptr() as *mut GLchar,
            );
            return Err(format!("Program linking error: {}", trim_log(&info_log)));
        }
    }
    Ok(())
}

fn trim_log(info_log: &[u8]) -> String {
    String::from_utf8_lossy(info_log)
        .trim_matches('\0')
        .trim()
        .to_string()
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        if self.id != 0 {
            unsafe {
                gl::DeleteProgram(self.id);
            }
        }
    }
}
