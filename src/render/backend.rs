//! Thin seam over the OpenGL entry points the renderer touches.
//!
//! Everything above this module talks to [`GlBackend`] instead of calling
//! `gl::*` directly, so shader and frame logic can run against a recording
//! backend in tests.

use gl::types::*;
use std::ffi::{c_void, CStr};
use std::fmt;
use std::ptr;

use crate::utils::error::{DemoError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn gl_enum(self) -> GLenum {
        match self {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    Array,
    ElementArray,
}

impl BufferTarget {
    fn gl_enum(self) -> GLenum {
        match self {
            BufferTarget::Array => gl::ARRAY_BUFFER,
            BufferTarget::ElementArray => gl::ELEMENT_ARRAY_BUFFER,
        }
    }
}

/// The subset of OpenGL used by the demo.
///
/// Object names are plain `u32`s and uniform locations `i32`s, exactly as GL
/// hands them out; `-1` is the "no such uniform" location.
pub trait GlBackend {
    fn create_shader(&self, stage: ShaderStage) -> u32;
    fn shader_source(&self, shader: u32, source: &CStr);
    fn compile_shader(&self, shader: u32);
    fn shader_compiled(&self, shader: u32) -> bool;
    fn shader_info_log(&self, shader: u32, max_len: usize) -> String;
    fn delete_shader(&self, shader: u32);

    fn create_program(&self) -> u32;
    fn attach_shader(&self, program: u32, shader: u32);
    fn link_program(&self, program: u32);
    fn program_linked(&self, program: u32) -> bool;
    fn program_info_log(&self, program: u32, max_len: usize) -> String;
    fn use_program(&self, program: u32);
    fn delete_program(&self, program: u32);

    fn uniform_location(&self, program: u32, name: &CStr) -> i32;
    fn uniform_matrix4(&self, location: i32, value: &[f32; 16]);
    fn uniform_vec3(&self, location: i32, value: &[f32; 3]);
    fn uniform_1f(&self, location: i32, value: f32);

    fn create_vertex_array(&self) -> u32;
    fn bind_vertex_array(&self, vao: u32);
    fn delete_vertex_array(&self, vao: u32);
    fn create_buffer(&self) -> u32;
    fn bind_buffer(&self, target: BufferTarget, buffer: u32);
    fn buffer_data(&self, target: BufferTarget, data: &[u8]);
    fn delete_buffer(&self, buffer: u32);
    /// Describes a float attribute of the currently bound array buffer.
    fn vertex_attrib(&self, index: u32, components: i32, stride: i32, offset: usize);
    fn draw_indexed_triangles(&self, count: i32);

    fn clear(&self, color: [f32; 4]);
    fn viewport(&self, width: i32, height: i32);
}

/// [`GlBackend`] over the process-wide function pointers of the `gl` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlFunctions;

impl GlFunctions {
    /// Resolves every GL entry point through `loader` and checks that the
    /// ones the demo cannot live without were found.
    pub fn load<F>(loader: F) -> Result<Self>
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);

        let required = [
            ("glCreateShader", gl::CreateShader::is_loaded()),
            ("glLinkProgram", gl::LinkProgram::is_loaded()),
            ("glUniformMatrix4fv", gl::UniformMatrix4fv::is_loaded()),
            ("glGenVertexArrays", gl::GenVertexArrays::is_loaded()),
            ("glDrawElements", gl::DrawElements::is_loaded()),
            ("glClearBufferfv", gl::ClearBufferfv::is_loaded()),
            ("glViewport", gl::Viewport::is_loaded()),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, loaded)| !loaded)
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(DemoError::GraphicsContextLoad(format!(
                "missing entry points: {}",
                missing.join(", ")
            )));
        }

        Ok(Self)
    }

    /// Global pipeline state the demo relies on.
    pub fn enable_depth_test(&self) {
        unsafe {
            gl::Enable(gl::DEPTH_TEST);
        }
    }
}

fn read_info_log<F>(len: GLint, max_len: usize, fetch: F) -> String
where
    F: FnOnce(GLsizei, *mut GLsizei, *mut GLchar),
{
    let len = (len.max(0) as usize).min(max_len);
    if len == 0 {
        return String::new();
    }

    let mut buffer = vec![0u8; len];
    let mut written: GLsizei = 0;
    fetch(len as GLsizei, &mut written, buffer.as_mut_ptr() as *mut GLchar);
    buffer.truncate(written.max(0) as usize);

    String::from_utf8_lossy(&buffer).trim_end().to_string()
}

impl GlBackend for GlFunctions {
    fn create_shader(&self, stage: ShaderStage) -> u32 {
        unsafe { gl::CreateShader(stage.gl_enum()) }
    }

    fn shader_source(&self, shader: u32, source: &CStr) {
        unsafe {
            gl::ShaderSource(shader, 1, &source.as_ptr(), ptr::null());
        }
    }

    fn compile_shader(&self, shader: u32) {
        unsafe { gl::CompileShader(shader) }
    }

    fn shader_compiled(&self, shader: u32) -> bool {
        let mut success = gl::FALSE as GLint;
        unsafe {
            gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut success);
        }
        success != gl::FALSE as GLint
    }

    fn shader_info_log(&self, shader: u32, max_len: usize) -> String {
        let mut len = 0;
        unsafe {
            gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
        }
        read_info_log(len, max_len, |capacity, written, buffer| unsafe {
            gl::GetShaderInfoLog(shader, capacity, written, buffer);
        })
    }

    fn delete_shader(&self, shader: u32) {
        unsafe { gl::DeleteShader(shader) }
    }

    fn create_program(&self) -> u32 {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        unsafe { gl::AttachShader(program, shader) }
    }

    fn link_program(&self, program: u32) {
        unsafe { gl::LinkProgram(program) }
    }

    fn program_linked(&self, program: u32) -> bool {
        let mut success = gl::FALSE as GLint;
        unsafe {
            gl::GetProgramiv(program, gl::LINK_STATUS, &mut success);
        }
        success != gl::FALSE as GLint
    }

    fn program_info_log(&self, program: u32, max_len: usize) -> String {
        let mut len = 0;
        unsafe {
            gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
        }
        read_info_log(len, max_len, |capacity, written, buffer| unsafe {
            gl::GetProgramInfoLog(program, capacity, written, buffer);
        })
    }

    fn use_program(&self, program: u32) {
        unsafe { gl::UseProgram(program) }
    }

    fn delete_program(&self, program: u32) {
        unsafe { gl::DeleteProgram(program) }
    }

    fn uniform_location(&self, program: u32, name: &CStr) -> i32 {
        unsafe { gl::GetUniformLocation(program, name.as_ptr()) }
    }

    fn uniform_matrix4(&self, location: i32, value: &[f32; 16]) {
        unsafe {
            gl::UniformMatrix4fv(location, 1, gl::FALSE, value.as_ptr());
        }
    }

    fn uniform_vec3(&self, location: i32, value: &[f32; 3]) {
        unsafe {
            gl::Uniform3fv(location, 1, value.as_ptr());
        }
    }

    fn uniform_1f(&self, location: i32, value: f32) {
        unsafe {
            gl::Uniform1f(location, value);
        }
    }

    fn create_vertex_array(&self) -> u32 {
        let mut vao = 0;
        unsafe {
            gl::GenVertexArrays(1, &mut vao);
        }
        vao
    }

    fn bind_vertex_array(&self, vao: u32) {
        unsafe { gl::BindVertexArray(vao) }
    }

    fn delete_vertex_array(&self, vao: u32) {
        unsafe {
            gl::DeleteVertexArrays(1, &vao);
        }
    }

    fn create_buffer(&self) -> u32 {
        let mut buffer = 0;
        unsafe {
            gl::GenBuffers(1, &mut buffer);
        }
        buffer
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: u32) {
        unsafe { gl::BindBuffer(target.gl_enum(), buffer) }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8]) {
        unsafe {
            gl::BufferData(
                target.gl_enum(),
                data.len() as GLsizeiptr,
                data.as_ptr() as *const c_void,
                gl::STATIC_DRAW,
            );
        }
    }

    fn delete_buffer(&self, buffer: u32) {
        unsafe {
            gl::DeleteBuffers(1, &buffer);
        }
    }

    fn vertex_attrib(&self, index: u32, components: i32, stride: i32, offset: usize) {
        unsafe {
            gl::VertexAttribPointer(
                index,
                components,
                gl::FLOAT,
                gl::FALSE,
                stride,
                offset as *const c_void,
            );
            gl::EnableVertexAttribArray(index);
        }
    }

    fn draw_indexed_triangles(&self, count: i32) {
        unsafe {
            gl::DrawElements(gl::TRIANGLES, count, gl::UNSIGNED_INT, ptr::null());
        }
    }

    fn clear(&self, color: [f32; 4]) {
        let depth = 1.0f32;
        unsafe {
            gl::ClearBufferfv(gl::COLOR, 0, color.as_ptr());
            gl::ClearBufferfv(gl::DEPTH, 0, &depth);
        }
    }

    fn viewport(&self, width: i32, height: i32) {
        unsafe { gl::Viewport(0, 0, width, height) }
    }
}
