//! Recording [`GlBackend`] for tests that never touch a real context.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ffi::CStr;

use super::backend::{BufferTarget, GlBackend, ShaderStage};

#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    CreateShader(ShaderStage, u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader(u32, u32),
    LinkProgram(u32),
    UseProgram(u32),
    DeleteProgram(u32),
    UniformLocation(String),
    UniformMatrix4(i32, [f32; 16]),
    UniformVec3(i32, [f32; 3]),
    Uniform1f(i32, f32),
    CreateVertexArray(u32),
    BindVertexArray(u32),
    DeleteVertexArray(u32),
    CreateBuffer(u32),
    BindBuffer(BufferTarget, u32),
    BufferData(BufferTarget, usize),
    DeleteBuffer(u32),
    VertexAttrib(u32, i32, i32, usize),
    DrawIndexed(i32),
    Clear([f32; 4]),
    Viewport(i32, i32),
}

/// Pretends to be a GL driver.
///
/// A shader "compiles" when its source declares `void main` and its braces
/// balance; a program "links" unless `fail_link` is set. Uniform locations
/// are handed out for the names registered with [`FakeGl::with_uniforms`].
#[derive(Debug, Default)]
pub struct FakeGl {
    next_name: Cell<u32>,
    sources: RefCell<HashMap<u32, String>>,
    uniforms: HashMap<String, i32>,
    pub fail_link: Cell<bool>,
    pub info_log_len: Cell<Option<usize>>,
    pub calls: RefCell<Vec<GlCall>>,
}

impl FakeGl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_uniforms(names: &[&str]) -> Self {
        let uniforms = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), i as i32))
            .collect();
        Self {
            uniforms,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<GlCall> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&GlCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn position(&self, pred: impl Fn(&GlCall) -> bool) -> Option<usize> {
        self.calls.borrow().iter().position(pred)
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn record(&self, call: GlCall) {
        self.calls.borrow_mut().push(call);
    }

    fn fresh_name(&self) -> u32 {
        let name = self.next_name.get() + 1;
        self.next_name.set(name);
        name
    }

    fn source_is_valid(source: &str) -> bool {
        let opens = source.matches('{').count();
        let closes = source.matches('}').count();
        source.contains("void main") && opens == closes
    }

    // An overridden length ignores `max_len`, like a driver that overfills.
    fn diagnostic(&self, base: String, max_len: usize) -> String {
        match self.info_log_len.get() {
            Some(len) => "E".repeat(len),
            None => base.chars().take(max_len).collect(),
        }
    }
}

impl GlBackend for FakeGl {
    fn create_shader(&self, stage: ShaderStage) -> u32 {
        let name = self.fresh_name();
        self.record(GlCall::CreateShader(stage, name));
        name
    }

    fn shader_source(&self, shader: u32, source: &CStr) {
        self.sources
            .borrow_mut()
            .insert(shader, source.to_string_lossy().into_owned());
    }

    fn compile_shader(&self, _shader: u32) {}

    fn shader_compiled(&self, shader: u32) -> bool {
        self.sources
            .borrow()
            .get(&shader)
            .map(|s| Self::source_is_valid(s))
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: u32, max_len: usize) -> String {
        if self.shader_compiled(shader) {
            return String::new();
        }
        self.diagnostic(format!("0:1(1): error: syntax error in shader {shader}"), max_len)
    }

    fn delete_shader(&self, shader: u32) {
        self.record(GlCall::DeleteShader(shader));
    }

    fn create_program(&self) -> u32 {
        let name = self.fresh_name();
        self.record(GlCall::CreateProgram(name));
        name
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.record(GlCall::AttachShader(program, shader));
    }

    fn link_program(&self, program: u32) {
        self.record(GlCall::LinkProgram(program));
    }

    fn program_linked(&self, _program: u32) -> bool {
        !self.fail_link.get()
    }

    fn program_info_log(&self, _program: u32, max_len: usize) -> String {
        if !self.fail_link.get() {
            return String::new();
        }
        self.diagnostic("error: vertex output 'Normal' not read by fragment".to_string(), max_len)
    }

    fn use_program(&self, program: u32) {
        self.record(GlCall::UseProgram(program));
    }

    fn delete_program(&self, program: u32) {
        self.record(GlCall::DeleteProgram(program));
    }

    fn uniform_location(&self, _program: u32, name: &CStr) -> i32 {
        let name = name.to_string_lossy().into_owned();
        let location = self.uniforms.get(&name).copied().unwrap_or(-1);
        self.record(GlCall::UniformLocation(name));
        location
    }

    fn uniform_matrix4(&self, location: i32, value: &[f32; 16]) {
        self.record(GlCall::UniformMatrix4(location, *value));
    }

    fn uniform_vec3(&self, location: i32, value: &[f32; 3]) {
        self.record(GlCall::UniformVec3(location, *value));
    }

    fn uniform_1f(&self, location: i32, value: f32) {
        self.record(GlCall::Uniform1f(location, value));
    }

    fn create_vertex_array(&self) -> u32 {
        let name = self.fresh_name();
        self.record(GlCall::CreateVertexArray(name));
        name
    }

    fn bind_vertex_array(&self, vao: u32) {
        self.record(GlCall::BindVertexArray(vao));
    }

    fn delete_vertex_array(&self, vao: u32) {
        self.record(GlCall::DeleteVertexArray(vao));
    }

    fn create_buffer(&self) -> u32 {
        let name = self.fresh_name();
        self.record(GlCall::CreateBuffer(name));
        name
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: u32) {
        self.record(GlCall::BindBuffer(target, buffer));
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8]) {
        self.record(GlCall::BufferData(target, data.len()));
    }

    fn delete_buffer(&self, buffer: u32) {
        self.record(GlCall::DeleteBuffer(buffer));
    }

    fn vertex_attrib(&self, index: u32, components: i32, stride: i32, offset: usize) {
        self.record(GlCall::VertexAttrib(index, components, stride, offset));
    }

    fn draw_indexed_triangles(&self, count: i32) {
        self.record(GlCall::DrawIndexed(count));
    }

    fn clear(&self, color: [f32; 4]) {
        self.record(GlCall::Clear(color));
    }

    fn viewport(&self, width: i32, height: i32) {
        self.record(GlCall::Viewport(width, height));
    }
}
