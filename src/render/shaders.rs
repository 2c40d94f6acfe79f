// shaders.rs - GLSL program compilation and uniform upload

use glam::{Mat4, Vec3};
use std::collections::HashMap;
use std::ffi::CString;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

use super::backend::{GlBackend, ShaderStage};

/// Upper bound on the diagnostic text kept per stage or link step.
pub const INFO_LOG_CAPACITY: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    pub stage: ShaderStage,
    pub log: String,
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.log)
    }
}

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("Shader compilation failed: {}", join_failures(.failures))]
    Compilation { failures: Vec<StageFailure> },
    #[error("Program linking failed: {0}")]
    Linking(String),
}

fn join_failures(failures: &[StageFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn clip_log(mut log: String) -> String {
    if log.len() > INFO_LOG_CAPACITY {
        let mut end = INFO_LOG_CAPACITY;
        while !log.is_char_boundary(end) {
            end -= 1;
        }
        log.truncate(end);
    }
    if log.is_empty() {
        log.push_str("(driver returned no info log)");
    }
    log
}

/// A linked vertex + fragment program.
///
/// Only [`ShaderProgram::compile`] produces one, so holding a value means the
/// GL program linked successfully. The program is deleted on drop.
pub struct ShaderProgram {
    id: u32,
    uniforms: HashMap<String, i32>,
    gl: Rc<dyn GlBackend>,
}

impl fmt::Debug for ShaderProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("id", &self.id)
            .field("uniforms", &self.uniforms)
            .finish()
    }
}

impl ShaderProgram {
    /// Compiles both stages, then links them.
    ///
    /// Both stages are always compiled so that every stage diagnostic is
    /// reported at once. Linking is attempted only when both compiled.
    pub fn compile(
        gl: Rc<dyn GlBackend>,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, ShaderError> {
        let vertex = Self::compile_stage(gl.as_ref(), ShaderStage::Vertex, vertex_source);
        let fragment = Self::compile_stage(gl.as_ref(), ShaderStage::Fragment, fragment_source);

        let (vertex_shader, fragment_shader) = match (vertex, fragment) {
            (Ok(vertex_shader), Ok(fragment_shader)) => (vertex_shader, fragment_shader),
            (vertex, fragment) => {
                let mut failures = Vec::new();
                for outcome in [vertex, fragment] {
                    match outcome {
                        Ok(shader) => gl.delete_shader(shader),
                        Err(failure) => failures.push(failure),
                    }
                }
                return Err(ShaderError::Compilation { failures });
            }
        };

        let program = gl.create_program();
        gl.attach_shader(program, vertex_shader);
        gl.attach_shader(program, fragment_shader);
        gl.link_program(program);

        // Stage objects are no longer needed once linking has run.
        gl.delete_shader(vertex_shader);
        gl.delete_shader(fragment_shader);

        if !gl.program_linked(program) {
            let log = clip_log(gl.program_info_log(program, INFO_LOG_CAPACITY));
            gl.delete_program(program);
            return Err(ShaderError::Linking(log));
        }

        log::info!("Linked shader program {}", program);

        Ok(ShaderProgram {
            id: program,
            uniforms: HashMap::new(),
            gl,
        })
    }

    fn compile_stage(gl: &dyn GlBackend, stage: ShaderStage, source: &str) -> Result<u32, StageFailure> {
        let source = CString::new(source.as_bytes()).map_err(|e| StageFailure {
            stage,
            log: format!("source contains a NUL byte at offset {}", e.nul_position()),
        })?;

        let shader = gl.create_shader(stage);
        gl.shader_source(shader, &source);
        gl.compile_shader(shader);

        if !gl.shader_compiled(shader) {
            let log = clip_log(gl.shader_info_log(shader, INFO_LOG_CAPACITY));
            gl.delete_shader(shader);
            return Err(StageFailure { stage, log });
        }

        Ok(shader)
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Makes this the program subsequent draws and uniform uploads apply to.
    pub fn activate(&self) {
        self.gl.use_program(self.id);
    }

    /// Looks up (and caches) a uniform location. Misses are cached too.
    pub fn uniform_location(&mut self, name: &str) -> Option<i32> {
        if let Some(location) = self.uniforms.get(name) {
            return (*location >= 0).then_some(*location);
        }

        let location = match CString::new(name) {
            Ok(cname) => self.gl.uniform_location(self.id, &cname),
            Err(_) => -1,
        };

        if location < 0 {
            log::debug!("Uniform '{}' not found in program {}", name, self.id);
        }

        self.uniforms.insert(name.to_string(), location);
        (location >= 0).then_some(location)
    }

    // Uniform setters. Names that do not resolve are ignored, matching GL's
    // own treatment of location -1.
    pub fn set_uniform_mat4(&mut self, name: &str, value: &Mat4) {
        self.activate();
        if let Some(location) = self.uniform_location(name) {
            self.gl.uniform_matrix4(location, &value.to_cols_array());
        }
    }

    pub fn set_uniform_vec3(&mut self, name: &str, value: Vec3) {
        self.activate();
        if let Some(location) = self.uniform_location(name) {
            self.gl.uniform_vec3(location, &value.to_array());
        }
    }

    pub fn set_uniform_1f(&mut self, name: &str, value: f32) {
        self.activate();
        if let Some(location) = self.uniform_location(name) {
            self.gl.uniform_1f(location, value);
        }
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        self.gl.delete_program(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing::{FakeGl, GlCall};

    const VERTEX: &str = r#"
        #version 450 core
        layout (location = 0) in vec3 aPos;
        uniform mat4 model;
        uniform mat4 view;
        uniform mat4 projection;
        void main() {
            gl_Position = projection * view * model * vec4(aPos, 1.0);
        }
    "#;

    const FRAGMENT: &str = r#"
        #version 450 core
        out vec4 FragColor;
        void main() {
            FragColor = vec4(1.0);
        }
    "#;

    const BROKEN: &str = "#version 450 core\nvoid main() { gl_Position = vec4(1.0;";

    fn backend(uniforms: &[&str]) -> (Rc<FakeGl>, Rc<dyn GlBackend>) {
        let fake = Rc::new(FakeGl::with_uniforms(uniforms));
        let gl: Rc<dyn GlBackend> = fake.clone();
        (fake, gl)
    }

    #[test]
    fn test_compile_and_link() {
        let (fake, gl) = backend(&[]);
        let program = ShaderProgram::compile(gl, VERTEX, FRAGMENT).unwrap();

        assert_eq!(fake.count(|c| matches!(c, GlCall::LinkProgram(_))), 1);
        // Both stage objects are released after linking
        assert_eq!(fake.count(|c| matches!(c, GlCall::DeleteShader(_))), 2);
        assert_ne!(program.id(), 0);
    }

    #[test]
    fn test_invalid_glsl_reports_compile_error() {
        let (fake, gl) = backend(&[]);
        let err = ShaderProgram::compile(gl, BROKEN, FRAGMENT).unwrap_err();

        match err {
            ShaderError::Compilation { failures } => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].stage, ShaderStage::Vertex);
                assert!(!failures[0].log.is_empty());
            }
            other => panic!("expected compilation error, got {other:?}"),
        }
        assert_eq!(fake.count(|c| matches!(c, GlCall::CreateProgram(_))), 0);
        assert_eq!(fake.count(|c| matches!(c, GlCall::DeleteShader(_))), 2);
    }

    #[test]
    fn test_both_stage_failures_are_reported() {
        let (_fake, gl) = backend(&[]);
        let err = ShaderProgram::compile(gl, BROKEN, "").unwrap_err();

        let ShaderError::Compilation { failures } = err else {
            panic!("expected compilation error");
        };
        let stages: Vec<_> = failures.iter().map(|f| f.stage).collect();
        assert_eq!(stages, vec![ShaderStage::Vertex, ShaderStage::Fragment]);
    }

    #[test]
    fn test_link_failure_releases_program() {
        let (fake, gl) = backend(&[]);
        fake.fail_link.set(true);

        let err = ShaderProgram::compile(gl, VERTEX, FRAGMENT).unwrap_err();
        assert!(matches!(err, ShaderError::Linking(ref log) if log.contains("not read")));
        assert_eq!(fake.count(|c| matches!(c, GlCall::DeleteProgram(_))), 1);
        assert_eq!(fake.count(|c| matches!(c, GlCall::DeleteShader(_))), 2);
    }

    #[test]
    fn test_info_log_is_clipped() {
        let (fake, gl) = backend(&[]);
        fake.info_log_len.set(Some(4096));

        let err = ShaderProgram::compile(gl, BROKEN, FRAGMENT).unwrap_err();
        let ShaderError::Compilation { failures } = err else {
            panic!("expected compilation error");
        };
        assert_eq!(failures[0].log.len(), INFO_LOG_CAPACITY);
    }

    #[test]
    fn test_nul_in_source_is_a_stage_failure() {
        let (_fake, gl) = backend(&[]);
        let err = ShaderProgram::compile(gl, VERTEX, "void main() {}\0").unwrap_err();

        let ShaderError::Compilation { failures } = err else {
            panic!("expected compilation error");
        };
        assert_eq!(failures[0].stage, ShaderStage::Fragment);
        assert!(failures[0].log.contains("NUL"));
    }

    #[test]
    fn test_uniform_lookup_is_cached() {
        let (fake, gl) = backend(&["model"]);
        let mut program = ShaderProgram::compile(gl, VERTEX, FRAGMENT).unwrap();

        program.set_uniform_mat4("model", &Mat4::IDENTITY);
        program.set_uniform_mat4("model", &Mat4::IDENTITY);

        assert_eq!(fake.count(|c| matches!(c, GlCall::UniformLocation(_))), 1);
        assert_eq!(fake.count(|c| matches!(c, GlCall::UniformMatrix4(0, _))), 2);
    }

    #[test]
    fn test_unknown_uniform_is_ignored() {
        let (fake, gl) = backend(&["model"]);
        let mut program = ShaderProgram::compile(gl, VERTEX, FRAGMENT).unwrap();

        program.set_uniform_mat4("missing", &Mat4::IDENTITY);
        program.set_uniform_mat4("missing", &Mat4::IDENTITY);

        assert_eq!(program.uniform_location("missing"), None);
        assert_eq!(fake.count(|c| matches!(c, GlCall::UniformMatrix4(..))), 0);
        assert_eq!(fake.count(|c| matches!(c, GlCall::UniformLocation(_))), 1);
    }

    #[test]
    fn test_matrix_upload_is_column_major() {
        let (fake, gl) = backend(&["view"]);
        let mut program = ShaderProgram::compile(gl, VERTEX, FRAGMENT).unwrap();
        let translation = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));

        program.set_uniform_mat4("view", &translation);

        let uploaded = fake
            .calls()
            .into_iter()
            .find_map(|c| match c {
                GlCall::UniformMatrix4(_, m) => Some(m),
                _ => None,
            })
            .unwrap();
        assert_eq!(&uploaded[12..15], &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_vector_and_scalar_uniforms() {
        let (fake, gl) = backend(&["tint", "time"]);
        let mut program = ShaderProgram::compile(gl, VERTEX, FRAGMENT).unwrap();
        let id = program.id();
        fake.clear_calls();

        program.set_uniform_vec3("tint", Vec3::new(0.2, 0.5, 0.7));
        program.set_uniform_1f("time", 1.5);

        assert_eq!(
            fake.calls(),
            vec![
                GlCall::UseProgram(id),
                GlCall::UniformLocation("tint".to_string()),
                GlCall::UniformVec3(0, [0.2, 0.5, 0.7]),
                GlCall::UseProgram(id),
                GlCall::UniformLocation("time".to_string()),
                GlCall::Uniform1f(1, 1.5),
            ]
        );
    }

    #[test]
    fn test_unknown_vector_and_scalar_uniforms_are_ignored() {
        let (fake, gl) = backend(&["tint"]);
        let mut program = ShaderProgram::compile(gl, VERTEX, FRAGMENT).unwrap();

        program.set_uniform_vec3("colour", Vec3::ONE);
        program.set_uniform_1f("time", 2.0);
        program.set_uniform_1f("time", 3.0);

        assert_eq!(fake.count(|c| matches!(c, GlCall::UniformVec3(..))), 0);
        assert_eq!(fake.count(|c| matches!(c, GlCall::Uniform1f(..))), 0);
        assert_eq!(fake.count(|c| matches!(c, GlCall::UniformLocation(_))), 2);
    }

    #[test]
    fn test_drop_deletes_program() {
        let (fake, gl) = backend(&[]);
        let program = ShaderProgram::compile(gl, VERTEX, FRAGMENT).unwrap();
        let id = program.id();
        drop(program);

        assert_eq!(fake.count(|c| *c == GlCall::DeleteProgram(id)), 1);
    }
}
