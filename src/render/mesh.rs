use glam::{Vec2, Vec3};
use std::mem::size_of;
use std::rc::Rc;

use super::backend::{BufferTarget, GlBackend};
use super::shaders::ShaderProgram;

/// Attribute layout shared with `assets/shaders/mesh.vert`.
pub const POSITION_LOCATION: u32 = 0;
pub const NORMAL_LOCATION: u32 = 1;
pub const TEX_COORD_LOCATION: u32 = 2;

const FLOATS_PER_VERTEX: usize = 8;

/// Anything that can issue its own draw calls against a bound program.
pub trait Renderable {
    fn draw(&self, program: &ShaderProgram);
}

#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tex_coords: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Axis-aligned cube centred on the origin, four vertices per face so
    /// every face gets its own normal.
    pub fn cube(size: f32) -> Self {
        let h = size * 0.5;
        let faces: [(Vec3, Vec3, Vec3); 6] = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];

        let mut mesh = Self::new();
        for (normal, u, v) in faces {
            let base = mesh.vertices.len() as u32;
            let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
            for (s, t) in corners {
                mesh.vertices.push((normal + u * s + v * t) * h);
                mesh.normals.push(normal);
                mesh.tex_coords.push(Vec2::new((s + 1.0) * 0.5, (t + 1.0) * 0.5));
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }

    /// Position, normal, uv per vertex. Missing normals/uvs are zero-filled.
    pub fn interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.vertices.len() * FLOATS_PER_VERTEX);
        for (i, position) in self.vertices.iter().enumerate() {
            let normal = self.normals.get(i).copied().unwrap_or(Vec3::ZERO);
            let uv = self.tex_coords.get(i).copied().unwrap_or(Vec2::ZERO);
            out.extend_from_slice(&position.to_array());
            out.extend_from_slice(&normal.to_array());
            out.extend_from_slice(&uv.to_array());
        }
        out
    }
}

/// GPU copy of a [`MeshData`]: one VAO with an interleaved VBO and an EBO.
pub struct GpuMesh {
    vao: u32,
    vbo: u32,
    ebo: u32,
    index_count: i32,
    gl: Rc<dyn GlBackend>,
}

impl GpuMesh {
    pub fn upload(gl: Rc<dyn GlBackend>, data: &MeshData) -> Self {
        let vertices = data.interleaved();
        let stride = (FLOATS_PER_VERTEX * size_of::<f32>()) as i32;

        let vao = gl.create_vertex_array();
        let vbo = gl.create_buffer();
        let ebo = gl.create_buffer();

        gl.bind_vertex_array(vao);
        gl.bind_buffer(BufferTarget::Array, vbo);
        gl.buffer_data(BufferTarget::Array, bytemuck::cast_slice(&vertices));
        gl.bind_buffer(BufferTarget::ElementArray, ebo);
        gl.buffer_data(BufferTarget::ElementArray, bytemuck::cast_slice(&data.indices));

        gl.vertex_attrib(POSITION_LOCATION, 3, stride, 0);
        gl.vertex_attrib(NORMAL_LOCATION, 3, stride, 3 * size_of::<f32>());
        gl.vertex_attrib(TEX_COORD_LOCATION, 2, stride, 6 * size_of::<f32>());

        gl.bind_vertex_array(0);

        log::debug!(
            "Uploaded mesh: {} vertices, {} indices",
            data.vertices.len(),
            data.indices.len()
        );

        Self {
            vao,
            vbo,
            ebo,
            index_count: data.indices.len() as i32,
            gl,
        }
    }

    pub fn index_count(&self) -> i32 {
        self.index_count
    }
}

impl Renderable for GpuMesh {
    fn draw(&self, _program: &ShaderProgram) {
        self.gl.bind_vertex_array(self.vao);
        self.gl.draw_indexed_triangles(self.index_count);
        self.gl.bind_vertex_array(0);
    }
}

impl Drop for GpuMesh {
    fn drop(&mut self) {
        self.gl.delete_buffer(self.ebo);
        self.gl.delete_buffer(self.vbo);
        self.gl.delete_vertex_array(self.vao);
    }
}
