use glam::{DVec2, Mat4};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::{
    config::{DemoConfig, RenderConfig},
    input::{InputEvent, InputState, Key},
    render::{
        backend::GlBackend,
        camera::Camera,
        mesh::Renderable,
        shaders::ShaderProgram,
    },
    utils::error::Result,
};

/// Hands a finished frame to the window system.
pub trait Present {
    fn present(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTiming {
    last_frame: f64,
    delta_time: f32,
}

impl FrameTiming {
    /// Records `now` (seconds on a monotonic clock) and returns the time
    /// since the previous call. A clock that steps backwards yields zero.
    /// Only the difference is narrowed to `f32`.
    pub fn advance(&mut self, now: f64) -> f32 {
        self.delta_time = (now - self.last_frame).max(0.0) as f32;
        self.last_frame = now;
        self.delta_time
    }

    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    pub fn last_frame(&self) -> f64 {
        self.last_frame
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: u32,
    height: u32,
    aspect_ratio: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        let mut viewport = Self {
            width: 1,
            height: 1,
            aspect_ratio: 1.0,
        };
        viewport.resize(width, height);
        viewport
    }

    /// Returns `false` for a degenerate (minimised) size, which keeps the
    /// previous aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.width = width;
        self.height = height;
        self.aspect_ratio = width as f32 / height as f32;
        true
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMatrices {
    pub projection: Mat4,
    pub view: Mat4,
    pub model: Mat4,
}

/// GPU resources drawn every frame. Either may be absent when loading
/// degraded; a scene without a program only clears.
#[derive(Default)]
pub struct Scene {
    program: Option<ShaderProgram>,
    mesh: Option<Box<dyn Renderable>>,
}

impl Scene {
    pub fn new(program: Option<ShaderProgram>, mesh: Option<Box<dyn Renderable>>) -> Self {
        Self { program, mesh }
    }

    pub fn program(&self) -> Option<&ShaderProgram> {
        self.program.as_ref()
    }

    pub fn has_mesh(&self) -> bool {
        self.mesh.is_some()
    }

    /// Drops the program and mesh, deleting their GL objects. Must run while
    /// the context is current. Safe to call more than once.
    pub fn release(&mut self) {
        let released = self.program.take().is_some() | self.mesh.take().is_some();
        if released {
            log::info!("Released scene GPU resources");
        }
    }
}

/// Per-frame simulate-then-render driver and the state it owns.
pub struct FrameLoop {
    pub camera: Camera,
    pub input: InputState,
    timing: FrameTiming,
    viewport: Viewport,
    events: VecDeque<InputEvent>,
    close_requested: bool,
    frame_count: u64,
    render: RenderConfig,
    gl: Rc<dyn GlBackend>,
}

impl FrameLoop {
    pub fn new(config: &DemoConfig, gl: Rc<dyn GlBackend>) -> Self {
        let (width, height) = (config.window.width, config.window.height);
        let centre = DVec2::new(width as f64 / 2.0, height as f64 / 2.0);

        Self {
            camera: Camera::from_config(&config.camera),
            input: InputState::new(centre),
            timing: FrameTiming::default(),
            viewport: Viewport::new(width, height),
            events: VecDeque::new(),
            close_requested: false,
            frame_count: 0,
            render: config.render.clone(),
            gl,
        }
    }

    /// Queues an event for the next frame.
    pub fn push_event(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    pub fn request_close(&mut self) {
        if !self.close_requested {
            log::info!("Close requested");
        }
        self.close_requested = true;
    }

    pub fn should_close(&self) -> bool {
        self.close_requested
    }

    pub fn timing(&self) -> FrameTiming {
        self.timing
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// One iteration: timing, input, movement, clear, uniforms, draw, present.
    ///
    /// Matrices are uploaded before the draw so a frame is rendered with its
    /// own camera state.
    pub fn run_frame(&mut self, now: f64, scene: &mut Scene, target: &mut dyn Present) -> Result<()> {
        let delta_time = self.timing.advance(now);

        self.drain_events();

        for movement in self.input.active_movements() {
            self.camera.process_keyboard(movement, delta_time);
        }

        self.gl.clear(self.render.clear_color);

        if let Some(program) = scene.program.as_mut() {
            let matrices = self.matrices();
            program.activate();
            program.set_uniform_mat4("projection", &matrices.projection);
            program.set_uniform_mat4("view", &matrices.view);
            program.set_uniform_mat4("model", &matrices.model);

            if let Some(mesh) = scene.mesh.as_ref() {
                mesh.draw(program);
            }
        }

        target.present()?;
        self.frame_count += 1;
        Ok(())
    }

    pub fn matrices(&self) -> FrameMatrices {
        FrameMatrices {
            projection: Mat4::perspective_rh_gl(
                self.camera.zoom().to_radians(),
                self.viewport.aspect_ratio(),
                self.render.near_plane,
                self.render.far_plane,
            ),
            view: self.camera.view_matrix(),
            model: Mat4::from_rotation_y(self.render.model_rotation.to_radians()),
        }
    }

    fn drain_events(&mut self) {
        while let Some(event) = self.events.pop_front() {
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::Key { key, pressed } => {
                if key == Key::Escape && pressed {
                    self.request_close();
                }
                self.input.keys.set(key, pressed);
            }
            InputEvent::CursorMoved { x, y } => {
                let (x_offset, y_offset) = self.input.cursor_offset(x, y);
                self.camera.process_mouse_movement(x_offset, y_offset);
            }
            InputEvent::Scroll { y } => self.camera.process_mouse_scroll(y),
            InputEvent::Resized { width, height } => {
                if self.viewport.resize(width, height) {
                    self.gl.viewport(width as i32, height as i32);
                } else {
                    log::debug!("Ignoring degenerate resize to {}x{}", width, height);
                }
            }
            InputEvent::CloseRequested => self.request_close(),
        }
    }
}
