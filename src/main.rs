use anyhow::{Context as _, Result};
use glutin::{
    config::{Config, ConfigTemplateBuilder},
    context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version},
    display::{GetGlDisplay, GlDisplay},
    prelude::*,
    surface::{Surface, WindowSurface},
};
use glutin_winit::{DisplayBuilder, GlWindow};
use log::{error, info, LevelFilter};
use raw_window_handle::HasRawWindowHandle;
use simple_logger::SimpleLogger;
use glam::DVec2;
use std::{
    ffi::CString,
    num::NonZeroU32,
    path::Path,
    ptr,
    rc::Rc,
    time::Instant,
};
use winit::{
    dpi::LogicalSize,
    event::{DeviceEvent, ElementState, Event, KeyEvent, MouseScrollDelta, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::PhysicalKey,
    window::{CursorGrabMode, Window, WindowBuilder},
};

use flycam::{
    assets::{AssetResolver, ShaderSources},
    config::{core::CONFIG_FILE, DemoConfig},
    engine::{FrameLoop, Present, Scene},
    input::{InputEvent, Key, VirtualCursor},
    render::{
        backend::{GlBackend, GlFunctions},
        debug::DebugHook,
        mesh::{GpuMesh, MeshData},
        shaders::ShaderProgram,
    },
    utils::error::DemoError,
};

/// Trackpads report pixels; this brings them near one wheel notch.
const PIXELS_PER_SCROLL_LINE: f32 = 0.01;

/// Context and surface the frames are presented through.
struct GlTarget {
    gl_context: PossiblyCurrentContext,
    gl_surface: Surface<WindowSurface>,
}

impl Present for GlTarget {
    fn present(&mut self) -> flycam::Result<()> {
        self.gl_surface
            .swap_buffers(&self.gl_context)
            .map_err(|e| DemoError::Present(e.to_string()))
    }
}

// Field order is drop order: GL objects, then the surface and context, then
// the window they were created from.
struct App {
    scene: Scene,
    debug_hook: Option<DebugHook>,
    target: GlTarget,
    window: Window,
    frame_loop: FrameLoop,
    /// Present while the cursor is grabbed.
    virtual_cursor: Option<VirtualCursor>,
    start: Instant,
    exit_error: Option<DemoError>,
}

impl App {
    fn new(config: &DemoConfig, event_loop: &EventLoop<()>) -> flycam::Result<Self> {
        let window_builder = WindowBuilder::new()
            .with_title(&config.window.title)
            .with_inner_size(LogicalSize::new(config.window.width, config.window.height));

        let template = ConfigTemplateBuilder::new()
            .with_alpha_size(8)
            .with_depth_size(24);

        let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));

        let (window, gl_config) = display_builder
            .build(event_loop, template, pick_config)
            .map_err(|e| DemoError::WindowCreation(e.to_string()))?;

        let window = window
            .ok_or_else(|| DemoError::WindowCreation("no window was created".to_string()))?;
        let raw_window_handle = window.raw_window_handle();

        let (major, minor) = config.window.gl_version;
        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
            .with_profile(GlProfile::Core)
            .with_debug(true)
            .build(Some(raw_window_handle));

        let gl_display = gl_config.display();

        let gl_context = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
            .map_err(|e| DemoError::WindowCreation(format!("OpenGL {major}.{minor} context: {e}")))?;

        let attrs = window.build_surface_attributes(<_>::default());
        let gl_surface = unsafe { gl_display.create_window_surface(&gl_config, &attrs) }
            .map_err(|e| DemoError::WindowCreation(format!("window surface: {e}")))?;

        let gl_context = gl_context
            .make_current(&gl_surface)
            .map_err(|e| DemoError::WindowCreation(format!("make current: {e}")))?;

        let functions = GlFunctions::load(|symbol| match CString::new(symbol) {
            Ok(symbol) => gl_display.get_proc_address(symbol.as_c_str()),
            Err(_) => ptr::null(),
        })?;
        info!("OpenGL {major}.{minor} core context ready");

        let debug_hook = DebugHook::install(config.render.debug);
        functions.enable_depth_test();

        let centre = DVec2::new(
            f64::from(config.window.width) / 2.0,
            f64::from(config.window.height) / 2.0,
        );
        let virtual_cursor = (config.window.grab_cursor && grab_cursor(&window))
            .then(|| VirtualCursor::new(centre));

        let gl: Rc<dyn GlBackend> = Rc::new(functions);
        let scene = build_scene(config, gl.clone());
        let frame_loop = FrameLoop::new(config, gl);

        Ok(Self {
            scene,
            debug_hook: Some(debug_hook),
            target: GlTarget {
                gl_context,
                gl_surface,
            },
            window,
            frame_loop,
            virtual_cursor,
            start: Instant::now(),
            exit_error: None,
        })
    }

    fn handle_window_event(&mut self, event: WindowEvent, elwt: &EventLoopWindowTarget<()>) {
        match event {
            WindowEvent::CloseRequested => self.frame_loop.push_event(InputEvent::CloseRequested),
            WindowEvent::Resized(size) => {
                if let (Some(width), Some(height)) =
                    (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                {
                    self.target
                        .gl_surface
                        .resize(&self.target.gl_context, width, height);
                }
                self.frame_loop.push_event(InputEvent::Resized {
                    width: size.width,
                    height: size.height,
                });
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                if let Some(key) = Key::from_key_code(code) {
                    self.frame_loop.push_event(InputEvent::Key {
                        key,
                        pressed: state == ElementState::Pressed,
                    });
                }
            }
            // While grabbed, look comes from raw motion instead
            WindowEvent::CursorMoved { position, .. } if self.virtual_cursor.is_none() => {
                self.frame_loop.push_event(InputEvent::CursorMoved {
                    x: position.x,
                    y: position.y,
                });
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * PIXELS_PER_SCROLL_LINE,
                };
                self.frame_loop.push_event(InputEvent::Scroll { y });
            }
            WindowEvent::RedrawRequested => self.redraw(elwt),
            _ => (),
        }
    }

    fn handle_mouse_motion(&mut self, (dx, dy): (f64, f64)) {
        if let Some(cursor) = self.virtual_cursor.as_mut() {
            let position = cursor.apply_motion(dx, dy);
            self.frame_loop.push_event(InputEvent::CursorMoved {
                x: position.x,
                y: position.y,
            });
        }
    }

    fn redraw(&mut self, elwt: &EventLoopWindowTarget<()>) {
        let now = self.start.elapsed().as_secs_f64();

        if let Err(e) = self
            .frame_loop
            .run_frame(now, &mut self.scene, &mut self.target)
        {
            self.fail(e, elwt);
            return;
        }

        if let Some(message) = self.debug_hook.as_ref().and_then(DebugHook::take_fault) {
            self.fail(DemoError::DriverFault(message), elwt);
            return;
        }

        if self.frame_loop.should_close() {
            elwt.exit();
        }
    }

    fn fail(&mut self, e: DemoError, elwt: &EventLoopWindowTarget<()>) {
        error!("{}", e);
        self.exit_error.get_or_insert(e);
        elwt.exit();
    }

    /// Releases GPU objects while the context is still current, then the
    /// debug callback. Context, surface and window go when `self` is dropped,
    /// in field order.
    fn shutdown(mut self) -> Option<DemoError> {
        if let Err(e) = self.target.gl_context.make_current(&self.target.gl_surface) {
            error!("Could not make context current for teardown: {}", e);
        }
        self.scene.release();
        self.debug_hook.take();
        info!(
            "Shut down after {} frames",
            self.frame_loop.frame_count()
        );
        self.exit_error.take()
    }
}

/// Prefers the config with the most samples.
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|accum, config| {
            if config.num_samples() > accum.num_samples() {
                config
            } else {
                accum
            }
        })
        .expect("glutin only calls the picker with at least one config")
}

/// Returns whether the cursor is now grabbed.
fn grab_cursor(window: &Window) -> bool {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    window.set_cursor_visible(false);
    match grabbed {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Cursor grab unavailable, using window cursor positions: {}", e);
            false
        }
    }
}

/// Shader and cube for the demo. A program that fails to build is logged and
/// left out, so frames are still cleared and presented.
fn build_scene(config: &DemoConfig, gl: Rc<dyn GlBackend>) -> Scene {
    let resolver = AssetResolver::from_config(&config.assets);
    let sources = ShaderSources::load_or_empty(&resolver, &config.assets);

    let program = match ShaderProgram::compile(gl.clone(), &sources.vertex, &sources.fragment) {
        Ok(program) => Some(program),
        Err(e) => {
            error!("{}", e);
            None
        }
    };

    let mesh = GpuMesh::upload(gl, &MeshData::cube(1.0));
    Scene::new(program, Some(Box::new(mesh)))
}

fn main() -> Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()?;
    info!("Initializing application...");

    let config = DemoConfig::load_or_default(Path::new(CONFIG_FILE));

    let event_loop = EventLoop::new().context("creating the event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(&config, &event_loop)?;

    let run_result = event_loop.run(|event, elwt| match event {
        Event::WindowEvent { event, .. } => app.handle_window_event(event, elwt),
        Event::DeviceEvent {
            event: DeviceEvent::MouseMotion { delta },
            ..
        } => app.handle_mouse_motion(delta),
        Event::AboutToWait => app.window.request_redraw(),
        _ => (),
    });

    let exit_error = app.shutdown();
    run_result?;

    match exit_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
