//! Application window and event loop management.

mod input;
mod render;

pub(super) use std::sync::Arc;

pub(super) use pollster::FutureExt;
pub(super) use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowId},
};

pub(super) use ssao_core::{CameraState, InputEvent, InputState, Key, Options, PointLight};
pub(super) use ssao_render::RenderEngine;

pub use input::map_key;

use crate::error::{Result, ViewerError};
use crate::scene::Scene;

/// The viewer application state.
pub struct App {
    pub(super) options: Options,
    pub(super) scene: Scene,
    pub(super) window: Option<Arc<Window>>,
    pub(super) engine: Option<RenderEngine>,
    pub(super) close_requested: bool,
    /// First setup-fatal error; ends the event loop.
    pub(super) error: Option<ViewerError>,
    pub(super) input: InputState,
    pub(super) camera: CameraState,
    pub(super) light: PointLight,
    // Unbounded pointer position built from raw motion while the cursor is grabbed
    pub(super) pointer: (f64, f64),
    // Frame timing for movement
    pub(super) last_frame_time: Option<std::time::Instant>,
    // Screenshot state
    pub(super) screenshot_counter: u32,
}

impl App {
    /// Creates a new application.
    pub fn new(options: Options, scene: Scene) -> Self {
        let camera = CameraState::new(&options.camera);
        let light = options.light;
        Self {
            options,
            scene,
            window: None,
            engine: None,
            close_requested: false,
            error: None,
            input: InputState::new(),
            camera,
            light,
            pointer: (0.0, 0.0),
            last_frame_time: None,
            screenshot_counter: 0,
        }
    }

    /// Returns the next auto-generated screenshot filename.
    pub(super) fn next_screenshot_name(&mut self) -> String {
        let filename = format!("screenshot_{:04}.png", self.screenshot_counter);
        self.screenshot_counter += 1;
        filename
    }

    /// Records a setup-fatal error and stops the loop.
    pub(super) fn fail(&mut self, event_loop: &ActiveEventLoop, error: ViewerError) {
        log::error!("{error}");
        self.error.get_or_insert(error);
        self.close_requested = true;
        event_loop.exit();
    }
}

/// Opens the window and runs until close is requested.
pub fn run_app(options: Options, scene: Scene) -> Result<()> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(options, scene);

    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
