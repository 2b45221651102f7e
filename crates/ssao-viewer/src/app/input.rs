use super::{
    ActiveEventLoop, App, ApplicationHandler, Arc, CursorGrabMode, DeviceEvent, DeviceId, ElementState, FutureExt,
    InputEvent, Key, KeyCode, PhysicalKey, PhysicalSize, RenderEngine, Window, WindowEvent, WindowId,
};

/// Translates a physical key to the viewer's key set.
#[must_use]
pub fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::Space => Some(Key::Space),
        KeyCode::ShiftLeft => Some(Key::LeftShift),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::F12 => Some(Key::F12),
        KeyCode::Digit1 => Some(Key::Digit1),
        KeyCode::Digit2 => Some(Key::Digit2),
        KeyCode::Digit3 => Some(Key::Digit3),
        KeyCode::BracketLeft => Some(Key::BracketLeft),
        KeyCode::BracketRight => Some(Key::BracketRight),
        KeyCode::Minus => Some(Key::Minus),
        KeyCode::Equal => Some(Key::Equal),
        KeyCode::Comma => Some(Key::Comma),
        KeyCode::Period => Some(Key::Period),
        _ => None,
    }
}

/// Hides the cursor and keeps it inside the window, falling back to locking it.
fn grab_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Confined)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked));
    if let Err(err) = grabbed {
        log::warn!("cursor grab unavailable: {err}");
    }
    window.set_cursor_visible(false);
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title(self.options.title.clone())
            .with_inner_size(PhysicalSize::new(self.options.width, self.options.height));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => return self.fail(event_loop, err.into()),
        };

        // Create render engine
        let mut engine = match RenderEngine::new_windowed(window.clone(), &self.options).block_on() {
            Ok(engine) => engine,
            Err(err) => return self.fail(event_loop, err.into()),
        };
        self.scene.add_to(&mut engine);

        grab_cursor(&window);
        window.request_redraw();

        self.window = Some(window);
        self.engine = Some(engine);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.close_requested = true;
            }
            WindowEvent::Resized(size) => {
                if let Some(engine) = &mut self.engine {
                    engine.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.repeat {
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key {
                    if let Some(key) = map_key(code) {
                        self.input.handle(match event.state {
                            ElementState::Pressed => InputEvent::KeyPressed(key),
                            ElementState::Released => InputEvent::KeyReleased(key),
                        });
                    }
                }
            }
            WindowEvent::Focused(true) => {
                if let Some(window) = &self.window {
                    grab_cursor(window);
                }
            }
            WindowEvent::RedrawRequested => {
                self.render();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }

        if self.close_requested {
            event_loop.exit();
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.pointer.0 += delta.0;
            self.pointer.1 += delta.1;
            self.input.handle(InputEvent::PointerMoved {
                x: self.pointer.0,
                y: self.pointer.1,
            });
        }
    }
}
