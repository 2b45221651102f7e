//! Pointer/key input integration.
//!
//! Raw events are collected into an [`InputState`] as they arrive. Once per
//! frame the pending state is drained into a [`FrameInput`], which
//! [`update_camera`] folds into a new [`CameraState`]. Nothing here touches
//! the GPU.

use std::collections::HashSet;

use glam::{Vec2, Vec3};

use crate::camera::CameraState;
use crate::options::SettingsChange;

/// Keys the viewer recognizes. Anything else is dropped at the window layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Move forward.
    W,
    /// Strafe left.
    A,
    /// Move backward.
    S,
    /// Strafe right.
    D,
    /// Move up while held; each press toggles light-follows-camera.
    Space,
    /// Move down.
    LeftShift,
    /// Request close.
    Escape,
    /// Capture the next frame to disk.
    F12,
    /// Toggle the SSAO pass.
    Digit1,
    /// Toggle the blur pass.
    Digit2,
    /// Toggle lighting.
    Digit3,
    /// Shrink / grow the sample radius.
    BracketLeft,
    BracketRight,
    /// Lower / raise the depth bias.
    Minus,
    Equal,
    /// Lower / raise the specular exponent.
    Comma,
    Period,
}

impl Key {
    /// The render setting this key adjusts, if any.
    #[must_use]
    pub fn settings_change(self) -> Option<SettingsChange> {
        match self {
            Key::Digit1 => Some(SettingsChange::ToggleSsao),
            Key::Digit2 => Some(SettingsChange::ToggleBlur),
            Key::Digit3 => Some(SettingsChange::ToggleLighting),
            Key::BracketLeft => Some(SettingsChange::DecreaseRadius),
            Key::BracketRight => Some(SettingsChange::IncreaseRadius),
            Key::Minus => Some(SettingsChange::DecreaseBias),
            Key::Equal => Some(SettingsChange::IncreaseBias),
            Key::Comma => Some(SettingsChange::DecreaseShininess),
            Key::Period => Some(SettingsChange::IncreaseShininess),
            _ => None,
        }
    }
}

/// A discrete input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Absolute pointer position in window pixels.
    PointerMoved { x: f64, y: f64 },
    /// A key went down. Auto-repeat is filtered out before this point.
    KeyPressed(Key),
    /// A key went up.
    KeyReleased(Key),
}

/// Everything the integrator needs for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    /// Pointer offsets `(x, y)` in pixels, in arrival order. Y is already
    /// inverted so positive means "look up".
    pub look_deltas: Vec<Vec2>,
    /// Keys held at the time the frame input was taken.
    pub held: HashSet<Key>,
    /// Whether light-follows-camera was toggled an odd number of times.
    pub toggle_light_follow: bool,
    /// Render setting adjustments in press order.
    pub settings_changes: Vec<SettingsChange>,
}

impl FrameInput {
    /// Returns whether `key` is held this frame.
    #[must_use]
    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }
}

/// Accumulates events between frames.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys_down: HashSet<Key>,
    last_pointer: Option<(f64, f64)>,
    pending_look: Vec<Vec2>,
    pending_follow_toggle: bool,
    pending_settings: Vec<SettingsChange>,
    close_requested: bool,
    capture_requested: bool,
}

impl InputState {
    /// Creates an empty input state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one event.
    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMoved { x, y } => {
                // The first position only seeds the tracker so the view does
                // not jump when the pointer enters the window.
                if let Some((last_x, last_y)) = self.last_pointer {
                    let offset = Vec2::new((x - last_x) as f32, (last_y - y) as f32);
                    self.pending_look.push(offset);
                }
                self.last_pointer = Some((x, y));
            }
            InputEvent::KeyPressed(key) => {
                match key {
                    Key::Escape => self.close_requested = true,
                    Key::Space => self.pending_follow_toggle = !self.pending_follow_toggle,
                    Key::F12 => self.capture_requested = true,
                    _ => self.pending_settings.extend(key.settings_change()),
                }
                self.keys_down.insert(key);
            }
            InputEvent::KeyReleased(key) => {
                self.keys_down.remove(&key);
            }
        }
    }

    /// Returns whether `key` is currently down.
    #[must_use]
    pub fn is_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns whether a close was requested.
    #[must_use]
    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    /// Returns and clears a pending frame capture request.
    pub fn take_capture_request(&mut self) -> bool {
        std::mem::take(&mut self.capture_requested)
    }

    /// Drains the pending pointer deltas and toggles into a frame snapshot.
    pub fn take_frame_input(&mut self) -> FrameInput {
        FrameInput {
            look_deltas: std::mem::take(&mut self.pending_look),
            held: self.keys_down.clone(),
            toggle_light_follow: std::mem::take(&mut self.pending_follow_toggle),
            settings_changes: std::mem::take(&mut self.pending_settings),
        }
    }
}

/// Integrates one frame of input into a new camera state.
///
/// Pointer deltas are applied in order, clamping pitch after each one, then
/// the held movement keys translate the camera by `speed * dt`.
#[must_use]
pub fn update_camera(state: &CameraState, input: &FrameInput, dt: f32) -> CameraState {
    let mut next = *state;
    for delta in &input.look_deltas {
        next = next.rotated(delta.x * next.sensitivity, delta.y * next.sensitivity);
    }

    let distance = next.speed * dt;
    let front = next.front();
    let strafe = front.cross(next.world_up).normalize();
    let mut offset = Vec3::ZERO;
    if input.is_held(Key::W) {
        offset += front;
    }
    if input.is_held(Key::S) {
        offset -= front;
    }
    if input.is_held(Key::A) {
        offset -= strafe;
    }
    if input.is_held(Key::D) {
        offset += strafe;
    }
    if input.is_held(Key::Space) {
        offset += next.world_up;
    }
    if input.is_held(Key::LeftShift) {
        offset -= next.world_up;
    }
    next.position += offset * distance;
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PITCH_LIMIT;
    use proptest::prelude::*;

    fn frame_with(events: &[InputEvent]) -> FrameInput {
        let mut input = InputState::new();
        for event in events {
            input.handle(*event);
        }
        input.take_frame_input()
    }

    #[test]
    fn test_first_pointer_event_only_seeds() {
        let input = frame_with(&[InputEvent::PointerMoved { x: 400.0, y: 300.0 }]);
        assert!(input.look_deltas.is_empty());

        let camera = CameraState::default();
        let next = update_camera(&camera, &input, 0.016);
        assert_eq!(next, camera);
    }

    #[test]
    fn test_pointer_motion_rotates_with_sensitivity() {
        let input = frame_with(&[
            InputEvent::PointerMoved { x: 400.0, y: 300.0 },
            InputEvent::PointerMoved { x: 420.0, y: 290.0 },
        ]);
        assert_eq!(input.look_deltas, vec![Vec2::new(20.0, 10.0)]);

        let camera = CameraState::default();
        let next = update_camera(&camera, &input, 0.0);
        assert!((next.yaw - (camera.yaw + 1.0)).abs() < 1e-5);
        assert!((next.pitch - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_pitch_clamps_per_event() {
        let camera = CameraState::default();
        let input = FrameInput {
            look_deltas: vec![Vec2::new(0.0, 4000.0), Vec2::new(0.0, -400.0)],
            ..FrameInput::default()
        };
        let next = update_camera(&camera, &input, 0.0);
        assert!((next.pitch - (PITCH_LIMIT - 20.0)).abs() < 1e-4);
    }

    #[test]
    fn test_forward_movement_scales_with_dt() {
        let input = frame_with(&[InputEvent::KeyPressed(Key::W)]);
        let camera = CameraState::default();
        let next = update_camera(&camera, &input, 0.5);
        let moved = next.position - camera.position;
        assert!((moved - camera.front() * 0.5).length() < 1e-5);
    }

    #[test]
    fn test_released_key_stops_movement() {
        let input = frame_with(&[
            InputEvent::KeyPressed(Key::D),
            InputEvent::KeyReleased(Key::D),
        ]);
        let camera = CameraState::default();
        assert_eq!(update_camera(&camera, &input, 1.0).position, camera.position);
    }

    #[test]
    fn test_strafe_and_vertical_keys() {
        let input = frame_with(&[
            InputEvent::KeyPressed(Key::A),
            InputEvent::KeyPressed(Key::LeftShift),
        ]);
        let camera = CameraState::default();
        let next = update_camera(&camera, &input, 1.0);
        // Default camera faces +Z, so strafing left moves toward +X.
        let expected = camera.position + Vec3::X - Vec3::Y;
        assert!((next.position - expected).length() < 1e-5);
    }

    #[test]
    fn test_space_toggles_follow_once_per_press() {
        let mut input = InputState::new();
        input.handle(InputEvent::KeyPressed(Key::Space));
        let frame = input.take_frame_input();
        assert!(frame.toggle_light_follow);
        assert!(frame.is_held(Key::Space));

        // Holding the key across frames does not toggle again.
        let frame = input.take_frame_input();
        assert!(!frame.toggle_light_follow);

        input.handle(InputEvent::KeyReleased(Key::Space));
        input.handle(InputEvent::KeyPressed(Key::Space));
        input.handle(InputEvent::KeyReleased(Key::Space));
        input.handle(InputEvent::KeyPressed(Key::Space));
        assert!(!input.take_frame_input().toggle_light_follow);
    }

    #[test]
    fn test_escape_and_capture_requests() {
        let mut input = InputState::new();
        assert!(!input.close_requested());
        input.handle(InputEvent::KeyPressed(Key::F12));
        input.handle(InputEvent::KeyPressed(Key::Escape));
        assert!(input.close_requested());
        assert!(input.take_capture_request());
        assert!(!input.take_capture_request());
    }

    #[test]
    fn test_settings_keys_queue_changes_once() {
        let mut input = InputState::new();
        input.handle(InputEvent::KeyPressed(Key::Digit2));
        input.handle(InputEvent::KeyPressed(Key::BracketRight));
        input.handle(InputEvent::KeyPressed(Key::W));
        let frame = input.take_frame_input();
        assert_eq!(
            frame.settings_changes,
            vec![SettingsChange::ToggleBlur, SettingsChange::IncreaseRadius]
        );
        assert!(input.take_frame_input().settings_changes.is_empty());
    }

    proptest! {
        #[test]
        fn prop_pitch_stays_in_range(
            moves in proptest::collection::vec((-5000.0f64..5000.0, -5000.0f64..5000.0), 0..64),
            sensitivity in 0.01f32..2.0,
        ) {
            let mut input = InputState::new();
            let mut camera = CameraState::default();
            camera.sensitivity = sensitivity;
            for (i, (x, y)) in moves.iter().enumerate() {
                input.handle(InputEvent::PointerMoved { x: *x, y: *y });
                if i % 3 == 0 {
                    camera = update_camera(&camera, &input.take_frame_input(), 0.016);
                    prop_assert!(camera.pitch >= -PITCH_LIMIT && camera.pitch <= PITCH_LIMIT);
                }
            }
            camera = update_camera(&camera, &input.take_frame_input(), 0.016);
            prop_assert!(camera.pitch >= -PITCH_LIMIT && camera.pitch <= PITCH_LIMIT);
        }
    }
}
