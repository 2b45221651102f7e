//! First-person camera state and the per-frame transforms derived from it.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Pitch limit in degrees. Looking straight up or down would flip the basis.
pub const PITCH_LIMIT: f32 = 89.0;

/// Camera defaults, loadable from the options file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Initial position in world space.
    pub position: Vec3,
    /// Initial yaw in degrees (0 = +X, 90 = +Z).
    pub yaw: f32,
    /// Initial pitch in degrees.
    pub pitch: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Degrees of rotation per pixel of pointer travel.
    pub sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, -1.0),
            yaw: 90.0,
            pitch: 0.0,
            fov: 45.0,
            near: 0.1,
            far: 100.0,
            speed: 1.0,
            sensitivity: 0.05,
        }
    }
}

/// Camera pose plus the basis vectors derived from yaw and pitch.
///
/// Only the input integrator produces new states; render passes read it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    /// Position in world space.
    pub position: Vec3,
    /// Yaw in degrees.
    pub yaw: f32,
    /// Pitch in degrees, always within `[-PITCH_LIMIT, PITCH_LIMIT]`.
    pub pitch: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Degrees per pixel of pointer travel.
    pub sensitivity: f32,
    /// Fixed world up vector.
    pub world_up: Vec3,
    front: Vec3,
    right: Vec3,
    up: Vec3,
}

impl CameraState {
    /// Creates a camera from its configuration.
    #[must_use]
    pub fn new(config: &CameraConfig) -> Self {
        let mut state = Self {
            position: config.position,
            yaw: config.yaw,
            pitch: config.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            fov: config.fov,
            near: config.near,
            far: config.far,
            speed: config.speed,
            sensitivity: config.sensitivity,
            world_up: Vec3::Y,
            front: Vec3::Z,
            right: Vec3::NEG_X,
            up: Vec3::Y,
        };
        state.update_vectors();
        state
    }

    /// Returns a copy rotated by the given yaw/pitch offsets in degrees.
    ///
    /// Pitch is clamped after the offset is applied.
    #[must_use]
    pub fn rotated(mut self, yaw_offset: f32, pitch_offset: f32) -> Self {
        self.yaw += yaw_offset;
        self.pitch = (self.pitch + pitch_offset).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
        self
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
            .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }

    /// Unit view direction.
    #[must_use]
    pub fn front(&self) -> Vec3 {
        self.front
    }

    /// Unit right vector.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Unit up vector (orthogonal to front and right).
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Returns the view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Returns the projection matrix for the given viewport aspect ratio.
    #[must_use]
    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), aspect_ratio, self.near, self.far)
    }

    /// Derives this frame's view and projection transforms.
    #[must_use]
    pub fn transforms(&self, aspect_ratio: f32) -> FrameTransforms {
        FrameTransforms {
            view: self.view_matrix(),
            projection: self.projection_matrix(aspect_ratio),
        }
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}

/// View and projection matrices for one frame. Never carried across frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransforms {
    pub view: Mat4,
    pub projection: Mat4,
}

/// Aspect ratio of a viewport, guarding against a zero height.
#[must_use]
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    width as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera_looks_down_positive_z() {
        let camera = CameraState::default();
        assert!((camera.front() - Vec3::Z).length() < 1e-5);
        assert!((camera.up() - Vec3::Y).length() < 1e-5);
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let camera = CameraState::default().rotated(33.0, -21.0);
        assert!(camera.front().dot(camera.right()).abs() < 1e-5);
        assert!(camera.front().dot(camera.up()).abs() < 1e-5);
        assert!((camera.right().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let camera = CameraState::default().rotated(0.0, 500.0);
        assert_eq!(camera.pitch, PITCH_LIMIT);
        let camera = camera.rotated(0.0, -1000.0);
        assert_eq!(camera.pitch, -PITCH_LIMIT);
    }

    #[test]
    fn test_view_matrix_puts_camera_at_origin() {
        let camera = CameraState::default();
        let eye = camera.view_matrix().transform_point3(camera.position);
        assert!(eye.length() < 1e-5);
        // A point in front of the camera lands on the -Z axis in view space.
        let ahead = camera
            .view_matrix()
            .transform_point3(camera.position + camera.front() * 5.0);
        assert!((ahead - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-4);
    }

    #[test]
    fn test_aspect_ratio_guards_zero_height() {
        assert_eq!(aspect_ratio(800, 0), 800.0);
        assert!((aspect_ratio(800, 600) - 4.0 / 3.0).abs() < 1e-6);
    }
}
